//! Path globs for selective export.
//!
//! Supported syntax, matched against `/`-separated relative paths:
//!
//! - `*` matches any run of characters within one segment
//! - `?` matches exactly one character other than `/`
//! - `[abc]`, `[a-z]`, `[!a-z]` / `[^a-z]` match one character from a class
//! - `**` as a whole segment matches zero or more segments
//! - `\` escapes the next character
//!
//! Matching is case-sensitive. A leading `./` is ignored.

use std::fmt;

use crate::ArchiveError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyChar,
    Star,
    Class { negated: bool, items: Vec<ClassItem> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassItem {
    Single(char),
    Range(char, char),
}

impl ClassItem {
    fn contains(self, c: char) -> bool {
        match self {
            Self::Single(s) => s == c,
            Self::Range(lo, hi) => lo <= c && c <= hi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    AnySegments,
    Tokens(Vec<Token>),
}

/// A compiled glob pattern.
///
/// # Examples
///
/// ```
/// use stowage_core::export::Glob;
///
/// let glob = Glob::new("a/*")?;
/// assert!(glob.matches("a/b.txt"));
/// assert!(!glob.matches("a/b/c.txt"));
/// assert!(!glob.matches("d.txt"));
///
/// let deep = Glob::new("**/*.rs")?;
/// assert!(deep.matches("main.rs"));
/// assert!(deep.matches("src/bin/tool.rs"));
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glob {
    source: String,
    segments: Vec<Segment>,
}

impl Glob {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidPattern`] for an empty or absolute
    /// pattern, an unterminated character class, or a trailing escape.
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| ArchiveError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.starts_with('/') {
            return Err(invalid("pattern must be relative"));
        }

        let mut trimmed = pattern;
        while let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest.trim_start_matches('/');
        }
        let trimmed = trimmed.trim_end_matches('/');
        if trimmed.is_empty() || trimmed == "." {
            return Err(invalid("pattern is empty"));
        }

        let segments = trimmed
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .map(|segment| {
                if segment == "**" {
                    Ok(Segment::AnySegments)
                } else {
                    parse_segment(segment).map(Segment::Tokens).map_err(invalid)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the relative `path` matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .collect();
        match_segments(&self.segments, &parts)
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segment(segment: &str) -> std::result::Result<Vec<Token>, &'static str> {
    let mut tokens = Vec::new();
    let mut chars = segment.chars();

    while let Some(c) = chars.next() {
        let token = match c {
            '*' => {
                // Consecutive stars inside a segment behave like one.
                if tokens.last() == Some(&Token::Star) {
                    continue;
                }
                Token::Star
            }
            '?' => Token::AnyChar,
            '\\' => Token::Literal(chars.next().ok_or("trailing escape character")?),
            '[' => parse_class(&mut chars)?,
            other => Token::Literal(other),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn parse_class(chars: &mut std::str::Chars<'_>) -> std::result::Result<Token, &'static str> {
    const UNTERMINATED: &str = "unterminated character class";

    let mut items = Vec::new();
    let mut negated = false;
    let mut first = true;

    loop {
        let mut c = chars.next().ok_or(UNTERMINATED)?;

        if first && (c == '!' || c == '^') {
            negated = true;
            c = chars.next().ok_or(UNTERMINATED)?;
        }
        // A `]` right after the opening bracket is a literal member.
        if c == ']' && !first {
            break;
        }
        first = false;

        if c == '\\' {
            c = chars.next().ok_or(UNTERMINATED)?;
        }

        let mut lookahead = chars.clone();
        if lookahead.next() == Some('-')
            && let Some(hi) = lookahead.next()
            && hi != ']'
        {
            *chars = lookahead;
            if hi < c {
                return Err("character range is out of order");
            }
            items.push(ClassItem::Range(c, hi));
        } else {
            items.push(ClassItem::Single(c));
        }
    }

    Ok(Token::Class { negated, items })
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnySegments, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((Segment::Tokens(tokens), rest)) => match path.split_first() {
            Some((part, remaining)) => {
                let chars: Vec<char> = part.chars().collect();
                match_tokens(tokens, &chars) && match_segments(rest, remaining)
            }
            None => false,
        },
    }
}

fn match_tokens(tokens: &[Token], text: &[char]) -> bool {
    match (tokens.split_first(), text.split_first()) {
        (None, None) => true,
        (Some((Token::Star, rest)), _) => {
            match_tokens(rest, text) || (!text.is_empty() && match_tokens(tokens, &text[1..]))
        }
        (Some((Token::AnyChar, rest)), Some((_, remaining))) => match_tokens(rest, remaining),
        (Some((Token::Literal(p), rest)), Some((t, remaining))) if p == t => {
            match_tokens(rest, remaining)
        }
        (Some((Token::Class { negated, items }, rest)), Some((t, remaining))) => {
            let hit = items.iter().any(|item| item.contains(*t));
            hit != *negated && match_tokens(rest, remaining)
        }
        _ => false,
    }
}
