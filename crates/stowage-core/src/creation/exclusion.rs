//! Source-path exclusion.
//!
//! Patterns are plain substrings: a path is excluded when its raw string
//! contains any pattern. There is no glob or anchoring, so `"test"` excludes
//! both `/src/test/a.rs` and `/src/latest.txt`.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::Result;

/// Returns `true` if any pattern is a substring of `path`.
///
/// Matching is case-sensitive.
///
/// # Examples
///
/// ```
/// use stowage_core::creation::exclusion::should_exclude;
///
/// let patterns = vec!["test".to_string()];
/// assert!(should_exclude("/foo/test/bar", &patterns));
/// assert!(should_exclude("/foo/latest.txt", &patterns));
/// assert!(!should_exclude("/foo/Test.txt", &patterns));
/// ```
#[must_use]
pub fn should_exclude<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|pattern| path.contains(pattern.as_ref()))
}

/// Reads exclusion patterns from a newline-delimited file.
///
/// One pattern per line. Surrounding whitespace is trimmed; blank lines and
/// lines starting with `#` are skipped.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn load_exclusion_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let patterns: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect();

    debug!(
        file = %path.display(),
        count = patterns.len(),
        "loaded exclusion patterns"
    );
    Ok(patterns)
}

/// Ordered set of substring exclusion patterns.
///
/// Inline patterns come first, followed by patterns loaded from a file.
/// Empty patterns are dropped since they would match every path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    patterns: Vec<String>,
}

impl ExclusionSet {
    /// Creates an empty set that excludes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from inline patterns and an optional exclusion file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the exclusion file cannot be read.
    pub fn from_sources<S: AsRef<str>>(inline: &[S], file: Option<&Path>) -> Result<Self> {
        let mut set = Self::new();
        set.extend(inline.iter().map(|p| p.as_ref().to_string()));
        if let Some(file) = file {
            set.extend(load_exclusion_file(file)?);
        }
        Ok(set)
    }

    /// Appends a single pattern.
    pub fn push(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            self.patterns.push(pattern);
        }
    }

    /// Returns the patterns in match order.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns `true` if the set holds no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns `true` if `path` contains any pattern.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        !self.patterns.is_empty() && should_exclude(&path.to_string_lossy(), &self.patterns)
    }
}

impl Extend<String> for ExclusionSet {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for pattern in iter {
            self.push(pattern);
        }
    }
}

impl FromIterator<String> for ExclusionSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_substring_anywhere() {
        let patterns = ["test"];
        assert!(should_exclude("/foo/test/bar", &patterns));
        assert!(should_exclude("/foo/latest.txt", &patterns));
        assert!(should_exclude("test", &patterns));
        assert!(!should_exclude("/foo/bar", &patterns));
    }

    #[test]
    fn test_case_sensitive() {
        let patterns = ["node_modules"];
        assert!(!should_exclude("/app/Node_Modules/x.js", &patterns));
        assert!(should_exclude("/app/node_modules/x.js", &patterns));
    }

    #[test]
    fn test_no_glob_semantics() {
        let patterns = ["*.log"];
        assert!(!should_exclude("/var/app.log", &patterns));
        assert!(should_exclude("/var/*.log", &patterns));
    }

    #[test]
    fn test_empty_pattern_list_excludes_nothing() {
        let patterns: [&str; 0] = [];
        assert!(!should_exclude("/anything", &patterns));
    }

    #[test]
    fn test_load_exclusion_file_skips_blank_and_comments() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join(".archiveignore");
        fs::write(&file, "# build outputs\ntarget\n\n  .git  \r\n#tmp\nnode_modules\n").unwrap();

        let patterns = load_exclusion_file(&file).unwrap();
        assert_eq!(patterns, vec!["target", ".git", "node_modules"]);
    }

    #[test]
    fn test_load_exclusion_file_missing() {
        let result = load_exclusion_file(Path::new("/nonexistent/.archiveignore"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_sources_inline_first() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("exclusions.txt");
        fs::write(&file, "from-file\n").unwrap();

        let set = ExclusionSet::from_sources(&["inline-a", "inline-b"], Some(&file)).unwrap();
        assert_eq!(set.patterns(), ["inline-a", "inline-b", "from-file"]);
    }

    #[test]
    fn test_empty_patterns_dropped() {
        let set: ExclusionSet = vec![String::new(), "x".to_string()].into_iter().collect();
        assert_eq!(set.patterns(), ["x"]);
        assert!(!set.matches(&PathBuf::from("/a/b")));
        assert!(set.matches(&PathBuf::from("/a/x")));
    }

    #[test]
    fn test_empty_set() {
        let set = ExclusionSet::new();
        assert!(set.is_empty());
        assert!(!set.matches(Path::new("/a")));
    }
}
