//! Build file loading.
//!
//! A build file is TOML with any number of `[[archive]]` and `[[unarchive]]`
//! tables. Each table deserializes into the matching core configuration, and
//! relative paths inside it resolve against the directory holding the file.
//!
//! ```toml
//! [[archive]]
//! name = "bundle"
//! srcs = ["src", "Cargo.toml"]
//! out = "dist/bundle.zip"
//! exclusions = ["target"]
//!
//! [[unarchive]]
//! name = "headers"
//! src = "vendor/deps.tar.gz"
//! out = "third_party"
//! exported_files = ["include/**"]
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use serde::Deserialize;
use stowage_core::ArchiveConfig;
use stowage_core::UnarchiveConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildFile {
    pub archive: Vec<ArchiveConfig>,
    pub unarchive: Vec<UnarchiveConfig>,
}

/// One job selected from a build file.
#[derive(Debug, Clone, Copy)]
pub enum Job<'a> {
    Archive(&'a ArchiveConfig),
    Unarchive(&'a UnarchiveConfig),
}

impl<'a> Job<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Archive(config) => &config.name,
            Self::Unarchive(config) => &config.name,
        }
    }
}

impl BuildFile {
    /// Reads and parses a build file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read build file '{}'", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("failed to parse build file '{}'", path.display()))
    }

    /// Parses build file text and checks that job names are usable.
    pub fn parse(text: &str) -> Result<Self> {
        let file: Self = toml::from_str(text)?;

        let mut seen = HashSet::new();
        for name in file.jobs().map(|job| job.name().to_string()) {
            if name.is_empty() {
                bail!("every job needs a non-empty 'name'");
            }
            if !seen.insert(name.clone()) {
                bail!("job name '{name}' is used more than once");
            }
        }

        Ok(file)
    }

    /// Iterates over all jobs, archive jobs first, in file order.
    pub fn jobs(&self) -> impl Iterator<Item = Job<'_>> {
        self.archive
            .iter()
            .map(Job::Archive)
            .chain(self.unarchive.iter().map(Job::Unarchive))
    }

    /// Selects the jobs named in `names`, or every job when `names` is empty.
    ///
    /// Selected jobs keep build file order.
    pub fn select(&self, names: &[String]) -> Result<Vec<Job<'_>>> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.jobs().any(|job| job.name() == name.as_str()))
        {
            let known: Vec<&str> = self.jobs().map(|job| job.name()).collect();
            bail!(
                "no job named '{unknown}'\n\
                 HINT: Jobs in this build file: {}",
                if known.is_empty() {
                    "(none)".to_string()
                } else {
                    known.join(", ")
                }
            );
        }

        Ok(self
            .jobs()
            .filter(|job| names.is_empty() || names.iter().any(|name| name == job.name()))
            .collect())
    }
}

/// Returns the directory relative job paths resolve against.
pub fn working_root(build_file: &Path) -> PathBuf {
    match build_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use stowage_core::ArchiveFormat;

    const SAMPLE: &str = r#"
[[archive]]
name = "bundle"
srcs = ["src", "Cargo.toml"]
out = "dist/bundle.tar"
exclusions = ["target"]

[[archive]]
name = "docs"
srcs = ["docs"]
out = "dist/docs.zip"
format = "zip"
compression_level = 9

[[unarchive]]
name = "headers"
src = "vendor/deps.tar.gz"
out = "third_party"
exported_files = ["include/**"]
"#;

    #[test]
    fn test_parse_sample() {
        let file = BuildFile::parse(SAMPLE).unwrap();
        assert_eq!(file.archive.len(), 2);
        assert_eq!(file.unarchive.len(), 1);

        let bundle = &file.archive[0];
        assert_eq!(bundle.srcs, vec![PathBuf::from("src"), PathBuf::from("Cargo.toml")]);
        assert_eq!(bundle.resolved_format().unwrap(), ArchiveFormat::Tar);
        assert_eq!(file.archive[1].format, Some(ArchiveFormat::Zip));
        assert_eq!(file.archive[1].compression_level, Some(9));
        assert_eq!(file.unarchive[0].exported_files, vec!["include/**"]);
    }

    #[test]
    fn test_jobs_order() {
        let file = BuildFile::parse(SAMPLE).unwrap();
        let names: Vec<&str> = file.jobs().map(|job| job.name()).collect();
        assert_eq!(names, vec!["bundle", "docs", "headers"]);
    }

    #[test]
    fn test_select_subset_keeps_file_order() {
        let file = BuildFile::parse(SAMPLE).unwrap();
        let selected = file
            .select(&["headers".to_string(), "bundle".to_string()])
            .unwrap();
        let names: Vec<&str> = selected.iter().map(Job::name).collect();
        assert_eq!(names, vec!["bundle", "headers"]);
    }

    #[test]
    fn test_select_unknown_job() {
        let file = BuildFile::parse(SAMPLE).unwrap();
        let err = file.select(&["missing".to_string()]).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("missing"));
        assert!(msg.contains("bundle, docs, headers"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let text = r#"
[[archive]]
name = "x"
srcs = ["a"]
out = "a.zip"

[[unarchive]]
name = "x"
src = "a.zip"
out = "b"
"#;
        assert!(BuildFile::parse(text).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = r#"
[[archive]]
name = "x"
sources = ["a"]
"#;
        assert!(BuildFile::parse(text).is_err());
    }

    #[test]
    fn test_invalid_format_rejected() {
        let text = r#"
[[archive]]
name = "x"
srcs = ["a"]
out = "a.bin"
format = "rar"
"#;
        assert!(BuildFile::parse(text).is_err());
    }

    #[test]
    fn test_empty_file() {
        let file = BuildFile::parse("").unwrap();
        assert_eq!(file.jobs().count(), 0);
        assert!(file.select(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_working_root() {
        assert_eq!(working_root(Path::new("stowage.toml")), PathBuf::from("."));
        assert_eq!(
            working_root(Path::new("pkg/app/stowage.toml")),
            PathBuf::from("pkg/app")
        );
    }
}
