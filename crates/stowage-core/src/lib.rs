//! Archive engine for build pipelines.
//!
//! `stowage-core` packs file trees into zip or tar archives and unpacks zip,
//! tar and gzip-compressed tar archives, optionally keeping only a
//! glob-selected subset of the extracted tree.
//!
//! - [`creation`]: source walking with substring exclusions, and the zip and
//!   tar writer sessions behind [`ArchiveWriter`].
//! - [`extraction`]: format detection and extractors that refuse entries
//!   escaping the destination root.
//! - [`export`]: selective copying of extracted paths.
//!
//! # Examples
//!
//! ```no_run
//! use stowage_core::ArchiveConfig;
//! use stowage_core::UnarchiveConfig;
//! use stowage_core::create_archive;
//! use stowage_core::unarchive;
//! use std::path::Path;
//!
//! let root = Path::new("/work/app");
//!
//! let archive = ArchiveConfig::new("bundle")
//!     .with_source("src")
//!     .with_out("dist/bundle.zip")
//!     .with_exclusions(vec!["target".to_string()]);
//! let created = create_archive(&archive, root)?;
//! println!("packed {} files", created.files_added);
//!
//! let restore = UnarchiveConfig::new("restore")
//!     .with_src("dist/bundle.zip")
//!     .with_out("restored");
//! let report = unarchive(&restore, root)?;
//! println!("extracted {} entries", report.extraction.entries.len());
//! # Ok::<(), stowage_core::ArchiveError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod copy;
pub mod creation;
pub mod error;
pub mod export;
pub mod extraction;
pub mod formats;
pub mod report;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::create_archive;
pub use api::unarchive;
pub use config::ArchiveConfig;
pub use config::UnarchiveConfig;
pub use creation::ArchiveWriter;
pub use creation::CreationReport;
pub use creation::ExclusionSet;
pub use creation::should_exclude;
pub use error::ArchiveError;
pub use error::Result;
pub use export::export_selected;
pub use extraction::extract_archive;
pub use formats::ArchiveFormat;
pub use formats::detect_format;
pub use report::ExtractionReport;
pub use report::UnarchiveReport;
