//! Archive creation.
//!
//! A source walk feeds surviving entries into one writer session per
//! archive. Only zip and tar can be written; gzip-compressed tar is read-only.

pub mod exclusion;
pub mod packer;
pub mod report;
pub mod tar;
pub mod walker;
pub mod writer;
pub mod zip;

pub use exclusion::ExclusionSet;
pub use exclusion::load_exclusion_file;
pub use exclusion::should_exclude;
pub use packer::pack;
pub use report::CreationReport;
pub use walker::EntryKind;
pub use walker::SourceEntry;
pub use walker::SourceWalk;
pub use writer::ArchiveWriter;
pub use writer::WriterOptions;
pub use writer::open_writer;
