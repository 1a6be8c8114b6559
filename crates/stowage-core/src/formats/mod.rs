//! Archive format selection.

pub mod detect;

pub use detect::ArchiveFormat;
pub use detect::detect_format;
