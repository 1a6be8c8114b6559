//! Zip writer session.

use std::fs::File;
use std::fs::Metadata;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use tracing::trace;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::ArchiveError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::creation::writer::ArchiveWriter;
use crate::creation::writer::WriterOptions;
use crate::creation::writer::permission_bits;
use crate::formats::ArchiveFormat;

/// Entries at or above this size need ZIP64 extra fields.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Streams regular files into a Deflate-compressed zip file.
///
/// Directories produce no record: empty directories are not preserved in zip
/// output.
pub struct ZipArchiveWriter {
    zip: Option<ZipWriter<BufWriter<File>>>,
    options: SimpleFileOptions,
    buffer: CopyBuffer,
}

impl ZipArchiveWriter {
    /// Creates (or truncates) `output` and starts a zip session.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create(output: &Path, options: WriterOptions) -> Result<Self> {
        let file = File::create(output)?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(options.compression_level)));

        Ok(Self {
            zip: Some(ZipWriter::new(BufWriter::new(file))),
            options,
            buffer: CopyBuffer::new(),
        })
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn compress_file(&mut self, source: &Path, name: &str, metadata: &Metadata) -> Result<()> {
        let zip = self.zip.as_mut().ok_or(ArchiveError::WriterFinished)?;
        if metadata.is_dir() {
            return Ok(());
        }

        let mut file = File::open(source)?;
        let size = file.metadata()?.len();
        let options = self
            .options
            .unix_permissions(permission_bits(metadata))
            .large_file(size >= ZIP64_THRESHOLD);

        zip.start_file(name, options)?;
        let written = copy_with_buffer(&mut file, zip, &mut self.buffer)?;
        trace!(name, written, "wrote zip entry");

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let Some(zip) = self.zip.take() else {
            return Ok(());
        };
        let mut writer = zip.finish()?;
        writer.flush()?;
        Ok(())
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    fn write_single(temp: &TempDir, content: &[u8], level: u8) -> std::path::PathBuf {
        let source = temp.path().join("input.txt");
        fs::write(&source, content).unwrap();
        let output = temp.path().join(format!("out-{level}.zip"));

        let mut writer = ZipArchiveWriter::create(
            &output,
            WriterOptions {
                compression_level: level,
            },
        )
        .unwrap();
        let metadata = fs::metadata(&source).unwrap();
        writer.compress_file(&source, "input.txt", &metadata).unwrap();
        writer.finish().unwrap();
        output
    }

    #[test]
    fn test_zip_writer_single_file() {
        let temp = TempDir::new().unwrap();
        let output = write_single(&temp, b"hello zip", 6);

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "input.txt");
        assert_eq!(entry.compression(), CompressionMethod::Deflated);

        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello zip");
    }

    #[test]
    fn test_zip_writer_skips_directories() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("empty");
        fs::create_dir(&dir).unwrap();
        let output = temp.path().join("out.zip");

        let mut writer = ZipArchiveWriter::create(&output, WriterOptions::default()).unwrap();
        let metadata = fs::metadata(&dir).unwrap();
        writer.compress_file(&dir, "empty", &metadata).unwrap();
        writer.finish().unwrap();

        let archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_zip_writer_compression_levels() {
        let temp = TempDir::new().unwrap();
        let content = "compressible line of text\n".repeat(2000);

        let fast = write_single(&temp, content.as_bytes(), 1);
        let best = write_single(&temp, content.as_bytes(), 9);

        let fast_len = fs::metadata(fast).unwrap().len();
        let best_len = fs::metadata(best).unwrap().len();
        assert!(best_len <= fast_len);
        assert!(fast_len < content.len() as u64);
    }

    #[test]
    fn test_zip_writer_finish_twice_and_compress_after() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let mut writer =
            ZipArchiveWriter::create(&temp.path().join("out.zip"), WriterOptions::default())
                .unwrap();
        writer.finish().unwrap();
        writer.finish().unwrap();

        let metadata = fs::metadata(&source).unwrap();
        let result = writer.compress_file(&source, "a.txt", &metadata);
        assert!(matches!(result, Err(ArchiveError::WriterFinished)));
    }

    #[test]
    fn test_zip_writer_drop_without_finish_closes_archive() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "dropped").unwrap();
        let output = temp.path().join("out.zip");

        {
            let mut writer =
                ZipArchiveWriter::create(&output, WriterOptions::default()).unwrap();
            let metadata = fs::metadata(&source).unwrap();
            writer.compress_file(&source, "a.txt", &metadata).unwrap();
        }

        let archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_writer_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let source = temp.path().join("tool");
        fs::write(&source, "bin").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o700)).unwrap();
        let output = temp.path().join("out.zip");

        let mut writer = ZipArchiveWriter::create(&output, WriterOptions::default()).unwrap();
        let metadata = fs::metadata(&source).unwrap();
        writer.compress_file(&source, "tool", &metadata).unwrap();
        writer.finish().unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o700);
    }
}
