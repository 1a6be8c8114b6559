//! Tar writer session.
//!
//! Entries are written with GNU headers. Names longer than the 100-byte header
//! field are preceded by a GNU long-name record.

use std::fs::File;
use std::fs::Metadata;
use std::io::BufWriter;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use tar::Builder;
use tar::EntryType;
use tar::Header;
use tracing::trace;

use crate::ArchiveError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::creation::writer::ArchiveWriter;
use crate::creation::writer::permission_bits;
use crate::formats::ArchiveFormat;

/// Tar records are padded to multiples of this size.
const BLOCK_SIZE: u64 = 512;

/// Size of the name field in a tar header.
const NAME_FIELD_LEN: usize = 100;

/// Name GNU tar gives to long-name records.
const LONG_LINK_NAME: &[u8] = b"././@LongLink";

/// Streams filesystem entries into an uncompressed tar file.
///
/// Directories are written as zero-length directory records so that empty
/// directories survive a round trip.
pub struct TarArchiveWriter {
    builder: Option<Builder<BufWriter<File>>>,
    buffer: CopyBuffer,
}

impl TarArchiveWriter {
    /// Creates (or truncates) `output` and starts a tar session.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create(output: &Path) -> Result<Self> {
        let file = File::create(output)?;
        Ok(Self {
            builder: Some(Builder::new(BufWriter::new(file))),
            buffer: CopyBuffer::new(),
        })
    }
}

impl ArchiveWriter for TarArchiveWriter {
    fn compress_file(&mut self, source: &Path, name: &str, metadata: &Metadata) -> Result<()> {
        let builder = self.builder.as_mut().ok_or(ArchiveError::WriterFinished)?;
        let mut header = Header::new_gnu();
        set_metadata(&mut header, metadata);

        if metadata.is_dir() {
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            header.set_cksum();
            builder.append_data(&mut header, name, std::io::empty())?;
            trace!(name, "wrote tar directory record");
            return Ok(());
        }

        // Size comes from the opened handle so header and content agree even
        // when `metadata` was read through a symlink.
        let file = File::open(source)?;
        let size = file.metadata()?.len();
        header.set_entry_type(EntryType::Regular);
        header.set_size(size);

        write_name(builder, &mut header, name)?;
        header.set_cksum();

        let out = builder.get_mut();
        out.write_all(header.as_bytes())?;
        let copied = copy_with_buffer(&mut file.take(size), &mut *out, &mut self.buffer)?;
        if copied != size {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("{} shrank while being archived", source.display()),
            )
            .into());
        }
        pad_to_block(out, size)?;
        trace!(name, size, "wrote tar file record");

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let Some(builder) = self.builder.take() else {
            return Ok(());
        };
        let mut writer = builder.into_inner()?;
        writer.flush()?;
        Ok(())
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar
    }
}

/// Stores `name` in the header, emitting a GNU long-name record first when it
/// does not fit the name field.
fn write_name<W: Write>(builder: &mut Builder<W>, header: &mut Header, name: &str) -> Result<()> {
    let bytes = name.as_bytes();

    if bytes.len() > NAME_FIELD_LEN {
        let mut long_name = Header::new_gnu();
        long_name.as_old_mut().name[..LONG_LINK_NAME.len()].copy_from_slice(LONG_LINK_NAME);
        long_name.set_mode(0o644);
        long_name.set_entry_type(EntryType::GNULongName);
        long_name.set_size(bytes.len() as u64 + 1);
        long_name.set_cksum();
        builder.append(&long_name, bytes.chain(&b"\0"[..]))?;
    }

    let stored = bytes.len().min(NAME_FIELD_LEN);
    header.as_old_mut().name[..stored].copy_from_slice(&bytes[..stored]);
    Ok(())
}

/// Zero-fills the remainder of the last block of a record holding `size`
/// content bytes.
fn pad_to_block<W: Write>(out: &mut W, size: u64) -> Result<()> {
    let remainder = size % BLOCK_SIZE;
    if remainder != 0 {
        let padding = [0u8; BLOCK_SIZE as usize];
        #[allow(clippy::cast_possible_truncation)]
        out.write_all(&padding[..(BLOCK_SIZE - remainder) as usize])?;
    }
    Ok(())
}

/// Copies mode, ownership and modification time into a header.
#[cfg(unix)]
fn set_metadata(header: &mut Header, metadata: &Metadata) {
    use std::os::unix::fs::MetadataExt;
    header.set_mode(permission_bits(metadata));
    header.set_uid(u64::from(metadata.uid()));
    header.set_gid(u64::from(metadata.gid()));
    // mtime can be negative for dates before epoch, clamp to 0
    #[allow(clippy::cast_sign_loss)]
    let mtime = metadata.mtime().max(0) as u64;
    header.set_mtime(mtime);
}

#[cfg(not(unix))]
fn set_metadata(header: &mut Header, metadata: &Metadata) {
    header.set_mode(permission_bits(metadata));
    if let Ok(modified) = metadata.modified()
        && let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH)
    {
        header.set_mtime(duration.as_secs());
    }
}
