//! Bounded-memory stream copying.
//!
//! Every byte that moves between a source file and an archive, in either
//! direction, goes through [`copy_with_buffer`] with a fixed-size
//! [`CopyBuffer`]. Memory use stays constant no matter how large an entry is.

use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;

use crate::Result;

/// Buffer size for stream copies (64 KiB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable copy buffer owned by a writer session or an extraction pass.
///
/// # Examples
///
/// ```
/// use stowage_core::copy::CopyBuffer;
/// use stowage_core::copy::copy_with_buffer;
///
/// let mut buffer = CopyBuffer::new();
/// let mut input: &[u8] = b"payload";
/// let mut output = Vec::new();
///
/// let copied = copy_with_buffer(&mut input, &mut output, &mut buffer)?;
/// assert_eq!(copied, 7);
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Allocates a new zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies everything from `reader` into `writer` through `buffer`.
///
/// Interrupted reads are retried. Returns the number of bytes copied.
///
/// # Errors
///
/// Returns an I/O error if reading or writing fails.
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;
        total += bytes_read as u64;
    }

    Ok(total)
}
