//! Stream helpers shared by the JPEG and PNG walkers.
//!
//! Every read that must be satisfied in full maps a short read to
//! [`RedactError::Format`]; only the read of the next marker/chunk header
//! may hit a clean end of stream.

use std::io::{self, Read, Write};

use crate::error::{RedactError, Result};

/// Fill `buf` from `reader`.
///
/// Returns `Ok(false)` when the stream is already exhausted, and a
/// truncation error when it ends partway through `buf`.
pub(crate) fn read_exact_or_eof<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    what: &str,
) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(RedactError::format(format!("truncated {what}"))),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(RedactError::Io(e)),
        }
    }
    Ok(true)
}

pub(crate) fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader
        .read_exact(buf)
        .map_err(|e| RedactError::from_read(e, what))
}

/// Read exactly `len` bytes into a fresh buffer.
///
/// Grows with the data actually read, so a bogus length field cannot force
/// a huge up-front allocation.
pub(crate) fn read_vec<R: Read>(reader: &mut R, len: u64, what: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(RedactError::format(format!("truncated {what}")));
    }
    Ok(buf)
}

/// Copy exactly `len` bytes from `reader` to `writer`.
pub(crate) fn copy_exact<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    len: u64,
    what: &str,
) -> Result<()> {
    let copied = io::copy(&mut reader.take(len), writer)?;
    if copied < len {
        return Err(RedactError::format(format!("truncated {what}")));
    }
    Ok(())
}
