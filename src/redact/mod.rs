//! Selective EXIF redaction for JPEG and PNG streams.
//!
//! The entry points sniff the container from its first bytes and route it
//! to the matching walker:
//!
//! - [`redact`] / [`redact_with`] — stream in, stream out
//! - [`redact_bytes`] — in-memory buffer
//! - [`redact_file`] — path to path; the output is only written once the
//!   whole image was redacted successfully
//!
//! Each walker hands APP1 / `eXIf` payloads to the EXIF processor, which
//! zeroes matching IFD value fields in place. Output is always the same
//! length as the input.

mod io;
mod jpeg;
pub mod policy;
mod png;
mod summary;
pub mod tiff;

use std::io::{Cursor, Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{RedactError, Result};

pub use jpeg::SOI;
pub use png::{PNG_SIGNATURE, chunk_crc};
pub use policy::{RedactOptions, RedactionPolicy, TagCategory};
pub use summary::RedactSummary;
pub use tiff::redact_exif_block;

/// Bytes read from the start of a stream to identify its format.
pub const SNIFF_LEN: usize = 12;

/// Container formats the redactor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Identify the container from its leading bytes.
    ///
    /// ```rust
    /// use exif_redact::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE1]), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::sniff(b"\x89PNG\r\n\x1a\n"), Some(ImageFormat::Png));
    /// assert_eq!(ImageFormat::sniff(b"GIF89a"), None);
    /// ```
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.starts_with(&SOI) {
            Some(Self::Jpeg)
        } else if header.starts_with(&PNG_SIGNATURE[..4]) {
            Some(Self::Png)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        }
    }
}

/// Redact `input` into `output` with default options.
///
/// Nothing is written to `output` unless the whole image was processed.
///
/// ```rust
/// use exif_redact::{RedactError, RedactionPolicy, redact};
///
/// let mut out = Vec::new();
/// let err = redact(&b"GIF89a"[..], &mut out, &RedactionPolicy::all()).unwrap_err();
/// assert!(matches!(err, RedactError::UnsupportedFormat));
/// assert!(out.is_empty());
/// ```
pub fn redact<R: Read, W: Write>(input: R, output: W, policy: &RedactionPolicy) -> Result<()> {
    redact_with(input, output, policy, &RedactOptions::default()).map(|_| ())
}

/// Redact `input` into `output` and report what was zeroed.
pub fn redact_with<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    policy: &RedactionPolicy,
    options: &RedactOptions,
) -> Result<RedactSummary> {
    let mut header = Vec::with_capacity(SNIFF_LEN);
    (&mut input).take(SNIFF_LEN as u64).read_to_end(&mut header)?;
    let format = ImageFormat::sniff(&header).ok_or(RedactError::UnsupportedFormat)?;
    log::debug!("Detected {} stream", format.label());

    // Replay the sniffed bytes in front of the rest of the stream.
    let mut reader = Cursor::new(header).chain(input);
    let mut buffer = Vec::new();
    let mut summary = RedactSummary::default();
    match format {
        ImageFormat::Jpeg => {
            jpeg::redact_jpeg(&mut reader, &mut buffer, policy, options, &mut summary)?
        }
        ImageFormat::Png => {
            png::redact_png(&mut reader, &mut buffer, policy, options, &mut summary)?
        }
    }

    output.write_all(&buffer)?;
    output.flush()?;
    Ok(summary)
}

/// Redact an in-memory image, returning the new bytes.
pub fn redact_bytes(
    data: &[u8],
    policy: &RedactionPolicy,
    options: &RedactOptions,
) -> Result<(Vec<u8>, RedactSummary)> {
    let mut out = Vec::with_capacity(data.len());
    let summary = redact_with(data, &mut out, policy, options)?;
    Ok((out, summary))
}

/// Redact the image at `input` into `output`.
///
/// `output` is created (or replaced) only after redaction succeeded, so an
/// unsupported or corrupt input leaves it untouched. `input` and `output`
/// may be the same path.
pub fn redact_file(
    input: &Path,
    output: &Path,
    policy: &RedactionPolicy,
    options: &RedactOptions,
) -> Result<RedactSummary> {
    let data = std::fs::read(input)?;
    let (redacted, summary) = redact_bytes(&data, policy, options)?;
    std::fs::write(output, redacted)?;
    log::debug!(
        "{} -> {}: {} entries redacted",
        input.display(),
        output.display(),
        summary.total_redacted()
    );
    Ok(summary)
}
