use std::io;
use thiserror::Error;

/// Errors produced while redacting an image stream.
///
/// Structural problems in the container (JPEG segments, PNG chunks, the
/// TIFF byte-order marker) are fatal. Damage confined to an IFD is not an
/// error at all: the redactor zeroes what it can reach and moves on.
#[derive(Error, Debug)]
pub enum RedactError {
    /// The input starts with neither a JPEG nor a PNG signature.
    #[error("unsupported image format")]
    UnsupportedFormat,
    /// The container or TIFF header is structurally invalid or truncated.
    #[error("invalid image data: {0}")]
    Format(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RedactError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Map a read failure: running out of input mid-structure is a
    /// truncated container, everything else stays an IO error.
    pub(crate) fn from_read(err: io::Error, what: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::Format(format!("truncated {what}"))
        } else {
            Self::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, RedactError>;
