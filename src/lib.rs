//! # exif-redact
//!
//! Selective EXIF redaction for JPEG and PNG images — remove camera, GPS,
//! copyright, date/time, user and technical metadata while leaving every
//! other byte of the file exactly as it was.
//!
//! Redaction never re-encodes pixels and never resizes anything: matching
//! IFD entries have their 4-byte value/offset field zeroed in place, so the
//! output is always the same length as the input.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_redact::{RedactOptions, RedactionPolicy, redact_file};
//! use std::path::Path;
//!
//! fn main() -> exif_redact::Result<()> {
//!     let policy = RedactionPolicy {
//!         remove_gps_info: true,
//!         remove_date_time: true,
//!         ..Default::default()
//!     };
//!     let summary = redact_file(
//!         Path::new("photo.jpg"),
//!         Path::new("photo.clean.jpg"),
//!         &policy,
//!         &RedactOptions::default(),
//!     )?;
//!     println!("Redacted {} entries", summary.total_redacted());
//!     Ok(())
//! }
//! ```
//!
//! ## Streams
//!
//! [`redact`] works on any `Read`/`Write` pair. The format is sniffed from
//! the first bytes (`FF D8` for JPEG, `89 50 4E 47` for PNG); anything else
//! is [`RedactError::UnsupportedFormat`].
//!
//! ```rust,no_run
//! use exif_redact::{RedactionPolicy, redact};
//! use std::fs::File;
//!
//! # fn main() -> exif_redact::Result<()> {
//! let input = File::open("photo.png")?;
//! let output = File::create("photo.clean.png")?;
//! redact(input, output, &RedactionPolicy::all())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Categories
//!
//! | Category | Tags |
//! |----------|------|
//! | Camera info | Make, Model, ExifVersion, FlashpixVersion |
//! | GPS | GPS IFD pointer (the GPS directory becomes unreachable) |
//! | Copyright | Copyright |
//! | Date/time | DateTime, DateTimeOriginal, DateTimeDigitized |
//! | User info | UserComment, MakerNote, Copyright |
//! | Technical | exposure, aperture, ISO, flash, focal length, metering… |
//!
//! ## Modules
//!
//! - [`redact`] — JPEG/PNG walkers, EXIF/IFD redaction, policy and options
//! - [`config`] — JSON configuration for the command-line tool
//! - [`pipeline`] — batch processing: file collection, backups, output paths
//! - [`error`] — error type

pub mod config;
pub mod error;
pub mod pipeline;
pub mod redact;

#[cfg(test)]
mod test_helpers;

pub use error::{RedactError, Result};
pub use redact::{
    ImageFormat, RedactOptions, RedactSummary, RedactionPolicy, TagCategory, redact, redact_bytes,
    redact_file, redact_with,
};
