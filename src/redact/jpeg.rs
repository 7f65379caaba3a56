//! JPEG segment walker.
//!
//! Copies every marker segment through unchanged except APP1, whose payload
//! goes through the EXIF processor. Walking stops at Start-of-Scan (or EOI):
//! everything after it is entropy-coded data and is copied verbatim.

use std::io::{self, Read, Write};

use crate::error::{RedactError, Result};

use super::io::{copy_exact, read_exact, read_exact_or_eof, read_vec};
use super::policy::{RedactOptions, RedactionPolicy};
use super::summary::RedactSummary;
use super::tiff::redact_exif_block;

pub const SOI: [u8; 2] = [0xFF, 0xD8];

const APP1: u8 = 0xE1;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;
const TEM: u8 = 0x01;
const RST0: u8 = 0xD0;
const RST7: u8 = 0xD7;

/// Redact a JPEG stream positioned at its SOI marker.
pub fn redact_jpeg<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    policy: &RedactionPolicy,
    options: &RedactOptions,
    summary: &mut RedactSummary,
) -> Result<()> {
    let mut soi = [0u8; 2];
    read_exact(reader, &mut soi, "JPEG SOI marker")?;
    if soi != SOI {
        return Err(RedactError::format("missing JPEG SOI marker"));
    }
    writer.write_all(&soi)?;

    let mut marker = [0u8; 2];
    loop {
        if !read_exact_or_eof(reader, &mut marker, "JPEG marker")? {
            log::debug!("JPEG stream ended without a scan");
            break;
        }
        if marker[0] != 0xFF {
            return Err(RedactError::format(format!(
                "expected JPEG marker, found {:#04x}{:02x}",
                marker[0], marker[1]
            )));
        }
        // Any number of 0xFF fill bytes may precede the marker code.
        while marker[1] == 0xFF {
            writer.write_all(&[0xFF])?;
            read_exact(reader, &mut marker[1..], "JPEG marker")?;
        }

        match marker[1] {
            APP1 => {
                let len = read_segment_length(reader)?;
                let mut payload = read_vec(reader, u64::from(len - 2), "APP1 segment")?;
                log::debug!("APP1 segment, {} bytes", payload.len());
                redact_exif_block(&mut payload, policy, options, summary)?;

                let new_len = u16::try_from(payload.len() + 2)
                    .map_err(|_| RedactError::format("APP1 segment too large"))?;
                writer.write_all(&marker)?;
                writer.write_all(&new_len.to_be_bytes())?;
                writer.write_all(&payload)?;
            }
            SOS | EOI => {
                writer.write_all(&marker)?;
                let rest = io::copy(reader, writer)?;
                log::debug!("Marker {:#04x}: copied {rest} trailing bytes verbatim", marker[1]);
                break;
            }
            TEM | RST0..=RST7 => {
                writer.write_all(&marker)?;
            }
            other => {
                let len = read_segment_length(reader)?;
                log::debug!("Segment {other:#04x}, {len} bytes");
                writer.write_all(&marker)?;
                writer.write_all(&len.to_be_bytes())?;
                copy_exact(reader, writer, u64::from(len - 2), "JPEG segment")?;
            }
        }
    }

    Ok(())
}

/// Read a big-endian segment length, which counts its own two bytes.
fn read_segment_length<R: Read>(reader: &mut R) -> Result<u16> {
    let mut bytes = [0u8; 2];
    read_exact(reader, &mut bytes, "JPEG segment length")?;
    let len = u16::from_be_bytes(bytes);
    if len < 2 {
        return Err(RedactError::format(format!("JPEG segment length {len} is below 2")));
    }
    Ok(len)
}
