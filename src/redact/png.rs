//! PNG chunk walker.
//!
//! Chunks are `length (u32 BE) | type | data | CRC`. Only `eXIf` data is
//! rewritten; every other chunk, CRC included, is copied verbatim.

use std::io::{Read, Write};

use crate::error::{RedactError, Result};

use super::io::{copy_exact, read_exact, read_exact_or_eof, read_vec};
use super::policy::{RedactOptions, RedactionPolicy};
use super::summary::RedactSummary;
use super::tiff::{is_bare_tiff, redact_exif_block, redact_tiff};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const EXIF_CHUNK: &[u8; 4] = b"eXIf";

/// Redact a PNG stream positioned at its signature.
pub fn redact_png<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    policy: &RedactionPolicy,
    options: &RedactOptions,
    summary: &mut RedactSummary,
) -> Result<()> {
    let mut signature = [0u8; 8];
    read_exact(reader, &mut signature, "PNG signature")?;
    writer.write_all(&signature)?;

    let mut length = [0u8; 4];
    let mut chunk_type = [0u8; 4];
    loop {
        if !read_exact_or_eof(reader, &mut length, "PNG chunk length")? {
            break;
        }
        read_exact(reader, &mut chunk_type, "PNG chunk type")?;
        let len = u32::from_be_bytes(length);

        if &chunk_type == EXIF_CHUNK {
            let mut data = read_vec(reader, u64::from(len), "eXIf chunk")?;
            log::debug!("eXIf chunk, {len} bytes");
            redact_exif_chunk(&mut data, policy, options, summary)?;

            let mut crc = [0u8; 4];
            read_exact(reader, &mut crc, "eXIf chunk CRC")?;
            if options.recompute_png_crc {
                crc = chunk_crc(&chunk_type, &data).to_be_bytes();
            }

            let new_len = u32::try_from(data.len())
                .map_err(|_| RedactError::format("eXIf chunk too large"))?;
            writer.write_all(&new_len.to_be_bytes())?;
            writer.write_all(&chunk_type)?;
            writer.write_all(&data)?;
            writer.write_all(&crc)?;
        } else {
            log::debug!("Chunk {}, {len} bytes", String::from_utf8_lossy(&chunk_type));
            writer.write_all(&length)?;
            writer.write_all(&chunk_type)?;
            copy_exact(reader, writer, u64::from(len) + 4, "PNG chunk")?;
        }
    }

    Ok(())
}

fn redact_exif_chunk(
    data: &mut [u8],
    policy: &RedactionPolicy,
    options: &RedactOptions,
    summary: &mut RedactSummary,
) -> Result<()> {
    if options.bare_tiff_chunks && is_bare_tiff(data) {
        summary.exif_blocks += 1;
        return redact_tiff(data, 0, policy, options, summary);
    }
    redact_exif_block(data, policy, options, summary)
}

/// CRC-32 over chunk type and data, as stored in the chunk trailer.
pub fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}
