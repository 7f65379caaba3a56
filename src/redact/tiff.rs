//! EXIF block processing and IFD tag redaction.
//!
//! An EXIF block is `Exif\0\0` followed by a TIFF structure:
//!
//! ```text
//! 0      6        8       10            14
//! Exif\0\0 | II/MM | magic | IFD0 offset | ...IFDs and value data...
//! ```
//!
//! Every offset inside the TIFF structure is relative to the byte-order
//! marker. Redaction zeroes the 4-byte value/offset field of matching IFD
//! entries in place; tag, type and count are never touched, so the block
//! keeps its length and every directory keeps its layout.

use crate::error::{RedactError, Result};

use super::policy::{RedactOptions, RedactionPolicy, TAG_EXIF_IFD_POINTER, TAG_GPS_IFD_POINTER};
use super::summary::RedactSummary;

/// Identifier that opens an EXIF APP1 payload.
pub const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";
/// Size of the TIFF header (byte order, magic, IFD0 offset).
pub const TIFF_HEADER_LEN: usize = 8;
/// Size of one IFD entry in bytes.
pub const IFD_ENTRY_LEN: usize = 12;
/// Offset of the value/offset field within an IFD entry.
const VALUE_FIELD: usize = 8;

/// TIFF field types.
pub const TYPE_BYTE: u16 = 1;
pub const TYPE_ASCII: u16 = 2;
pub const TYPE_SHORT: u16 = 3;
pub const TYPE_LONG: u16 = 4;
pub const TYPE_RATIONAL: u16 = 5;
pub const TYPE_SBYTE: u16 = 6;
pub const TYPE_UNDEFINED: u16 = 7;
pub const TYPE_SSHORT: u16 = 8;
pub const TYPE_SLONG: u16 = 9;
pub const TYPE_SRATIONAL: u16 = 10;
pub const TYPE_FLOAT: u16 = 11;
pub const TYPE_DOUBLE: u16 = 12;

/// Byte order of a TIFF structure, from its `II`/`MM` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn from_marker(marker: &[u8]) -> Option<Self> {
        match marker {
            b"II" => Some(Endian::Little),
            b"MM" => Some(Endian::Big),
            _ => None,
        }
    }

    #[inline]
    pub fn read_u16(self, data: &[u8], offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    #[inline]
    pub fn read_u32(self, data: &[u8], offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }
}

/// Size in bytes of one value of the given TIFF field type.
#[inline]
pub fn type_unit_size(field_type: u16) -> Option<usize> {
    match field_type {
        TYPE_BYTE | TYPE_ASCII | TYPE_SBYTE | TYPE_UNDEFINED => Some(1),
        TYPE_SHORT | TYPE_SSHORT => Some(2),
        TYPE_LONG | TYPE_SLONG | TYPE_FLOAT => Some(4),
        TYPE_RATIONAL | TYPE_SRATIONAL | TYPE_DOUBLE => Some(8),
        _ => None,
    }
}

/// True if `data` starts with a TIFF header rather than `Exif\0\0`.
pub fn is_bare_tiff(data: &[u8]) -> bool {
    matches!(data.get(..4), Some(b"II\x2A\x00") | Some(b"MM\x00\x2A"))
}

/// Redact an APP1 / `eXIf` payload in place.
///
/// Payloads not starting with `Exif\0\0` are left alone. A block too short
/// to hold a TIFF header is left alone too; an unrecognised byte-order
/// marker is a [`RedactError::Format`].
pub fn redact_exif_block(
    data: &mut [u8],
    policy: &RedactionPolicy,
    options: &RedactOptions,
    summary: &mut RedactSummary,
) -> Result<()> {
    summary.exif_blocks += 1;
    if !data.starts_with(EXIF_HEADER) {
        log::debug!("Payload has no Exif identifier, passing through ({} bytes)", data.len());
        return Ok(());
    }
    redact_tiff(data, EXIF_HEADER.len(), policy, options, summary)
}

/// Redact the TIFF structure starting at `tiff_start` within `data`.
pub(crate) fn redact_tiff(
    data: &mut [u8],
    tiff_start: usize,
    policy: &RedactionPolicy,
    options: &RedactOptions,
    summary: &mut RedactSummary,
) -> Result<()> {
    let Some(marker) = data.get(tiff_start..tiff_start + 2) else {
        log::warn!("EXIF block too short for a byte-order marker ({} bytes)", data.len());
        return Ok(());
    };
    let order = Endian::from_marker(marker)
        .ok_or_else(|| RedactError::format("invalid byte order"))?;

    let Some(ifd0) = order.read_u32(data, tiff_start + 4) else {
        log::warn!("EXIF block too short for a TIFF header ({} bytes)", data.len());
        return Ok(());
    };
    summary.tiff_blocks += 1;
    log::debug!("TIFF header: {order:?}, IFD0 at offset {ifd0}");

    let mut redactor = IfdRedactor {
        data,
        tiff_start,
        order,
        policy,
        options,
        summary,
    };
    redactor.redact_ifd(ifd0, IfdLevel::Root);
    Ok(())
}

/// Which directory is being walked. Only the root follows the Exif
/// sub-IFD pointer, which bounds the walk at two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IfdLevel {
    Root,
    Exif,
}

struct IfdRedactor<'a> {
    data: &'a mut [u8],
    tiff_start: usize,
    order: Endian,
    policy: &'a RedactionPolicy,
    options: &'a RedactOptions,
    summary: &'a mut RedactSummary,
}

impl IfdRedactor<'_> {
    /// Absolute position of a TIFF-relative offset, if it is inside the block.
    fn resolve(&self, offset: u32) -> Option<usize> {
        let pos = self.tiff_start.checked_add(usize::try_from(offset).ok()?)?;
        (pos < self.data.len()).then_some(pos)
    }

    fn redact_ifd(&mut self, offset: u32, level: IfdLevel) {
        let Some(start) = self.resolve(offset) else {
            log::warn!("{level:?} IFD offset {offset} lies outside the EXIF block");
            return;
        };
        let Some(count) = self.order.read_u16(self.data, start) else {
            log::warn!("{level:?} IFD at offset {offset} is truncated before its entry count");
            return;
        };

        let mut pos = start + 2;
        for i in 0..count {
            if pos + IFD_ENTRY_LEN > self.data.len() {
                log::warn!("{level:?} IFD truncated after {i} of {count} entries");
                break;
            }
            if let Some(tag) = self.order.read_u16(self.data, pos) {
                self.redact_entry(pos, tag, level);
            }
            pos += IFD_ENTRY_LEN;
        }
    }

    fn redact_entry(&mut self, pos: usize, tag: u16, level: IfdLevel) {
        if tag == TAG_EXIF_IFD_POINTER {
            match level {
                IfdLevel::Root => {
                    if let Some(sub) = self.order.read_u32(self.data, pos + VALUE_FIELD) {
                        self.redact_ifd(sub, IfdLevel::Exif);
                    }
                }
                IfdLevel::Exif => log::debug!("Ignoring Exif IFD pointer nested in the Exif IFD"),
            }
            return;
        }

        let Some(category) = self.policy.category_for(tag) else {
            return;
        };
        // The GPS pointer names a directory, not a value.
        if self.options.scrub_out_of_line && tag != TAG_GPS_IFD_POINTER {
            self.scrub_out_of_line(pos, tag);
        }
        self.data[pos + VALUE_FIELD..pos + IFD_ENTRY_LEN].fill(0);
        self.summary.record(category);
        log::debug!("Redacted tag {tag:#06x} ({}) in {level:?} IFD", category.label());
    }

    /// Zero the data an entry points at when it does not fit inline.
    fn scrub_out_of_line(&mut self, pos: usize, tag: u16) {
        let (Some(field_type), Some(count), Some(offset)) = (
            self.order.read_u16(self.data, pos + 2),
            self.order.read_u32(self.data, pos + 4),
            self.order.read_u32(self.data, pos + VALUE_FIELD),
        ) else {
            return;
        };
        let Some(unit) = type_unit_size(field_type) else {
            log::debug!("Tag {tag:#06x} has unknown type {field_type}, not scrubbing");
            return;
        };
        let Some(len) = (count as usize).checked_mul(unit) else {
            return;
        };
        // Offsets into the TIFF header are either already-zeroed fields or garbage.
        if len <= 4 || (offset as usize) < TIFF_HEADER_LEN {
            return;
        }
        let Some(start) = self.resolve(offset) else {
            log::warn!("Tag {tag:#06x} data offset {offset} lies outside the EXIF block");
            return;
        };
        let Some(end) = start.checked_add(len).filter(|&end| end <= self.data.len()) else {
            log::warn!("Tag {tag:#06x} data ({len} bytes at {offset}) overruns the EXIF block");
            return;
        };
        self.data[start..end].fill(0);
        self.summary.scrubbed_bytes += len;
    }
}
