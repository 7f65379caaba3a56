//! Synthetic EXIF, JPEG and PNG fixtures for unit tests.
//!
//! Everything is built in memory so tests can state exactly which tags a
//! block carries and where their value fields live.
//!
//! ```rust,ignore
//! let block = ExifBuilder::new(Endian::Big)
//!     .ifd0(TestEntry::ascii(0x010F, "Canon"))
//!     .exif(TestEntry::ascii(0x9003, "2023:01:01 12:00:00"))
//!     .build();
//! let jpeg = jpeg_with_app1(&block);
//! ```

use crate::redact::policy::{TAG_COPYRIGHT, TAG_EXIF_IFD_POINTER, TAG_GPS_IFD_POINTER};
use crate::redact::tiff::{
    EXIF_HEADER, Endian, IFD_ENTRY_LEN, TYPE_ASCII, TYPE_LONG, TYPE_SHORT, TYPE_UNDEFINED,
};

// =========================================================================
// EXIF blocks
// =========================================================================

#[derive(Debug, Clone)]
pub enum TestValue {
    /// Raw bytes for the value field, written as-is.
    Inline([u8; 4]),
    Short(u16),
    Long(u32),
    /// Out-of-line data; the value field becomes its offset.
    Data(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct TestEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    pub value: TestValue,
}

impl TestEntry {
    pub fn ascii(tag: u16, s: &str) -> Self {
        let mut bytes = s.as_bytes().to_vec();
        bytes.push(0);
        Self::bytes(tag, TYPE_ASCII, bytes)
    }

    pub fn undefined(tag: u16, data: &[u8]) -> Self {
        Self::bytes(tag, TYPE_UNDEFINED, data.to_vec())
    }

    pub fn short(tag: u16, value: u16) -> Self {
        Self {
            tag,
            field_type: TYPE_SHORT,
            count: 1,
            value: TestValue::Short(value),
        }
    }

    pub fn long(tag: u16, value: u32) -> Self {
        Self {
            tag,
            field_type: TYPE_LONG,
            count: 1,
            value: TestValue::Long(value),
        }
    }

    fn bytes(tag: u16, field_type: u16, bytes: Vec<u8>) -> Self {
        let count = bytes.len() as u32;
        let value = if bytes.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..bytes.len()].copy_from_slice(&bytes);
            TestValue::Inline(inline)
        } else {
            TestValue::Data(bytes)
        };
        Self {
            tag,
            field_type,
            count,
            value,
        }
    }
}

/// Builds `Exif\0\0` + TIFF header + IFD0 (+ Exif sub-IFD) + value data.
///
/// When any Exif sub-IFD entry is given, a 0x8769 pointer is appended to
/// IFD0. Entries keep insertion order.
pub struct ExifBuilder {
    order: Endian,
    ifd0: Vec<TestEntry>,
    exif: Vec<TestEntry>,
}

impl ExifBuilder {
    pub fn new(order: Endian) -> Self {
        Self {
            order,
            ifd0: Vec::new(),
            exif: Vec::new(),
        }
    }

    pub fn ifd0(mut self, entry: TestEntry) -> Self {
        self.ifd0.push(entry);
        self
    }

    pub fn exif(mut self, entry: TestEntry) -> Self {
        self.exif.push(entry);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let order = self.order;
        let mut ifd0 = self.ifd0;
        let exif = self.exif;

        let ifd_len = |n: usize| 2 + n * IFD_ENTRY_LEN + 4;
        let ifd0_offset = 8usize;
        let ifd0_count = ifd0.len() + usize::from(!exif.is_empty());
        let exif_offset = ifd0_offset + ifd_len(ifd0_count);
        if !exif.is_empty() {
            ifd0.push(TestEntry::long(TAG_EXIF_IFD_POINTER, exif_offset as u32));
        }
        let mut data_offset = if exif.is_empty() {
            exif_offset
        } else {
            exif_offset + ifd_len(exif.len())
        };

        let mut tiff = Vec::new();
        tiff.extend_from_slice(match order {
            Endian::Little => b"II\x2A\x00",
            Endian::Big => b"MM\x00\x2A",
        });
        tiff.extend_from_slice(&u32_bytes(order, ifd0_offset as u32));

        let mut data_area = Vec::new();
        write_ifd(order, &mut tiff, &ifd0, &mut data_area, &mut data_offset);
        if !exif.is_empty() {
            write_ifd(order, &mut tiff, &exif, &mut data_area, &mut data_offset);
        }
        tiff.extend_from_slice(&data_area);

        let mut block = EXIF_HEADER.to_vec();
        block.extend_from_slice(&tiff);
        block
    }
}

fn write_ifd(
    order: Endian,
    tiff: &mut Vec<u8>,
    entries: &[TestEntry],
    data_area: &mut Vec<u8>,
    data_offset: &mut usize,
) {
    tiff.extend_from_slice(&u16_bytes(order, entries.len() as u16));
    for entry in entries {
        tiff.extend_from_slice(&u16_bytes(order, entry.tag));
        tiff.extend_from_slice(&u16_bytes(order, entry.field_type));
        tiff.extend_from_slice(&u32_bytes(order, entry.count));
        let field = match &entry.value {
            TestValue::Inline(raw) => *raw,
            TestValue::Short(v) => {
                let b = u16_bytes(order, *v);
                [b[0], b[1], 0, 0]
            }
            TestValue::Long(v) => u32_bytes(order, *v),
            TestValue::Data(bytes) => {
                let field = u32_bytes(order, *data_offset as u32);
                data_area.extend_from_slice(bytes);
                *data_offset += bytes.len();
                field
            }
        };
        tiff.extend_from_slice(&field);
    }
    tiff.extend_from_slice(&[0u8; 4]); // next IFD
}

fn u16_bytes(order: Endian, v: u16) -> [u8; 2] {
    match order {
        Endian::Little => v.to_le_bytes(),
        Endian::Big => v.to_be_bytes(),
    }
}

fn u32_bytes(order: Endian, v: u32) -> [u8; 4] {
    match order {
        Endian::Little => v.to_le_bytes(),
        Endian::Big => v.to_be_bytes(),
    }
}

/// A block with one tag from most categories, including the
/// DateTimeOriginal `"2023:01:01 12:00:00"` in the Exif sub-IFD.
pub fn sample_exif(order: Endian) -> Vec<u8> {
    ExifBuilder::new(order)
        .ifd0(TestEntry::ascii(0x010F, "Canon"))
        .ifd0(TestEntry::short(0x0112, 1)) // Orientation, never redacted
        .ifd0(TestEntry::ascii(0x0132, "2023:01:01 12:00:00"))
        .ifd0(TestEntry::ascii(TAG_COPYRIGHT, "(c) Jane Roe"))
        .ifd0(TestEntry::long(TAG_GPS_IFD_POINTER, 0x0400))
        .exif(TestEntry::undefined(0x9000, b"0232"))
        .exif(TestEntry::ascii(0x9003, "2023:01:01 12:00:00"))
        .exif(TestEntry::short(0x8827, 400))
        .exif(TestEntry::undefined(0x9286, b"ASCII\0\0\0hello"))
        .build()
}

/// Absolute position of the first entry for `tag` in IFD0 or the Exif
/// sub-IFD of an EXIF block (with or without the `Exif\0\0` prefix).
pub fn find_entry(block: &[u8], tag: u16) -> Option<usize> {
    let tiff_start = if block.starts_with(EXIF_HEADER) {
        EXIF_HEADER.len()
    } else {
        0
    };
    let order = Endian::from_marker(block.get(tiff_start..tiff_start + 2)?)?;
    let ifd0 = order.read_u32(block, tiff_start + 4)? as usize;

    let scan = |offset: usize| -> (Option<usize>, Option<usize>) {
        let start = tiff_start + offset;
        let Some(count) = order.read_u16(block, start) else {
            return (None, None);
        };
        let mut found = None;
        let mut sub = None;
        for i in 0..count as usize {
            let pos = start + 2 + i * IFD_ENTRY_LEN;
            match order.read_u16(block, pos) {
                Some(t) if t == tag && found.is_none() => found = Some(pos),
                Some(TAG_EXIF_IFD_POINTER) => {
                    sub = order.read_u32(block, pos + 8).map(|o| o as usize);
                }
                _ => {}
            }
        }
        (found, sub)
    };

    let (found, sub) = scan(ifd0);
    found.or_else(|| sub.and_then(|o| scan(o).0))
}

/// Raw value/offset field of the entry for `tag`.
pub fn value_field(block: &[u8], tag: u16) -> Option<[u8; 4]> {
    let pos = find_entry(block, tag)?;
    block.get(pos + 8..pos + 12)?.try_into().ok()
}

// =========================================================================
// Containers
// =========================================================================

/// A minimal baseline JPEG: SOI, APP0 (JFIF), the given APP1 payload, DQT,
/// SOS with scan data, EOI.
pub fn jpeg_with_app1(payload: &[u8]) -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend_from_slice(&jpeg_segment(0xE0, b"JFIF\0\x01\x02\x00\x00\x01\x00\x01\x00\x00"));
    jpeg.extend_from_slice(&jpeg_segment(0xE1, payload));
    jpeg.extend_from_slice(&jpeg_segment(0xDB, &[0x00; 65]));
    jpeg.extend_from_slice(&jpeg_segment(0xDA, &[0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]));
    // entropy-coded data, including a stuffed 0xFF00 and an 0xFFE1 lookalike
    jpeg.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34, 0xFF, 0xE1, 0x00, 0x02, 0x56]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

pub fn jpeg_segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut seg = vec![0xFF, marker];
    seg.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    seg.extend_from_slice(payload);
    seg
}

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A minimal PNG: signature, IHDR, eXIf with the given data, IDAT, IEND.
pub fn png_with_exif(data: &[u8]) -> Vec<u8> {
    let mut png = PNG_SIGNATURE.to_vec();
    png.extend_from_slice(&png_chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
    png.extend_from_slice(&png_chunk(b"eXIf", data));
    let idat = [0x78, 0x9C, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01];
    png.extend_from_slice(&png_chunk(b"IDAT", &idat));
    png.extend_from_slice(&png_chunk(b"IEND", &[]));
    png
}

pub fn png_chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut chunk = (data.len() as u32).to_be_bytes().to_vec();
    chunk.extend_from_slice(chunk_type);
    chunk.extend_from_slice(data);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    chunk.extend_from_slice(&hasher.finalize().to_be_bytes());
    chunk
}
