use serde::{Deserialize, Serialize};

// Structural tag IDs
pub const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
pub const TAG_GPS_IFD_POINTER: u16 = 0x8825;
pub const TAG_COPYRIGHT: u16 = 0x8298;

const CAMERA_INFO_TAGS: &[u16] = &[
    0x010F, // Make
    0x0110, // Model
    0x9000, // ExifVersion
    0xA000, // FlashpixVersion
];

const GPS_INFO_TAGS: &[u16] = &[TAG_GPS_IFD_POINTER];

const COPYRIGHT_TAGS: &[u16] = &[TAG_COPYRIGHT];

const DATE_TIME_TAGS: &[u16] = &[
    0x0132, // DateTime
    0x9003, // DateTimeOriginal
    0x9004, // DateTimeDigitized
];

const USER_INFO_TAGS: &[u16] = &[
    0x9286, // UserComment
    0x927C, // MakerNote
    TAG_COPYRIGHT,
];

const TECHNICAL_DETAIL_TAGS: &[u16] = &[
    0x9207, // MeteringMode
    0x9209, // Flash
    0x829A, // ExposureTime
    0x829D, // FNumber
    0x8822, // ExposureProgram
    0x9204, // ExposureBiasValue
    0x8827, // ISOSpeedRatings
    0x9201, // ShutterSpeedValue
    0x9202, // ApertureValue
    0x9205, // MaxApertureValue
    0x9206, // SubjectDistance
    0x920A, // FocalLength
    0xA405, // FocalLengthIn35mmFilm
];

/// A semantic group of EXIF tags that can be redacted as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    CameraInfo,
    GpsInfo,
    Copyright,
    DateTime,
    UserInfo,
    TechnicalDetail,
}

impl TagCategory {
    /// Every category, in table order.
    pub const ALL: [TagCategory; 6] = [
        TagCategory::CameraInfo,
        TagCategory::GpsInfo,
        TagCategory::Copyright,
        TagCategory::DateTime,
        TagCategory::UserInfo,
        TagCategory::TechnicalDetail,
    ];

    /// TIFF tag IDs covered by this category.
    ///
    /// Copyright (0x8298) appears under both `Copyright` and `UserInfo`.
    /// The Exif sub-IFD pointer (0x8769) is in no category: it is always
    /// followed and never zeroed.
    pub fn tags(self) -> &'static [u16] {
        match self {
            TagCategory::CameraInfo => CAMERA_INFO_TAGS,
            TagCategory::GpsInfo => GPS_INFO_TAGS,
            TagCategory::Copyright => COPYRIGHT_TAGS,
            TagCategory::DateTime => DATE_TIME_TAGS,
            TagCategory::UserInfo => USER_INFO_TAGS,
            TagCategory::TechnicalDetail => TECHNICAL_DETAIL_TAGS,
        }
    }

    /// Short label for display and JSON output.
    pub fn label(self) -> &'static str {
        match self {
            TagCategory::CameraInfo => "camera",
            TagCategory::GpsInfo => "gps",
            TagCategory::Copyright => "copyright",
            TagCategory::DateTime => "datetime",
            TagCategory::UserInfo => "user",
            TagCategory::TechnicalDetail => "technical",
        }
    }
}

/// Which categories of EXIF metadata to remove.
///
/// The default policy removes nothing, so redacting with it reproduces the
/// input byte for byte.
///
/// # Example
///
/// ```rust
/// use exif_redact::{RedactionPolicy, TagCategory};
///
/// let policy = RedactionPolicy {
///     remove_gps_info: true,
///     remove_date_time: true,
///     ..Default::default()
/// };
/// assert_eq!(policy.category_for(0x8825), Some(TagCategory::GpsInfo));
/// assert_eq!(policy.category_for(0x010F), None); // camera info kept
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionPolicy {
    pub remove_camera_info: bool,
    pub remove_gps_info: bool,
    pub remove_copyright: bool,
    pub remove_date_time: bool,
    pub remove_user_info: bool,
    pub remove_technical_detail: bool,
}

impl RedactionPolicy {
    /// A policy with every category enabled.
    pub fn all() -> Self {
        Self {
            remove_camera_info: true,
            remove_gps_info: true,
            remove_copyright: true,
            remove_date_time: true,
            remove_user_info: true,
            remove_technical_detail: true,
        }
    }

    /// Build a policy enabling exactly the given categories.
    pub fn from_categories(categories: &[TagCategory]) -> Self {
        let mut policy = Self::default();
        for &category in categories {
            policy.set(category, true);
        }
        policy
    }

    pub fn is_enabled(&self, category: TagCategory) -> bool {
        match category {
            TagCategory::CameraInfo => self.remove_camera_info,
            TagCategory::GpsInfo => self.remove_gps_info,
            TagCategory::Copyright => self.remove_copyright,
            TagCategory::DateTime => self.remove_date_time,
            TagCategory::UserInfo => self.remove_user_info,
            TagCategory::TechnicalDetail => self.remove_technical_detail,
        }
    }

    pub fn set(&mut self, category: TagCategory, enabled: bool) {
        let switch = match category {
            TagCategory::CameraInfo => &mut self.remove_camera_info,
            TagCategory::GpsInfo => &mut self.remove_gps_info,
            TagCategory::Copyright => &mut self.remove_copyright,
            TagCategory::DateTime => &mut self.remove_date_time,
            TagCategory::UserInfo => &mut self.remove_user_info,
            TagCategory::TechnicalDetail => &mut self.remove_technical_detail,
        };
        *switch = enabled;
    }

    /// True when no category is enabled.
    pub fn is_empty(&self) -> bool {
        TagCategory::ALL.iter().all(|&c| !self.is_enabled(c))
    }

    /// Enabled categories, in table order.
    pub fn enabled_categories(&self) -> Vec<TagCategory> {
        TagCategory::ALL
            .into_iter()
            .filter(|&c| self.is_enabled(c))
            .collect()
    }

    /// The first enabled category covering `tag`, or `None` if the tag
    /// should be left alone.
    pub fn category_for(&self, tag: u16) -> Option<TagCategory> {
        TagCategory::ALL
            .into_iter()
            .find(|&c| self.is_enabled(c) && c.tags().contains(&tag))
    }
}

/// Behaviour switches beyond the tag policy. All are off by default, which
/// leaves PNG checksums, out-of-line tag data and prefix-less `eXIf`
/// chunks untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactOptions {
    /// Recompute the CRC-32 of a redacted `eXIf` chunk instead of copying
    /// the original (now stale) checksum.
    pub recompute_png_crc: bool,
    /// Also zero the bytes an entry points at when its data does not fit in
    /// the 4-byte value field.
    pub scrub_out_of_line: bool,
    /// Redact `eXIf` chunks that start directly with a TIFF header (the
    /// layout the PNG specification prescribes) rather than `Exif\0\0`.
    pub bare_tiff_chunks: bool,
}
