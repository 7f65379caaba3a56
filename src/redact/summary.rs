use serde::Serialize;
use std::collections::BTreeMap;

use super::policy::TagCategory;

/// What a redaction run touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactSummary {
    /// APP1 segments / `eXIf` chunks handed to the EXIF processor.
    pub exif_blocks: usize,
    /// Of those, blocks that carried a usable TIFF header.
    pub tiff_blocks: usize,
    /// Zeroed IFD entries per category.
    pub redacted: BTreeMap<TagCategory, usize>,
    /// Out-of-line value bytes zeroed (only with `scrub_out_of_line`).
    pub scrubbed_bytes: usize,
}

impl RedactSummary {
    pub(crate) fn record(&mut self, category: TagCategory) {
        *self.redacted.entry(category).or_default() += 1;
    }

    /// Entries zeroed for one category.
    pub fn count(&self, category: TagCategory) -> usize {
        self.redacted.get(&category).copied().unwrap_or(0)
    }

    /// Entries zeroed across all categories.
    pub fn total_redacted(&self) -> usize {
        self.redacted.values().sum()
    }

    /// Labels of the categories that had at least one entry zeroed.
    pub fn categories_hit(&self) -> Vec<&'static str> {
        self.redacted
            .iter()
            .filter(|&(_, &n)| n > 0)
            .map(|(c, _)| c.label())
            .collect()
    }
}
