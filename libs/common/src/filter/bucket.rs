use std::ops::Bound;

use crate::error::{FilterError, FilterResult};

/// Bucket id that stands for "no range constraint"
pub const ALL_BUCKET: &str = "all";

/// One enumerated range a record measure can fall into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBucket {
    pub id: &'static str,
    pub lower: Bound<f64>,
    pub upper: Bound<f64>,
}

impl RangeBucket {
    pub const fn new(id: &'static str, lower: Bound<f64>, upper: Bound<f64>) -> Self {
        Self { id, lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above = match self.lower {
            Bound::Included(lower) => value >= lower,
            Bound::Excluded(lower) => value > lower,
            Bound::Unbounded => true,
        };
        let below = match self.upper {
            Bound::Included(upper) => value <= upper,
            Bound::Excluded(upper) => value < upper,
            Bound::Unbounded => true,
        };
        above && below
    }
}

/// A named range selector and the buckets it offers
#[derive(Debug, Clone, Copy)]
pub struct RangeSelector {
    pub name: &'static str,
    pub buckets: &'static [RangeBucket],
}

impl RangeSelector {
    /// Resolve a bucket id; blank or [`ALL_BUCKET`] resolve to no bucket
    pub fn bucket(&self, id: &str) -> FilterResult<Option<RangeBucket>> {
        let id = id.trim();
        if id.is_empty() || id == ALL_BUCKET {
            return Ok(None);
        }

        self.buckets
            .iter()
            .find(|bucket| bucket.id == id)
            .copied()
            .map(Some)
            .ok_or_else(|| FilterError::UnknownBucket {
                selector: self.name.to_string(),
                bucket: id.to_string(),
            })
    }
}
