//! Filter state model for listing views
//!
//! A [`CriteriaSet`] holds the search text, facet selections, date range and
//! range buckets for one listing. Records opt in by implementing [`Record`];
//! [`CriteriaSet::visible_records`] then derives the visible subset.
//!
//! An empty selection never narrows the result: a default criteria set
//! matches every record.

mod bucket;
mod criteria;
mod date_range;
mod page;

use chrono::NaiveDateTime;

pub use bucket::{ALL_BUCKET, RangeBucket, RangeSelector};
pub use criteria::CriteriaSet;
pub use date_range::DateRange;
pub use page::{Page, PageRequest};

/// A listing entry that can be matched against a [`CriteriaSet`]
pub trait Record {
    /// Fields the free-text search is matched against
    fn search_fields(&self) -> Vec<&str>;

    /// Values the record carries for `facet`; empty when it has none
    fn facet_values(&self, facet: &str) -> Vec<&str>;

    /// Point in time used by date range filtering
    fn timestamp(&self) -> Option<NaiveDateTime> {
        None
    }

    /// Numeric measure inspected by the range selector named `selector`
    fn measure(&self, _selector: &str) -> Option<f64> {
        None
    }
}
