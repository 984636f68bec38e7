use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{DateRange, RangeBucket, Record};
use crate::error::FilterResult;

/// Search text, facet selections, date range and range buckets for one listing
///
/// The default value matches every record. A facet with no selected values
/// places no constraint on the result; there is no "match nothing" state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaSet {
    search: String,
    facets: BTreeMap<String, BTreeSet<String>>,
    date_range: DateRange,
    ranges: BTreeMap<String, RangeBucket>,
}

impl CriteriaSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Selected values for `facet`, if the facet is constrained
    pub fn facet(&self, facet: &str) -> Option<&BTreeSet<String>> {
        self.facets.get(facet)
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    /// Selected bucket for the range selector `selector`
    pub fn range(&self, selector: &str) -> Option<&RangeBucket> {
        self.ranges.get(selector)
    }

    /// Replace the selection for `facet`; an empty selection lifts the constraint
    pub fn set_facet<I, S>(&mut self, facet: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.facets.remove(facet);
        } else {
            self.facets.insert(facet.to_string(), values);
        }
    }

    /// Replace the free-text query
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Replace the date range from ISO `YYYY-MM-DD` bounds
    ///
    /// On error the previous range stays in force.
    pub fn set_date_range(&mut self, start: Option<&str>, end: Option<&str>) -> FilterResult<()> {
        self.date_range = DateRange::parse(start, end)?;
        Ok(())
    }

    /// Select a bucket for `selector`, or clear it with `None`
    pub fn set_range(&mut self, selector: &str, bucket: Option<RangeBucket>) {
        match bucket {
            Some(bucket) => {
                self.ranges.insert(selector.to_string(), bucket);
            }
            None => {
                self.ranges.remove(selector);
            }
        }
    }

    /// Reset every criterion to its default in one step
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        self.active_constraint_count() == 0
    }

    /// Number of criteria currently narrowing the result
    pub fn active_constraint_count(&self) -> usize {
        let search = usize::from(!self.search.is_empty());
        let dates = usize::from(!self.date_range.is_unbounded());
        search + dates + self.facets.len() + self.ranges.len()
    }

    /// Whether a single record satisfies every active criterion
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.matches_search(record)
            && self.matches_facets(record)
            && self.matches_dates(record)
            && self.matches_ranges(record)
    }

    /// Records that satisfy every active criterion, in their original order
    pub fn visible_records<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        let visible: Vec<&R> = records.iter().filter(|r| self.matches(*r)).collect();
        debug!(
            "Filtered {} records to {} with {} active constraints",
            records.len(),
            visible.len(),
            self.active_constraint_count()
        );
        visible
    }

    fn matches_search<R: Record>(&self, record: &R) -> bool {
        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_facets<R: Record>(&self, record: &R) -> bool {
        self.facets.iter().all(|(facet, selected)| {
            record
                .facet_values(facet)
                .iter()
                .any(|value| selected.contains(*value))
        })
    }

    fn matches_dates<R: Record>(&self, record: &R) -> bool {
        if self.date_range.is_unbounded() {
            return true;
        }

        record
            .timestamp()
            .is_some_and(|timestamp| self.date_range.contains(timestamp))
    }

    fn matches_ranges<R: Record>(&self, record: &R) -> bool {
        self.ranges.iter().all(|(selector, bucket)| {
            record
                .measure(selector)
                .is_some_and(|value| bucket.contains(value))
        })
    }
}
