use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{FilterError, FilterResult};

/// Inclusive calendar date range; a missing bound is open on that side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Build a range, rejecting a start that falls after the end
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> FilterResult<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(FilterError::InvertedDateRange { start, end });
            }
        }

        Ok(Self { start, end })
    }

    /// Parse ISO `YYYY-MM-DD` bounds; blank or absent bounds are open
    pub fn parse(start: Option<&str>, end: Option<&str>) -> FilterResult<Self> {
        Self::new(parse_bound(start)?, parse_bound(end)?)
    }

    /// True when neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether `timestamp` falls on a day inside the range
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let day = timestamp.date();
        self.start.is_none_or(|start| day >= start) && self.end.is_none_or(|end| day <= end)
    }
}

fn parse_bound(value: Option<&str>) -> FilterResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FilterError::InvalidDate {
                value: value.to_string(),
            }),
    }
}
