//! Integration tests for the filter state model
//!
//! These tests check the listing invariants against a handful of record
//! collections and criteria combinations: the visible subset is always an
//! order-preserving subset of the input, an empty facet selection never
//! narrows the result, and clearing every criterion restores the full list.

use std::ops::Bound;

use chrono::{NaiveDate, NaiveDateTime};
use common::filter::{CriteriaSet, RangeBucket, Record};

#[derive(Debug, Clone, PartialEq)]
struct Log {
    id: usize,
    to: String,
    channel: &'static str,
    status: &'static str,
    sent_at: NaiveDateTime,
    cost: f64,
}

impl Record for Log {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.to]
    }

    fn facet_values(&self, facet: &str) -> Vec<&str> {
        match facet {
            "channel" => vec![self.channel],
            "status" => vec![self.status],
            _ => Vec::new(),
        }
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        Some(self.sent_at)
    }

    fn measure(&self, selector: &str) -> Option<f64> {
        (selector == "cost").then_some(self.cost)
    }
}

const CHANNELS: [&str; 3] = ["whatsapp", "email", "sms"];
const STATUSES: [&str; 3] = ["delivered", "failed", "pending"];

fn collection(size: usize) -> Vec<Log> {
    (0..size)
        .map(|id| Log {
            id,
            to: format!("user{}@example.com", id * 7 % 11),
            channel: CHANNELS[id * 5 % 3],
            status: STATUSES[id * 2 % 3],
            sent_at: NaiveDate::from_ymd_opt(2024, 1, 1 + (id % 28) as u32)
                .and_then(|day| day.and_hms_opt(12, 0, 0))
                .expect("valid timestamp"),
            cost: (id % 6) as f64 / 100.0,
        })
        .collect()
}

fn criteria_grid() -> Vec<CriteriaSet> {
    let mut grid = vec![CriteriaSet::new()];

    let mut by_channel = CriteriaSet::new();
    by_channel.set_facet("channel", ["sms", "email"]);
    grid.push(by_channel);

    let mut by_search = CriteriaSet::new();
    by_search.set_search("USER3");
    grid.push(by_search);

    let mut by_dates = CriteriaSet::new();
    by_dates
        .set_date_range(Some("2024-01-05"), Some("2024-01-20"))
        .expect("valid range");
    grid.push(by_dates);

    let mut combined = CriteriaSet::new();
    combined.set_facet("status", ["failed"]);
    combined.set_range(
        "cost",
        Some(RangeBucket::new(
            "low",
            Bound::Included(0.01),
            Bound::Included(0.03),
        )),
    );
    grid.push(combined);

    grid
}

fn is_ordered_subset(visible: &[&Log], all: &[Log]) -> bool {
    let mut remaining = all.iter();
    visible
        .iter()
        .all(|item| remaining.any(|candidate| candidate == *item))
}

#[test]
fn test_visible_records_is_ordered_subset() {
    for size in [0, 1, 5, 40] {
        let all = collection(size);
        for criteria in criteria_grid() {
            let visible = criteria.visible_records(&all);
            assert!(visible.len() <= all.len());
            assert!(
                is_ordered_subset(&visible, &all),
                "subset violated for {criteria:?} over {size} records"
            );
        }
    }
}

#[test]
fn test_empty_facet_restores_unconstrained_result() {
    let all = collection(40);
    for mut criteria in criteria_grid() {
        if criteria.facet("channel").is_some() {
            continue;
        }
        let baseline: Vec<usize> = criteria.visible_records(&all).iter().map(|l| l.id).collect();

        criteria.set_facet("channel", ["whatsapp"]);
        criteria.set_facet("channel", Vec::<&str>::new());

        let restored: Vec<usize> = criteria.visible_records(&all).iter().map(|l| l.id).collect();
        assert_eq!(baseline, restored);
    }
}

#[test]
fn test_clear_all_returns_every_record() {
    let all = collection(40);
    for mut criteria in criteria_grid() {
        criteria.clear_all();
        let visible = criteria.visible_records(&all);
        assert_eq!(visible.len(), all.len());
        assert!(visible.iter().zip(all.iter()).all(|(a, b)| *a == b));
        assert_eq!(criteria.active_constraint_count(), 0);
    }
}

#[test]
fn test_repeated_derivation_is_stable() {
    let all = collection(40);
    let snapshot = all.clone();
    for criteria in criteria_grid() {
        let first: Vec<usize> = criteria.visible_records(&all).iter().map(|l| l.id).collect();
        let second: Vec<usize> = criteria.visible_records(&all).iter().map(|l| l.id).collect();
        assert_eq!(first, second);
    }
    assert_eq!(all, snapshot);
}
