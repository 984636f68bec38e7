//! Listing views: query parsing, filtering and paging
//!
//! Each listing is described by a [`ViewSpec`] naming the facets, range
//! selectors and date filter it accepts. A request's query string is turned
//! into a fresh [`CriteriaSet`] and [`PageRequest`]; the visible subset is
//! derived and then paged.

use std::collections::HashMap;
use std::ops::Bound;

use common::config::AppConfig;
use common::filter::{CriteriaSet, Page, PageRequest, RangeBucket, RangeSelector, Record};
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::models::{admin, api_key, delivery, template};

const SEARCH_PARAM: &str = "search";
const START_PARAM: &str = "start";
const END_PARAM: &str = "end";
const PAGE_PARAM: &str = "page";
const LIMIT_PARAM: &str = "limit";

pub const DELIVERY_TIME: RangeSelector = RangeSelector {
    name: delivery::measures::DELIVERY_TIME,
    buckets: &[
        RangeBucket::new("fast", Bound::Unbounded, Bound::Excluded(5.0)),
        RangeBucket::new("medium", Bound::Included(5.0), Bound::Included(30.0)),
        RangeBucket::new("slow", Bound::Excluded(30.0), Bound::Unbounded),
    ],
};

pub const COST: RangeSelector = RangeSelector {
    name: delivery::measures::COST,
    buckets: &[
        RangeBucket::new("free", Bound::Included(0.0), Bound::Included(0.0)),
        RangeBucket::new("low", Bound::Included(0.01), Bound::Included(0.03)),
        RangeBucket::new("high", Bound::Included(0.04), Bound::Unbounded),
    ],
};

/// Filters a listing accepts
#[derive(Debug, Clone, Copy)]
pub struct ViewSpec {
    pub name: &'static str,
    pub facets: &'static [&'static str],
    pub ranges: &'static [RangeSelector],
    pub dated: bool,
}

pub const DELIVERY_LOGS: ViewSpec = ViewSpec {
    name: "delivery_logs",
    facets: &[
        delivery::facets::STATUS,
        delivery::facets::CHANNEL,
        delivery::facets::TEMPLATE,
        delivery::facets::USER,
    ],
    ranges: &[DELIVERY_TIME, COST],
    dated: true,
};

pub const TEMPLATES: ViewSpec = ViewSpec {
    name: "templates",
    facets: &[template::CHANNEL_FACET, template::STATUS_FACET],
    ranges: &[],
    dated: false,
};

pub const API_KEYS: ViewSpec = ViewSpec {
    name: "api_keys",
    facets: &[api_key::STATUS_FACET, api_key::PERMISSION_FACET],
    ranges: &[],
    dated: true,
};

pub const ADMIN_USERS: ViewSpec = ViewSpec {
    name: "admin_users",
    facets: &[admin::PLAN_FACET, admin::STATUS_FACET],
    ranges: &[],
    dated: true,
};

pub const REVIEW_TEMPLATES: ViewSpec = ViewSpec {
    name: "review_templates",
    facets: &[template::CHANNEL_FACET, template::STATUS_FACET],
    ranges: &[],
    dated: false,
};

pub const SYSTEM_LOGS: ViewSpec = ViewSpec {
    name: "system_logs",
    facets: &[admin::LEVEL_FACET, admin::CATEGORY_FACET],
    ranges: &[],
    dated: true,
};

/// Page size settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl From<&AppConfig> for Paging {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_limit: config.default_page_size,
            max_limit: config.max_page_size,
        }
    }
}

/// Criteria and page requested by one listing call
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub criteria: CriteriaSet,
    pub page: PageRequest,
}

impl ListingQuery {
    /// Build the query for `spec` from raw query parameters
    ///
    /// Parameters the view does not know are ignored.
    pub fn parse(
        spec: &ViewSpec,
        params: &HashMap<String, String>,
        paging: Paging,
    ) -> ApiResult<Self> {
        let mut criteria = CriteriaSet::new();

        if let Some(search) = params.get(SEARCH_PARAM) {
            criteria.set_search(search.as_str());
        }

        for facet in spec.facets {
            if let Some(values) = params.get(*facet) {
                criteria.set_facet(facet, split_values(values));
            }
        }

        if spec.dated {
            criteria.set_date_range(
                params.get(START_PARAM).map(String::as_str),
                params.get(END_PARAM).map(String::as_str),
            )?;
        }

        for selector in spec.ranges {
            if let Some(bucket) = params.get(selector.name) {
                criteria.set_range(selector.name, selector.bucket(bucket)?);
            }
        }

        let page = PageRequest::new(
            number(params, PAGE_PARAM)?,
            number(params, LIMIT_PARAM)?,
            paging.default_limit,
            paging.max_limit,
        );

        Ok(Self { criteria, page })
    }
}

fn split_values(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect()
}

fn number(params: &HashMap<String, String>, key: &str) -> ApiResult<Option<u32>> {
    match params.get(key).map(|value| value.trim()) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{} must be a positive integer", key))),
    }
}

/// One page of a listing plus the number of active constraints
#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse<T> {
    #[serde(flatten)]
    pub page: Page<T>,
    pub active_filters: usize,
}

/// Filter `records` with the query's criteria and cut out the requested page
pub fn list<T>(spec: &ViewSpec, records: &[T], query: &ListingQuery) -> ListingResponse<T>
where
    T: Record + Clone,
{
    let visible = query.criteria.visible_records(records);
    debug!(
        "{}: {} of {} records visible, page {}",
        spec.name,
        visible.len(),
        records.len(),
        query.page.page
    );

    ListingResponse {
        page: Page::slice(&visible, query.page),
        active_filters: query.criteria.active_constraint_count(),
    }
}
