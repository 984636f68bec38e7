//! Custom error types for the common library
//!
//! This module defines the errors raised while building filter criteria and
//! while loading configuration.

use chrono::NaiveDate;
use thiserror::Error;

/// Error raised when a filter criterion cannot be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A date bound is not a `YYYY-MM-DD` calendar date
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// The start bound falls after the end bound
    #[error("Date range start {start} is after end {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    /// The bucket id is not part of the selector's catalogue
    #[error("Unknown bucket '{bucket}' for range '{selector}'")]
    UnknownBucket { selector: String, bucket: String },
}

/// Type alias for Result with FilterError
pub type FilterResult<T> = Result<T, FilterError>;

/// Error raised while loading application configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration source could not be read or deserialized
    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    /// A value was read but is out of its allowed range
    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
