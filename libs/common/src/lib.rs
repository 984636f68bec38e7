//! Common library for the OTPFlow console
//!
//! This crate provides functionality shared by the console services: the
//! filter state model used by every listing view, configuration loading and
//! the related error types.
//!
//! ```rust
//! use common::filter::{CriteriaSet, Record};
//!
//! struct Log {
//!     channel: &'static str,
//! }
//!
//! impl Record for Log {
//!     fn search_fields(&self) -> Vec<&str> {
//!         vec![self.channel]
//!     }
//!
//!     fn facet_values(&self, facet: &str) -> Vec<&str> {
//!         match facet {
//!             "channel" => vec![self.channel],
//!             _ => Vec::new(),
//!         }
//!     }
//! }
//!
//! let logs = [Log { channel: "sms" }, Log { channel: "email" }];
//! let mut criteria = CriteriaSet::new();
//! criteria.set_facet("channel", ["sms"]);
//! assert_eq!(criteria.visible_records(&logs).len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod filter;
