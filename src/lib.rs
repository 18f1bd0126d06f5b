//! Billable Hours Engine for landscaping work records
//!
//! This crate derives billable hours from a work record's time fields, snaps
//! them to half-hours according to a runtime rounding setting, decides when
//! billable hours must be recomputed on update, and redistributes a day's
//! break or travel minutes across that day's records in proportion to their
//! billable hours.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod sync;
