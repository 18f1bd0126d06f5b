//! Error types for the Billable Hours Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while calculating, storing and
//! allocating billable time.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Billable Hours Engine.
///
/// Negative billable hours are never reported through this type; they are
/// clamped to zero where they are computed.
///
/// # Example
///
/// ```
/// use billable_hours_engine::error::EngineError;
/// use chrono::NaiveDate;
///
/// let error = EngineError::NoRecordsFound {
///     date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
/// };
/// assert_eq!(error.to_string(), "No work records found for 2025-06-03");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Settings file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Settings file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A rounding method string was not one of `up`, `down` or `nearest`.
    ///
    /// Only strict parsing returns this; settings lookups recover to `nearest`.
    #[error("Invalid rounding method: '{value}'")]
    InvalidRoundingMethod {
        /// The rejected value.
        value: String,
    },

    /// No work record exists with the given id.
    #[error("Work record not found: {id}")]
    RecordNotFound {
        /// The missing record id.
        id: u64,
    },

    /// A work record field was invalid.
    #[error("Invalid work record field '{field}': {message}")]
    InvalidRecord {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No work records exist for the requested date.
    #[error("No work records found for {date}")]
    NoRecordsFound {
        /// The date that had no records.
        date: NaiveDate,
    },

    /// The records on a date have zero total billable hours, so there is no
    /// weight to allocate against.
    #[error("No billable hours to allocate against on {date}")]
    NoAllocationBasis {
        /// The date with no allocation basis.
        date: NaiveDate,
    },

    /// A day's pooled minutes or base hours are too large to allocate.
    #[error("Allocation overflow on {date}: minutes or hours out of range")]
    AllocationOverflow {
        /// The day that could not be allocated.
        date: NaiveDate,
    },

    /// A date range ended before it started.
    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange {
        /// The first day of the range.
        start: NaiveDate,
        /// The last day of the range.
        end: NaiveDate,
    },

    /// The backing record store failed.
    #[error("Record store error: {message}")]
    StoreError {
        /// A description of the store failure.
        message: String,
    },

    /// An allocation apply stopped partway through. Dates listed in
    /// `applied_dates` remain applied and are not rolled back.
    #[error("Batch apply failed on {date}: {message}")]
    PartialBatchFailure {
        /// The date whose update failed.
        date: NaiveDate,
        /// The underlying failure.
        message: String,
        /// Dates fully applied before the failure.
        applied_dates: Vec<NaiveDate>,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
