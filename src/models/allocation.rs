//! Proportional time allocation models.
//!
//! An allocation pools a day's raw break or travel minutes and hands them back
//! to the day's work records in proportion to their billable hours. These types
//! carry the preview ([`AllocationResult`]) and the outcome of writing it back
//! ([`AppliedResult`]).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{AuditWarning, RecordId, WorkRecord, WorkRecordUpdate};

/// Which way allocated minutes move billable hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationDirection {
    /// Allocated minutes are added to billable hours.
    Add,
    /// Allocated minutes are deducted from billable hours.
    Subtract,
}

/// The pool of minutes being redistributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationKind {
    /// Break time, deducted from billable hours once allocated.
    Break,
    /// Travel time, billed once allocated.
    Travel,
}

impl AllocationKind {
    /// Returns the direction this kind moves billable hours.
    ///
    /// # Example
    ///
    /// ```
    /// use billable_hours_engine::models::{AllocationDirection, AllocationKind};
    ///
    /// assert_eq!(AllocationKind::Travel.direction(), AllocationDirection::Add);
    /// assert_eq!(AllocationKind::Break.direction(), AllocationDirection::Subtract);
    /// ```
    pub fn direction(self) -> AllocationDirection {
        match self {
            AllocationKind::Break => AllocationDirection::Subtract,
            AllocationKind::Travel => AllocationDirection::Add,
        }
    }

    /// The raw minutes a record contributes to the pool.
    pub fn raw_minutes(self, record: &WorkRecord) -> u32 {
        match self {
            AllocationKind::Break => record.break_time_minutes,
            AllocationKind::Travel => record.travel_time_minutes,
        }
        .unwrap_or(0)
    }

    /// The adjustment a previous allocation of this kind left on the record.
    pub fn adjusted_minutes(self, record: &WorkRecord) -> Option<u32> {
        match self {
            AllocationKind::Break => record.adjusted_break_time_minutes,
            AllocationKind::Travel => record.adjusted_travel_time_minutes,
        }
    }

    /// Builds the update that stores `minutes` as this kind's adjustment.
    pub fn adjustment_update(self, minutes: u32) -> WorkRecordUpdate {
        match self {
            AllocationKind::Break => WorkRecordUpdate {
                adjusted_break_time_minutes: Some(Some(minutes)),
                ..Default::default()
            },
            AllocationKind::Travel => WorkRecordUpdate {
                adjusted_travel_time_minutes: Some(Some(minutes)),
                ..Default::default()
            },
        }
    }

    /// Lowercase label used in logs and warnings.
    pub fn label(self) -> &'static str {
        match self {
            AllocationKind::Break => "break",
            AllocationKind::Travel => "travel",
        }
    }
}

/// The day or inclusive day range an allocation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AllocationTarget {
    /// A single day. Missing records are an error.
    Date {
        /// The day to allocate.
        date: NaiveDate,
    },
    /// Every day from `start` to `end` inclusive. Days without records are skipped.
    Range {
        /// The first day.
        start: NaiveDate,
        /// The last day.
        end: NaiveDate,
    },
}

impl AllocationTarget {
    /// Returns the first and last day covered.
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        match *self {
            AllocationTarget::Date { date } => (date, date),
            AllocationTarget::Range { start, end } => (start, end),
        }
    }
}

/// How one record fares in a day's allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAllocation {
    /// The record.
    pub record_id: RecordId,
    /// The record's client.
    pub client_id: String,
    /// The client's display name.
    pub client_name: Option<String>,
    /// Raw minutes this record put into the pool.
    pub raw_minutes: u32,
    /// Adjustment from an earlier allocation that this one replaces.
    pub previous_adjusted_minutes: Option<u32>,
    /// Billable hours as currently stored.
    pub current_billable_hours: Decimal,
    /// Billable hours with the previous adjustment reversed.
    pub base_billable_hours: Decimal,
    /// The record's share of the day's base billable hours.
    pub share: Decimal,
    /// Minutes assigned to this record.
    pub allocated_minutes: u32,
    /// Billable hours once the allocation is applied.
    pub new_billable_hours: Decimal,
}

/// Allocation totals for one client on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAllocationSummary {
    /// The client.
    pub client_id: String,
    /// The client's display name.
    pub client_name: Option<String>,
    /// Number of the client's records on the day.
    pub record_count: usize,
    /// Raw minutes the client's records contributed.
    pub raw_minutes: u32,
    /// Minutes allocated to the client's records.
    pub allocated_minutes: u32,
    /// Sum of base billable hours.
    pub base_billable_hours: Decimal,
    /// Sum of billable hours after allocation.
    pub new_billable_hours: Decimal,
}

/// A single day's allocation preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAllocation {
    /// The day.
    pub date: NaiveDate,
    /// The pool being redistributed.
    pub kind: AllocationKind,
    /// Total raw minutes pooled from the day's records.
    pub pool_minutes: u32,
    /// Sum of base billable hours across the day.
    pub total_base_billable_hours: Decimal,
    /// Sum of allocated minutes; may fall short of the pool by flooring.
    pub total_allocated_minutes: u32,
    /// Per-record results, in record id order.
    pub records: Vec<RecordAllocation>,
    /// Per-client totals, in client id order.
    pub clients: Vec<ClientAllocationSummary>,
    /// Non-fatal issues found while allocating.
    pub warnings: Vec<AuditWarning>,
}

impl DayAllocation {
    /// Minutes lost to flooring.
    pub fn shortfall_minutes(&self) -> u32 {
        self.pool_minutes.saturating_sub(self.total_allocated_minutes)
    }
}

/// A day in a range that could not be allocated.
///
/// The rest of the range is still previewed; the day can be retried on its
/// own once its records are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnallocatedDay {
    /// The day.
    pub date: NaiveDate,
    /// Why the day was left out, as a high-severity warning.
    pub warning: AuditWarning,
}

/// A preview of an allocation over one or more days. Nothing has been written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Identifier of this allocation run.
    pub allocation_id: Uuid,
    /// When the preview was computed.
    pub generated_at: DateTime<Utc>,
    /// The pool being redistributed.
    pub kind: AllocationKind,
    /// What was requested.
    pub target: AllocationTarget,
    /// One entry per day that had records, in date order.
    pub days: Vec<DayAllocation>,
    /// Days in a range that had records but could not be allocated.
    #[serde(default)]
    pub unallocated_days: Vec<UnallocatedDay>,
}

impl AllocationResult {
    /// All warnings across every day, including days left unallocated.
    pub fn warnings(&self) -> impl Iterator<Item = &AuditWarning> {
        self.days
            .iter()
            .flat_map(|day| day.warnings.iter())
            .chain(self.unallocated_days.iter().map(|day| &day.warning))
    }

    /// Number of record allocations across every day.
    pub fn record_count(&self) -> usize {
        self.days.iter().map(|day| day.records.len()).sum()
    }
}

/// Where an apply stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// The day whose update failed.
    pub date: NaiveDate,
    /// The record being written when it failed.
    pub record_id: RecordId,
    /// The underlying error message.
    pub message: String,
}

/// The outcome of writing an allocation back to the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedResult {
    /// The allocation run that was applied.
    pub allocation_id: Uuid,
    /// The pool that was redistributed.
    pub kind: AllocationKind,
    /// Days whose records were all updated.
    pub applied_dates: Vec<NaiveDate>,
    /// Days with nothing to write because their pool was empty.
    #[serde(default)]
    pub skipped_dates: Vec<NaiveDate>,
    /// Days left out of the preview because they could not be allocated.
    #[serde(default)]
    pub unallocated_dates: Vec<NaiveDate>,
    /// Days not attempted because an earlier day failed.
    pub unapplied_dates: Vec<NaiveDate>,
    /// Records updated, including those on a failed day before the failure.
    pub updated_records: Vec<RecordId>,
    /// Warnings carried over from the preview.
    pub warnings: Vec<AuditWarning>,
    /// The failure that stopped the batch, if any.
    pub failure: Option<BatchFailure>,
}

impl AppliedResult {
    /// Returns true if every day was applied.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Converts a stopped batch into [`EngineError::PartialBatchFailure`].
    pub fn into_result(self) -> EngineResult<Self> {
        match self.failure {
            None => Ok(self),
            Some(failure) => Err(EngineError::PartialBatchFailure {
                date: failure.date,
                message: failure.message,
                applied_dates: self.applied_dates,
            }),
        }
    }
}
