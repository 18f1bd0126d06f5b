//! Previewing and applying proportional break or travel allocations.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{DAY_NOT_ALLOCATED, allocate_day};
use crate::config::SettingsProvider;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllocationKind, AllocationResult, AllocationTarget, AppliedResult, AuditWarning,
    BatchFailure, DayAllocation, RecordId, Severity, UnallocatedDay, WorkRecord,
};
use crate::store::WorkRecordStore;

use super::service::WorkRecordService;

/// Runs proportional allocations against the records of a [`WorkRecordService`].
#[derive(Debug)]
pub struct TimeAllocator<'a, S, P> {
    service: &'a WorkRecordService<S, P>,
}

impl<'a, S: WorkRecordStore, P: SettingsProvider> TimeAllocator<'a, S, P> {
    /// Creates an allocator over `service`.
    pub fn new(service: &'a WorkRecordService<S, P>) -> Self {
        Self { service }
    }

    /// Computes an allocation without writing anything.
    ///
    /// New billable hours are previewed with the rounding settings current at
    /// the time of the call, which are the ones apply will recalculate with.
    ///
    /// For a single date, a day without records is an error. Over a range,
    /// days without records are skipped, days with an empty pool are included
    /// with a warning, and days that cannot be allocated are listed in
    /// [`AllocationResult::unallocated_days`] while the rest go ahead.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidDateRange`] if the range is inverted.
    /// - [`EngineError::NoRecordsFound`] for a single date with no records.
    /// - [`EngineError::NoAllocationBasis`] or
    ///   [`EngineError::AllocationOverflow`] for a single date that cannot be
    ///   allocated.
    pub fn allocate(
        &self,
        target: AllocationTarget,
        kind: AllocationKind,
    ) -> EngineResult<AllocationResult> {
        let (start, end) = target.bounds();
        let records = self.service.list(start, end)?;
        let rounding = self.service.settings().rounding_config()?;

        let mut days = Vec::new();
        let mut unallocated_days = Vec::new();
        match target {
            AllocationTarget::Date { date } => {
                days.push(allocate_day(date, &records, kind, &rounding)?);
            }
            AllocationTarget::Range { .. } => {
                for (date, records) in group_by_date(records) {
                    match allocate_day(date, &records, kind, &rounding) {
                        Ok(day) => days.push(day),
                        Err(
                            error @ (EngineError::NoAllocationBasis { .. }
                            | EngineError::AllocationOverflow { .. }),
                        ) => {
                            warn!(
                                %date,
                                kind = kind.label(),
                                error = %error,
                                "Day left unallocated"
                            );
                            unallocated_days.push(UnallocatedDay {
                                date,
                                warning: AuditWarning::new(
                                    DAY_NOT_ALLOCATED,
                                    error.to_string(),
                                    Severity::High,
                                ),
                            });
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
        }

        let result = AllocationResult {
            allocation_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            kind,
            target,
            days,
            unallocated_days,
        };

        info!(
            allocation_id = %result.allocation_id,
            kind = kind.label(),
            %start,
            %end,
            days = result.days.len(),
            unallocated = result.unallocated_days.len(),
            records = result.record_count(),
            warnings = result.warnings().count(),
            "Allocation previewed"
        );

        Ok(result)
    }

    /// Writes a previewed allocation back through the record service.
    ///
    /// Each record receives the allocated minutes as its adjusted break or
    /// travel time, and the service recomputes its billable hours. Days with
    /// an empty pool are skipped, and days the preview left unallocated are
    /// reported in [`AppliedResult::unallocated_dates`]. Days are applied in order and the batch
    /// stops at the first failed update: earlier days stay applied and the
    /// failure is reported in [`AppliedResult::failure`]. Use
    /// [`AppliedResult::into_result`] to turn it into
    /// [`EngineError::PartialBatchFailure`].
    pub fn apply(&self, allocation: &AllocationResult) -> EngineResult<AppliedResult> {
        let mut applied = AppliedResult {
            allocation_id: allocation.allocation_id,
            kind: allocation.kind,
            applied_dates: Vec::new(),
            skipped_dates: Vec::new(),
            unallocated_dates: allocation
                .unallocated_days
                .iter()
                .map(|day| day.date)
                .collect(),
            unapplied_dates: Vec::new(),
            updated_records: Vec::new(),
            warnings: allocation.warnings().cloned().collect(),
            failure: None,
        };

        for (index, day) in allocation.days.iter().enumerate() {
            if day.pool_minutes == 0 {
                applied.skipped_dates.push(day.date);
                continue;
            }

            if let Err((record_id, error)) =
                self.apply_day(day, allocation.kind, &mut applied.updated_records)
            {
                warn!(
                    allocation_id = %allocation.allocation_id,
                    date = %day.date,
                    record_id,
                    error = %error,
                    applied_days = applied.applied_dates.len(),
                    "Allocation apply stopped"
                );
                applied.failure = Some(BatchFailure {
                    date: day.date,
                    record_id,
                    message: error.to_string(),
                });
                applied.unapplied_dates = allocation.days[index + 1..]
                    .iter()
                    .map(|day| day.date)
                    .collect();
                return Ok(applied);
            }

            applied.applied_dates.push(day.date);
        }

        info!(
            allocation_id = %allocation.allocation_id,
            kind = allocation.kind.label(),
            days = applied.applied_dates.len(),
            skipped = applied.skipped_dates.len(),
            records = applied.updated_records.len(),
            "Allocation applied"
        );

        Ok(applied)
    }

    fn apply_day(
        &self,
        day: &DayAllocation,
        kind: AllocationKind,
        updated: &mut Vec<RecordId>,
    ) -> Result<(), (RecordId, EngineError)> {
        for allocation in &day.records {
            self.service
                .update(
                    allocation.record_id,
                    kind.adjustment_update(allocation.allocated_minutes),
                )
                .map_err(|error| (allocation.record_id, error))?;
            updated.push(allocation.record_id);
        }
        Ok(())
    }
}

fn group_by_date(records: Vec<WorkRecord>) -> BTreeMap<NaiveDate, Vec<WorkRecord>> {
    let mut days: BTreeMap<NaiveDate, Vec<WorkRecord>> = BTreeMap::new();
    for record in records {
        days.entry(record.date).or_default().push(record);
    }
    days
}
