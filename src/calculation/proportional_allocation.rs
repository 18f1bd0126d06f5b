//! Proportional allocation of a day's break or travel minutes.
//!
//! The day's raw minutes of one kind are pooled and handed back to each work
//! record in proportion to its share of the day's base billable hours. Base
//! billable hours are computed from the record's billing inputs with any
//! earlier allocation of the same kind cleared, so repeated runs over
//! unchanged records produce the same allocation whatever the stored,
//! possibly rounded, billable hours are.
//!
//! Allocated minutes are floored. The sum can therefore fall a few minutes
//! short of the pool; the shortfall is reported, not redistributed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllocationKind, AuditWarning, ClientAllocationSummary, DayAllocation, RecordAllocation,
    Severity, WorkRecord,
};

use super::billable_hours::{BillingInputs, calculate_billable_hours};
use super::rounding::{RoundingConfig, apply_rounding};

/// Warning code for a day with nothing to allocate.
pub const NO_POOL_MINUTES: &str = "NO_POOL_MINUTES";
/// Warning code for a record that contributed no minutes.
pub const NO_RAW_TIME: &str = "NO_RAW_TIME";
/// Warning code for a record whose earlier allocation is being replaced.
pub const PRIOR_ADJUSTMENT_REPLACED: &str = "PRIOR_ADJUSTMENT_REPLACED";
/// Warning code for minutes lost to flooring.
pub const ALLOCATION_SHORTFALL: &str = "ALLOCATION_SHORTFALL";
/// Warning code for a day in a range that could not be allocated.
pub const DAY_NOT_ALLOCATED: &str = "DAY_NOT_ALLOCATED";

const SHARE_DECIMAL_PLACES: u32 = 4;

/// The record's billable hours as stored, or computed if never stored.
fn current_billable_hours(record: &WorkRecord) -> Decimal {
    record
        .billable_hours
        .unwrap_or_else(|| calculate_billable_hours(&BillingInputs::from(record)))
}

/// The record's billing inputs with this kind's adjustment set to `minutes`.
fn inputs_with_adjustment(
    record: &WorkRecord,
    kind: AllocationKind,
    minutes: Option<u32>,
) -> BillingInputs {
    let mut inputs = BillingInputs::from(record);
    match kind {
        AllocationKind::Break => inputs.adjusted_break_time_minutes = minutes,
        AllocationKind::Travel => inputs.adjusted_travel_time_minutes = minutes,
    }
    inputs
}

/// Billable hours with any earlier allocation of `kind` reversed.
///
/// Computed from the record's billing inputs with this kind's adjustment
/// cleared, never from the stored billable hours, which may have been rounded
/// to a half-hour.
///
/// # Example
///
/// ```
/// use billable_hours_engine::calculation::base_billable_hours;
/// use billable_hours_engine::models::{AllocationKind, NewWorkRecord, WorkRecord};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let mut new = NewWorkRecord::new(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(), "silver", "maintenance", Decimal::from(4));
/// new.adjusted_travel_time_minutes = Some(30);
/// new.billable_hours = Some(Decimal::from_str("4.5").unwrap());
/// let record = WorkRecord::from_new(new, Utc::now());
///
/// assert_eq!(base_billable_hours(&record, AllocationKind::Travel), Decimal::from(4));
/// ```
pub fn base_billable_hours(record: &WorkRecord, kind: AllocationKind) -> Decimal {
    calculate_billable_hours(&inputs_with_adjustment(record, kind, None))
}

/// Billable hours the record will hold once `allocated_minutes` are applied.
fn allocated_billable_hours(
    record: &WorkRecord,
    kind: AllocationKind,
    allocated_minutes: u32,
    rounding: &RoundingConfig,
) -> Decimal {
    let inputs = inputs_with_adjustment(record, kind, Some(allocated_minutes));
    apply_rounding(calculate_billable_hours(&inputs), rounding)
}

/// Floors `pool * base / total_base` to whole minutes.
fn floored_minutes(pool_minutes: u32, base: Decimal, total_base: Decimal) -> Option<u32> {
    Decimal::from(pool_minutes)
        .checked_mul(base)?
        .checked_div(total_base)?
        .floor()
        .to_u32()
}

fn summarize_clients(records: &[RecordAllocation]) -> Vec<ClientAllocationSummary> {
    let mut clients: BTreeMap<&str, ClientAllocationSummary> = BTreeMap::new();
    for allocation in records {
        let summary = clients
            .entry(allocation.client_id.as_str())
            .or_insert_with(|| ClientAllocationSummary {
                client_id: allocation.client_id.clone(),
                client_name: allocation.client_name.clone(),
                record_count: 0,
                raw_minutes: 0,
                allocated_minutes: 0,
                base_billable_hours: Decimal::ZERO,
                new_billable_hours: Decimal::ZERO,
            });
        summary.record_count += 1;
        summary.raw_minutes += allocation.raw_minutes;
        summary.allocated_minutes += allocation.allocated_minutes;
        summary.base_billable_hours += allocation.base_billable_hours;
        summary.new_billable_hours += allocation.new_billable_hours;
        if summary.client_name.is_none() {
            summary.client_name = allocation.client_name.clone();
        }
    }
    clients.into_values().collect()
}

/// Allocates one day's pooled minutes of `kind` across `records`.
///
/// `rounding` is the configuration the records will be recalculated with when
/// the allocation is applied, so `new_billable_hours` matches what is stored.
///
/// # Errors
///
/// - [`EngineError::NoRecordsFound`] if `records` is empty.
/// - [`EngineError::NoAllocationBasis`] if the pool is non-zero but the
///   records' base billable hours sum to zero.
/// - [`EngineError::AllocationOverflow`] if the day's minutes or hours do not
///   fit the allocation arithmetic.
///
/// A zero pool is not an error: every record is listed with a zero
/// allocation and unchanged billable hours, and a warning is attached.
///
/// # Example
///
/// ```
/// use billable_hours_engine::calculation::{RoundingConfig, allocate_day};
/// use billable_hours_engine::models::{AllocationKind, NewWorkRecord, WorkRecord};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
/// let mut first = NewWorkRecord::new(date, "kabeiseman", "maintenance", Decimal::from(3));
/// first.travel_time_minutes = Some(60);
/// let second = NewWorkRecord::new(date, "kurzweil", "maintenance", Decimal::from(1));
///
/// let mut records: Vec<WorkRecord> = vec![
///     WorkRecord::from_new(first, Utc::now()),
///     WorkRecord::from_new(second, Utc::now()),
/// ];
/// records[0].id = 1;
/// records[1].id = 2;
///
/// let day = allocate_day(date, &records, AllocationKind::Travel, &RoundingConfig::DISABLED)
///     .unwrap();
/// assert_eq!(day.pool_minutes, 60);
/// assert_eq!(day.records[0].allocated_minutes, 45);
/// assert_eq!(day.records[1].allocated_minutes, 15);
/// ```
pub fn allocate_day(
    date: NaiveDate,
    records: &[WorkRecord],
    kind: AllocationKind,
    rounding: &RoundingConfig,
) -> EngineResult<DayAllocation> {
    if records.is_empty() {
        return Err(EngineError::NoRecordsFound { date });
    }

    let mut records: Vec<&WorkRecord> = records.iter().collect();
    records.sort_by_key(|record| record.id);

    let pool_minutes = records
        .iter()
        .try_fold(0u32, |pool, r| pool.checked_add(kind.raw_minutes(r)))
        .ok_or(EngineError::AllocationOverflow { date })?;
    let bases: Vec<Decimal> = records
        .iter()
        .map(|r| base_billable_hours(r, kind))
        .collect();
    let total_base_billable_hours = bases
        .iter()
        .try_fold(Decimal::ZERO, |total, base| total.checked_add(*base))
        .ok_or(EngineError::AllocationOverflow { date })?;

    let mut warnings = Vec::new();

    if pool_minutes == 0 {
        warnings.push(AuditWarning::new(
            NO_POOL_MINUTES,
            format!("No {} minutes recorded on {}; nothing to allocate", kind.label(), date),
            Severity::Medium,
        ));

        let allocations: Vec<RecordAllocation> = records
            .iter()
            .zip(&bases)
            .map(|(record, &base)| RecordAllocation {
                record_id: record.id,
                client_id: record.client_id.clone(),
                client_name: record.client_name.clone(),
                raw_minutes: 0,
                previous_adjusted_minutes: kind.adjusted_minutes(record),
                current_billable_hours: current_billable_hours(record),
                base_billable_hours: base,
                share: if total_base_billable_hours > Decimal::ZERO {
                    (base / total_base_billable_hours).round_dp(SHARE_DECIMAL_PLACES)
                } else {
                    Decimal::ZERO
                },
                allocated_minutes: 0,
                new_billable_hours: current_billable_hours(record),
            })
            .collect();

        debug!(%date, kind = kind.label(), records = allocations.len(), "Empty allocation pool");

        return Ok(DayAllocation {
            date,
            kind,
            pool_minutes,
            total_base_billable_hours,
            total_allocated_minutes: 0,
            clients: summarize_clients(&allocations),
            records: allocations,
            warnings,
        });
    }

    if total_base_billable_hours <= Decimal::ZERO {
        return Err(EngineError::NoAllocationBasis { date });
    }

    let mut allocations = Vec::with_capacity(records.len());
    for (record, base) in records.iter().zip(bases) {
        let raw_minutes = kind.raw_minutes(record);
        let previous_adjusted_minutes = kind.adjusted_minutes(record);

        if raw_minutes == 0 {
            warnings.push(AuditWarning::for_record(
                record.id,
                NO_RAW_TIME,
                format!("Record {} has no {} minutes of its own", record.id, kind.label()),
                Severity::Low,
            ));
        }
        if let Some(previous) = previous_adjusted_minutes {
            warnings.push(AuditWarning::for_record(
                record.id,
                PRIOR_ADJUSTMENT_REPLACED,
                format!(
                    "Record {} already had {} adjusted {} minutes; they will be replaced",
                    record.id,
                    previous,
                    kind.label()
                ),
                Severity::Low,
            ));
        }

        let allocated_minutes = floored_minutes(pool_minutes, base, total_base_billable_hours)
            .ok_or(EngineError::AllocationOverflow { date })?;

        allocations.push(RecordAllocation {
            record_id: record.id,
            client_id: record.client_id.clone(),
            client_name: record.client_name.clone(),
            raw_minutes,
            previous_adjusted_minutes,
            current_billable_hours: current_billable_hours(record),
            base_billable_hours: base,
            share: (base / total_base_billable_hours).round_dp(SHARE_DECIMAL_PLACES),
            allocated_minutes,
            new_billable_hours: allocated_billable_hours(record, kind, allocated_minutes, rounding),
        });
    }

    let total_allocated_minutes: u32 = allocations.iter().map(|a| a.allocated_minutes).sum();
    if total_allocated_minutes < pool_minutes {
        warnings.push(AuditWarning::new(
            ALLOCATION_SHORTFALL,
            format!(
                "{} of {} {} minutes allocated on {}; {} lost to rounding down",
                total_allocated_minutes,
                pool_minutes,
                kind.label(),
                date,
                pool_minutes - total_allocated_minutes
            ),
            Severity::Low,
        ));
    }

    debug!(
        %date,
        kind = kind.label(),
        pool_minutes,
        total_allocated_minutes,
        records = allocations.len(),
        "Allocated day"
    );

    Ok(DayAllocation {
        date,
        kind,
        pool_minutes,
        total_base_billable_hours,
        total_allocated_minutes,
        clients: summarize_clients(&allocations),
        records: allocations,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::RoundingMethod;
    use crate::models::NewWorkRecord;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn record(id: u64, client: &str, total: &str) -> WorkRecord {
        let new = NewWorkRecord::new(make_date("2025-06-10"), client, "maintenance", dec(total));
        let mut record = WorkRecord::from_new(new, Utc::now());
        record.id = id;
        record.billable_hours = Some(dec(total));
        record
    }

    fn allocate(records: &[WorkRecord], kind: AllocationKind) -> EngineResult<DayAllocation> {
        allocate_day(make_date("2025-06-10"), records, kind, &RoundingConfig::DISABLED)
    }

    #[test]
    fn test_empty_day_is_no_records_found() {
        let result = allocate(&[], AllocationKind::Break);
        match result {
            Err(EngineError::NoRecordsFound { date }) => assert_eq!(date, make_date("2025-06-10")),
            other => panic!("Expected NoRecordsFound, got {:?}", other),
        }
    }

    #[test]
    fn test_travel_is_split_proportionally_and_added() {
        let mut a = record(1, "stoller", "6");
        a.travel_time_minutes = Some(44);
        let b = record(2, "silver", "2");

        let day = allocate(&[a, b], AllocationKind::Travel).unwrap();

        assert_eq!(day.pool_minutes, 44);
        assert_eq!(day.total_base_billable_hours, dec("8"));
        assert_eq!(day.records[0].allocated_minutes, 33);
        assert_eq!(day.records[1].allocated_minutes, 11);
        assert_eq!(day.records[0].share, dec("0.75"));
        assert_eq!(day.records[0].new_billable_hours, dec("6.55"));
        assert_eq!(day.records[1].new_billable_hours, dec("2.18"));
    }

    #[test]
    fn test_break_is_split_proportionally_and_deducted() {
        let mut a = record(1, "stoller", "4");
        a.break_time_minutes = Some(60);
        let mut b = record(2, "silver", "4");
        b.break_time_minutes = Some(30);

        let day = allocate(&[a, b], AllocationKind::Break).unwrap();

        assert_eq!(day.records[0].allocated_minutes, 45);
        assert_eq!(day.records[1].allocated_minutes, 45);
        assert_eq!(day.records[0].new_billable_hours, dec("3.25"));
        assert_eq!(day.records[1].new_billable_hours, dec("3.25"));
        assert!(day.warnings.is_empty());
    }

    #[test]
    fn test_floor_shortfall_is_reported_not_corrected() {
        let mut a = record(1, "stoller", "1");
        a.travel_time_minutes = Some(10);
        let b = record(2, "silver", "1");
        let c = record(3, "kurzweil", "1");

        let day = allocate(&[a, b, c], AllocationKind::Travel).unwrap();

        for allocation in &day.records {
            assert_eq!(allocation.allocated_minutes, 3);
        }
        assert_eq!(day.total_allocated_minutes, 9);
        assert_eq!(day.shortfall_minutes(), 1);
        assert!(day.warnings.iter().any(|w| w.code == ALLOCATION_SHORTFALL));
    }

    #[test]
    fn test_zero_pool_is_a_warning_not_an_error() {
        let a = record(1, "stoller", "3");
        let b = record(2, "silver", "5");

        let day = allocate(&[a, b], AllocationKind::Break).unwrap();

        assert_eq!(day.pool_minutes, 0);
        assert_eq!(day.records.len(), 2);
        assert!(day.records.iter().all(|r| r.allocated_minutes == 0));
        assert_eq!(day.records[1].new_billable_hours, dec("5"));
        assert_eq!(day.warnings.len(), 1);
        assert_eq!(day.warnings[0].code, NO_POOL_MINUTES);
    }

    #[test]
    fn test_zero_base_hours_is_no_allocation_basis() {
        let mut a = record(1, "stoller", "0");
        a.break_time_minutes = Some(15);
        let b = record(2, "silver", "0");

        let result = allocate(&[a, b], AllocationKind::Break);
        assert!(matches!(result, Err(EngineError::NoAllocationBasis { .. })));
    }

    #[test]
    fn test_previous_travel_adjustment_is_reversed() {
        let mut a = record(1, "stoller", "6");
        a.travel_time_minutes = Some(40);
        a.adjusted_travel_time_minutes = Some(30);
        a.billable_hours = Some(dec("6.5"));
        let mut b = record(2, "silver", "2");
        b.adjusted_travel_time_minutes = Some(10);
        b.billable_hours = Some(dec("2.17"));

        let day = allocate(&[a, b], AllocationKind::Travel).unwrap();

        assert_eq!(day.records[0].base_billable_hours, dec("6"));
        assert_eq!(day.records[1].base_billable_hours, dec("2"));
        assert_eq!(day.records[0].allocated_minutes, 30);
        assert_eq!(day.records[1].allocated_minutes, 10);
        let replaced = day
            .warnings
            .iter()
            .filter(|w| w.code == PRIOR_ADJUSTMENT_REPLACED)
            .count();
        assert_eq!(replaced, 2);
    }

    #[test]
    fn test_previous_break_adjustment_is_added_back() {
        let mut a = record(1, "stoller", "4");
        a.break_time_minutes = Some(30);
        a.adjusted_break_time_minutes = Some(30);
        a.billable_hours = Some(dec("3.5"));

        assert_eq!(base_billable_hours(&a, AllocationKind::Break), dec("4"));
        assert_eq!(base_billable_hours(&a, AllocationKind::Travel), dec("3.5"));
    }

    #[test]
    fn test_record_without_stored_billable_uses_calculator() {
        let mut a = record(1, "stoller", "5");
        a.billable_hours = None;
        a.non_billable_time_minutes = Some(60);
        a.break_time_minutes = Some(20);

        let day = allocate(&[a], AllocationKind::Break).unwrap();
        assert_eq!(day.records[0].current_billable_hours, dec("4"));
        assert_eq!(day.records[0].allocated_minutes, 20);
    }

    #[test]
    fn test_records_without_raw_time_are_flagged() {
        let mut a = record(1, "stoller", "3");
        a.break_time_minutes = Some(30);
        let b = record(2, "silver", "3");

        let day = allocate(&[a, b], AllocationKind::Break).unwrap();
        let flagged: Vec<_> = day
            .warnings
            .iter()
            .filter(|w| w.code == NO_RAW_TIME)
            .map(|w| w.record_id)
            .collect();
        assert_eq!(flagged, vec![Some(2)]);
    }

    #[test]
    fn test_client_summary_groups_records() {
        let mut a = record(1, "stoller", "2");
        a.travel_time_minutes = Some(60);
        let b = record(2, "stoller", "2");
        let c = record(3, "anne", "2");

        let day = allocate(&[c, b, a], AllocationKind::Travel).unwrap();

        assert_eq!(day.records[0].record_id, 1);
        assert_eq!(day.clients.len(), 2);
        assert_eq!(day.clients[0].client_id, "anne");
        assert_eq!(day.clients[0].allocated_minutes, 20);
        assert_eq!(day.clients[1].client_id, "stoller");
        assert_eq!(day.clients[1].record_count, 2);
        assert_eq!(day.clients[1].raw_minutes, 60);
        assert_eq!(day.clients[1].allocated_minutes, 40);
    }

    #[test]
    fn test_deducted_break_never_goes_negative() {
        let mut a = record(1, "stoller", "0.1");
        a.break_time_minutes = Some(120);

        let day = allocate(&[a], AllocationKind::Break).unwrap();
        assert_eq!(day.records[0].allocated_minutes, 120);
        assert_eq!(day.records[0].new_billable_hours, Decimal::ZERO);
    }

    #[test]
    fn test_base_ignores_half_hour_rounded_billable_hours() {
        let mut a = record(1, "stoller", "6");
        a.travel_time_minutes = Some(44);
        a.adjusted_travel_time_minutes = Some(33);
        a.billable_hours = Some(dec("6.5"));

        assert_eq!(base_billable_hours(&a, AllocationKind::Travel), dec("6"));
    }

    #[test]
    fn test_new_billable_hours_follow_rounding_config() {
        let mut a = record(1, "stoller", "6");
        a.travel_time_minutes = Some(44);
        let b = record(2, "silver", "2");
        let nearest = RoundingConfig::enabled(RoundingMethod::Nearest);

        let day = allocate_day(make_date("2025-06-10"), &[a, b], AllocationKind::Travel, &nearest)
            .unwrap();

        assert_eq!(day.records[0].allocated_minutes, 33);
        assert_eq!(day.records[0].new_billable_hours, dec("6.5"));
        assert_eq!(day.records[1].allocated_minutes, 11);
        assert_eq!(day.records[1].new_billable_hours, dec("2"));
    }

    #[test]
    fn test_pool_overflow_is_an_error() {
        let mut a = record(1, "stoller", "4");
        a.break_time_minutes = Some(u32::MAX);
        let mut b = record(2, "silver", "4");
        b.break_time_minutes = Some(u32::MAX);

        match allocate(&[a, b], AllocationKind::Break) {
            Err(EngineError::AllocationOverflow { date }) => {
                assert_eq!(date, make_date("2025-06-10"))
            }
            other => panic!("Expected AllocationOverflow, got {:?}", other),
        }
    }
}
