//! Calculation logic for the Billable Hours Engine.
//!
//! This module contains the pure calculation functions: deriving billable
//! hours from a record's time fields, half-hour rounding, deciding when billable
//! hours are recomputed on create and update, proportional allocation of a
//! day's break or travel minutes, and per-client billing totals.

mod billable_hours;
mod billing_summary;
mod proportional_allocation;
mod recalculation;
mod rounding;

pub use billable_hours::{
    BillableHoursResult, BillingInputs, calculate_billable_hours,
    calculate_billable_hours_with_audit, minutes_to_hours,
};
pub use billing_summary::{ClientBillingSummary, summarize_billing};
pub use proportional_allocation::{
    ALLOCATION_SHORTFALL, DAY_NOT_ALLOCATED, NO_POOL_MINUTES, NO_RAW_TIME, PRIOR_ADJUSTMENT_REPLACED, allocate_day,
    base_billable_hours,
};
pub use recalculation::{
    RecalculationDecision, RecalculationOutcome, merged_inputs, recalculate_on_update,
    resolve_on_create,
};
pub use rounding::{
    RoundingConfig, RoundingMethod, apply_rounding, round_to_half_hour, round_to_two_decimals,
};
