//! Billable hours calculation.
//!
//! Billable hours are derived from a work record's raw time fields:
//!
//! ```text
//! billable = total_hours
//!          - adjusted_break_minutes / 60
//!          - non_billable_minutes   / 60
//!          + adjusted_travel_minutes / 60
//! ```
//!
//! Raw break time is billable by default and is not deducted; only break time
//! handed out by a break allocation is. Raw travel time is not billable until a
//! travel allocation turns it into adjusted travel time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, NewWorkRecord, WorkRecord};

use super::rounding::round_to_two_decimals;

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// The fields of a work record that feed the billable hours formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillingInputs {
    /// Hours actually worked.
    pub total_hours: Decimal,
    /// Raw break minutes. Carried for the audit trail; not deducted.
    pub break_time_minutes: Option<u32>,
    /// Allocated break minutes, deducted.
    pub adjusted_break_time_minutes: Option<u32>,
    /// Non-billable minutes, deducted.
    pub non_billable_time_minutes: Option<u32>,
    /// Allocated travel minutes, added.
    pub adjusted_travel_time_minutes: Option<u32>,
}

impl From<&WorkRecord> for BillingInputs {
    fn from(record: &WorkRecord) -> Self {
        Self {
            total_hours: record.total_hours,
            break_time_minutes: record.break_time_minutes,
            adjusted_break_time_minutes: record.adjusted_break_time_minutes,
            non_billable_time_minutes: record.non_billable_time_minutes,
            adjusted_travel_time_minutes: record.adjusted_travel_time_minutes,
        }
    }
}

impl From<&NewWorkRecord> for BillingInputs {
    fn from(new: &NewWorkRecord) -> Self {
        Self {
            total_hours: new.total_hours,
            break_time_minutes: new.break_time_minutes,
            adjusted_break_time_minutes: new.adjusted_break_time_minutes,
            non_billable_time_minutes: new.non_billable_time_minutes,
            adjusted_travel_time_minutes: new.adjusted_travel_time_minutes,
        }
    }
}

/// Converts an optional minute count to hours; `None` is zero.
pub fn minutes_to_hours(minutes: Option<u32>) -> Decimal {
    Decimal::from(minutes.unwrap_or(0)) / MINUTES_PER_HOUR
}

/// The formula before clamping and 2dp rounding.
fn unclamped_billable_hours(inputs: &BillingInputs) -> Decimal {
    inputs.total_hours - minutes_to_hours(inputs.adjusted_break_time_minutes)
        - minutes_to_hours(inputs.non_billable_time_minutes)
        + minutes_to_hours(inputs.adjusted_travel_time_minutes)
}

/// Calculates billable hours for a work record's time fields.
///
/// The result is never negative and is rounded to 2 decimal places.
///
/// # Examples
///
/// ```
/// use billable_hours_engine::calculation::{calculate_billable_hours, BillingInputs};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let inputs = BillingInputs {
///     total_hours: Decimal::from_str("8.0").unwrap(),
///     break_time_minutes: Some(60),
///     adjusted_break_time_minutes: Some(30),
///     non_billable_time_minutes: Some(30),
///     adjusted_travel_time_minutes: Some(45),
/// };
/// assert_eq!(calculate_billable_hours(&inputs), Decimal::from_str("7.75").unwrap());
/// ```
pub fn calculate_billable_hours(inputs: &BillingInputs) -> Decimal {
    round_to_two_decimals(unclamped_billable_hours(inputs).max(Decimal::ZERO))
}

/// Billable hours together with the audit step explaining them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillableHoursResult {
    /// The clamped, 2dp billable hours.
    pub billable_hours: Decimal,
    /// Whether a negative formula result was clamped to zero.
    pub clamped: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates billable hours and records the calculation as an audit step.
pub fn calculate_billable_hours_with_audit(
    inputs: &BillingInputs,
    step_number: u32,
) -> BillableHoursResult {
    let unclamped = unclamped_billable_hours(inputs);
    let clamped = unclamped < Decimal::ZERO;
    let billable_hours = calculate_billable_hours(inputs);

    let reasoning = if clamped {
        format!(
            "{} worked hours less deductions gives {} hours, clamped to 0",
            inputs.total_hours.normalize(),
            round_to_two_decimals(unclamped).normalize()
        )
    } else {
        format!(
            "{} worked hours - {} adjusted break min - {} non-billable min + {} adjusted travel min = {} billable hours",
            inputs.total_hours.normalize(),
            inputs.adjusted_break_time_minutes.unwrap_or(0),
            inputs.non_billable_time_minutes.unwrap_or(0),
            inputs.adjusted_travel_time_minutes.unwrap_or(0),
            billable_hours.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "billable_hours".to_string(),
        rule_name: "Billable Hours Calculation".to_string(),
        input: serde_json::json!({
            "total_hours": inputs.total_hours.normalize().to_string(),
            "break_time_minutes": inputs.break_time_minutes,
            "adjusted_break_time_minutes": inputs.adjusted_break_time_minutes,
            "non_billable_time_minutes": inputs.non_billable_time_minutes,
            "adjusted_travel_time_minutes": inputs.adjusted_travel_time_minutes
        }),
        output: serde_json::json!({
            "billable_hours": billable_hours.normalize().to_string(),
            "clamped": clamped
        }),
        reasoning,
    };

    BillableHoursResult {
        billable_hours,
        clamped,
        audit_step,
    }
}
