//! Deciding when billable hours are recomputed.
//!
//! On update, a change to any billing input always wins: billable hours are
//! recomputed from the merged record and an explicit `billable_hours` in the
//! same update is ignored, so a client cannot freeze a stale value alongside
//! changed inputs. Only when no billing input changes is an explicit value
//! stored, after rounding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, NewWorkRecord, WorkRecord, WorkRecordUpdate};

use super::billable_hours::{BillingInputs, calculate_billable_hours_with_audit};
use super::rounding::{RoundingConfig, apply_rounding};

/// What the recalculation rule decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecalculationDecision {
    /// Billable hours were derived from the time fields.
    Recomputed,
    /// A caller-supplied value was stored after rounding.
    ExplicitOverride,
    /// Nothing billing related changed.
    Unchanged,
}

/// The billable hours to store and how they were arrived at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationOutcome {
    /// The decision taken.
    pub decision: RecalculationDecision,
    /// The billable hours to store.
    pub billable_hours: Option<Decimal>,
    /// Whether an explicit value in the request was discarded.
    pub explicit_value_ignored: bool,
    /// Audit steps for the calculation and rounding.
    pub audit_steps: Vec<AuditStep>,
}

/// Applies an update's billing fields over a record's current inputs.
pub fn merged_inputs(current: &WorkRecord, update: &WorkRecordUpdate) -> BillingInputs {
    let mut inputs = BillingInputs::from(current);
    if let Some(total_hours) = update.total_hours {
        inputs.total_hours = total_hours;
    }
    if let Some(value) = update.break_time_minutes {
        inputs.break_time_minutes = value;
    }
    if let Some(value) = update.adjusted_break_time_minutes {
        inputs.adjusted_break_time_minutes = value;
    }
    if let Some(value) = update.non_billable_time_minutes {
        inputs.non_billable_time_minutes = value;
    }
    if let Some(value) = update.adjusted_travel_time_minutes {
        inputs.adjusted_travel_time_minutes = value;
    }
    inputs
}

fn rounding_audit_step(
    before: Decimal,
    after: Decimal,
    rounding: &RoundingConfig,
    step_number: u32,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "half_hour_rounding".to_string(),
        rule_name: "Half-Hour Rounding".to_string(),
        input: serde_json::json!({
            "hours": before.normalize().to_string(),
            "method": rounding.method.as_str()
        }),
        output: serde_json::json!({
            "hours": after.normalize().to_string()
        }),
        reasoning: format!(
            "{} hours rounded {} to the half-hour gives {}",
            before.normalize(),
            rounding.method,
            after.normalize()
        ),
    }
}

fn recompute(
    inputs: &BillingInputs,
    rounding: &RoundingConfig,
    step_number: u32,
    explicit_value_ignored: bool,
) -> RecalculationOutcome {
    let calculated = calculate_billable_hours_with_audit(inputs, step_number);
    let mut audit_steps = vec![calculated.audit_step];

    let billable_hours = apply_rounding(calculated.billable_hours, rounding);
    if rounding.enabled {
        audit_steps.push(rounding_audit_step(
            calculated.billable_hours,
            billable_hours,
            rounding,
            step_number + 1,
        ));
    }

    RecalculationOutcome {
        decision: RecalculationDecision::Recomputed,
        billable_hours: Some(billable_hours),
        explicit_value_ignored,
        audit_steps,
    }
}

fn explicit_override(
    value: Decimal,
    rounding: &RoundingConfig,
    step_number: u32,
) -> RecalculationOutcome {
    let billable_hours = apply_rounding(value, rounding);
    let mut audit_steps = vec![AuditStep {
        step_number,
        rule_id: "explicit_billable_hours".to_string(),
        rule_name: "Explicit Billable Hours".to_string(),
        input: serde_json::json!({ "billable_hours": value.normalize().to_string() }),
        output: serde_json::json!({ "billable_hours": billable_hours.normalize().to_string() }),
        reasoning: "No billing inputs changed; storing the supplied billable hours".to_string(),
    }];
    if rounding.enabled {
        audit_steps.push(rounding_audit_step(
            value,
            billable_hours,
            rounding,
            step_number + 1,
        ));
    }

    RecalculationOutcome {
        decision: RecalculationDecision::ExplicitOverride,
        billable_hours: Some(billable_hours),
        explicit_value_ignored: false,
        audit_steps,
    }
}

/// Decides the billable hours for a record after `update` is applied.
///
/// # Examples
///
/// ```
/// use billable_hours_engine::calculation::{
///     recalculate_on_update, RecalculationDecision, RoundingConfig,
/// };
/// use billable_hours_engine::models::{NewWorkRecord, WorkRecord, WorkRecordUpdate};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let mut new = NewWorkRecord::new(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(), "stoller", "maintenance", Decimal::from(6));
/// new.billable_hours = Some(Decimal::from(6));
/// let record = WorkRecord::from_new(new, Utc::now());
///
/// // Changed inputs win over a stale explicit value.
/// let update = WorkRecordUpdate {
///     total_hours: Some(Decimal::from(4)),
///     billable_hours: Some(Decimal::from(6)),
///     ..Default::default()
/// };
/// let outcome = recalculate_on_update(&record, &update, &RoundingConfig::DISABLED, 1);
/// assert_eq!(outcome.decision, RecalculationDecision::Recomputed);
/// assert_eq!(outcome.billable_hours, Some(Decimal::from(4)));
/// assert!(outcome.explicit_value_ignored);
/// ```
pub fn recalculate_on_update(
    current: &WorkRecord,
    update: &WorkRecordUpdate,
    rounding: &RoundingConfig,
    step_number: u32,
) -> RecalculationOutcome {
    if update.touches_billing_inputs() {
        let inputs = merged_inputs(current, update);
        return recompute(
            &inputs,
            rounding,
            step_number,
            update.billable_hours.is_some(),
        );
    }

    if let Some(value) = update.billable_hours {
        return explicit_override(value, rounding, step_number);
    }

    RecalculationOutcome {
        decision: RecalculationDecision::Unchanged,
        billable_hours: current.billable_hours,
        explicit_value_ignored: false,
        audit_steps: Vec::new(),
    }
}

/// Decides the billable hours for a record being created.
///
/// A creation has no prior values to protect, so a supplied `billable_hours`
/// is honoured as an override; otherwise it is computed from the supplied
/// time fields.
pub fn resolve_on_create(
    new: &NewWorkRecord,
    rounding: &RoundingConfig,
    step_number: u32,
) -> RecalculationOutcome {
    match new.billable_hours {
        Some(value) => explicit_override(value, rounding, step_number),
        None => recompute(&BillingInputs::from(new), rounding, step_number, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::RoundingMethod;
    use crate::models::AllocationKind;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn stored_record() -> WorkRecord {
        let mut new = NewWorkRecord::new(
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            "stoller",
            "maintenance",
            dec("6.5"),
        );
        new.break_time_minutes = Some(85);
        new.non_billable_time_minutes = Some(30);
        new.billable_hours = Some(dec("6"));
        let mut record = WorkRecord::from_new(new, Utc::now());
        record.id = 11;
        record
    }

    #[test]
    fn test_notes_only_update_leaves_billable_unchanged() {
        let record = stored_record();
        let update = WorkRecordUpdate {
            notes: Some(Some("Deadhead brunnera".to_string())),
            work_type: Some("cleanup".to_string()),
            hourly_rate: Some(Some(dec("55"))),
            ..Default::default()
        };

        let outcome = recalculate_on_update(&record, &update, &RoundingConfig::DISABLED, 1);
        assert_eq!(outcome.decision, RecalculationDecision::Unchanged);
        assert_eq!(outcome.billable_hours, Some(dec("6")));
        assert!(outcome.audit_steps.is_empty());
    }

    #[test]
    fn test_total_hours_change_recomputes_and_ignores_stale_value() {
        let record = stored_record();
        let update = WorkRecordUpdate {
            total_hours: Some(dec("8")),
            billable_hours: Some(dec("6")),
            ..Default::default()
        };

        let outcome = recalculate_on_update(&record, &update, &RoundingConfig::DISABLED, 1);
        assert_eq!(outcome.decision, RecalculationDecision::Recomputed);
        // 8 - 30/60 non-billable; raw break stays billable
        assert_eq!(outcome.billable_hours, Some(dec("7.5")));
        assert!(outcome.explicit_value_ignored);
    }

    #[test]
    fn test_explicit_value_alone_is_rounded_and_stored() {
        let record = stored_record();
        let update = WorkRecordUpdate {
            billable_hours: Some(dec("5.2")),
            ..Default::default()
        };
        let rounding = RoundingConfig::enabled(RoundingMethod::Nearest);

        let outcome = recalculate_on_update(&record, &update, &rounding, 1);
        assert_eq!(outcome.decision, RecalculationDecision::ExplicitOverride);
        assert_eq!(outcome.billable_hours, Some(dec("5")));
        assert_eq!(outcome.audit_steps.len(), 2);
        assert_eq!(outcome.audit_steps[1].rule_id, "half_hour_rounding");
    }

    #[test]
    fn test_explicit_value_kept_verbatim_without_rounding() {
        let record = stored_record();
        let update = WorkRecordUpdate {
            billable_hours: Some(dec("5.2")),
            ..Default::default()
        };

        let outcome = recalculate_on_update(&record, &update, &RoundingConfig::DISABLED, 1);
        assert_eq!(outcome.billable_hours, Some(dec("5.2")));
        assert_eq!(outcome.audit_steps.len(), 1);
    }

    #[test]
    fn test_clearing_non_billable_recomputes() {
        let record = stored_record();
        let update = WorkRecordUpdate {
            non_billable_time_minutes: Some(None),
            ..Default::default()
        };

        let outcome = recalculate_on_update(&record, &update, &RoundingConfig::DISABLED, 1);
        assert_eq!(outcome.billable_hours, Some(dec("6.5")));
    }

    #[test]
    fn test_adjusted_travel_update_recomputes_with_rounding() {
        let record = stored_record();
        let update = AllocationKind::Travel.adjustment_update(44);
        let rounding = RoundingConfig::enabled(RoundingMethod::Up);

        // 6.5 - 0.5 + 0.73 = 6.73 -> 7.0
        let outcome = recalculate_on_update(&record, &update, &rounding, 4);
        assert_eq!(outcome.billable_hours, Some(dec("7")));
        assert_eq!(outcome.audit_steps[0].step_number, 4);
        assert_eq!(outcome.audit_steps[1].step_number, 5);
    }

    #[test]
    fn test_raw_travel_update_does_not_recompute() {
        let record = stored_record();
        let update = WorkRecordUpdate {
            travel_time_minutes: Some(Some(60)),
            ..Default::default()
        };

        let outcome = recalculate_on_update(&record, &update, &RoundingConfig::DISABLED, 1);
        assert_eq!(outcome.decision, RecalculationDecision::Unchanged);
    }

    #[test]
    fn test_create_without_billable_computes() {
        let mut new = NewWorkRecord::new(
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            "kabeiseman",
            "maintenance",
            dec("2.33"),
        );
        new.non_billable_time_minutes = Some(10);
        let rounding = RoundingConfig::enabled(RoundingMethod::Nearest);

        // 2.33 - 0.17 = 2.16 -> 2.0
        let outcome = resolve_on_create(&new, &rounding, 1);
        assert_eq!(outcome.decision, RecalculationDecision::Recomputed);
        assert_eq!(outcome.billable_hours, Some(dec("2")));
    }

    #[test]
    fn test_create_with_billable_keeps_it() {
        let mut new = NewWorkRecord::new(
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            "kurzweil",
            "maintenance",
            dec("3"),
        );
        new.billable_hours = Some(dec("2.75"));

        let outcome = resolve_on_create(&new, &RoundingConfig::DISABLED, 1);
        assert_eq!(outcome.decision, RecalculationDecision::ExplicitOverride);
        assert_eq!(outcome.billable_hours, Some(dec("2.75")));
    }
}
