//! Audit models shared by the calculation and allocation rules.
//!
//! Every rule application records an [`AuditStep`] so that a stored billable
//! hours value can always be traced back to the inputs and decision that
//! produced it. Non-fatal issues are surfaced as [`AuditWarning`]s.

use serde::{Deserialize, Serialize};

/// A single step in an audit trail recording a calculation decision.
///
/// # Example
///
/// ```
/// use billable_hours_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "billable_hours".to_string(),
///     rule_name: "Billable Hours Calculation".to_string(),
///     input: serde_json::json!({"total_hours": "8"}),
///     output: serde_json::json!({"billable_hours": "8"}),
///     reasoning: "8 worked hours with no deductions".to_string(),
/// };
/// assert_eq!(step.rule_id, "billable_hours");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// How much attention a warning needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; the result is still exactly what was asked for.
    Low,
    /// The result is usable but worth reviewing.
    Medium,
    /// The result is likely not what the caller intended.
    High,
}

/// A warning generated during calculation or allocation.
///
/// Warnings indicate potential issues that don't prevent the operation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning (e.g. `NO_POOL_MINUTES`).
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level.
    pub severity: Severity,
    /// The record the warning concerns, if it is record specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<u64>,
}

impl AuditWarning {
    /// Creates a warning that applies to a whole batch or date.
    pub fn new(code: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            record_id: None,
        }
    }

    /// Creates a warning about a single work record.
    pub fn for_record(
        record_id: u64,
        code: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            record_id: Some(record_id),
            ..Self::new(code, message, severity)
        }
    }
}
