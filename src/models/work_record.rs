//! Work record model and the create/update payloads that mutate it.
//!
//! A [`WorkRecord`] is one visit to one client on one day. Its raw time fields
//! feed the billable hours calculation; `billable_hours` is the derived output.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::OtherCharge;

/// Store-assigned identity of a work record.
pub type RecordId = u64;

/// Progress of a work record through the billing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    /// Scheduled but not started.
    #[default]
    Planned,
    /// Work underway.
    InProgress,
    /// Work done, not yet billed.
    Completed,
    /// Included in an invoice.
    Invoiced,
}

/// Hours an individual employee spent on a work record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeAssignment {
    /// The employee's identifier.
    pub employee_id: String,
    /// Hours the employee worked on this record.
    pub hours: Decimal,
}

/// A persisted unit of billable work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    /// Store-assigned identity.
    pub id: RecordId,
    /// The day the work was done.
    pub date: NaiveDate,
    /// The client the work was done for.
    pub client_id: String,
    /// Display name of the client, when known.
    #[serde(default)]
    pub client_name: Option<String>,
    /// Employees who worked on the record.
    #[serde(default)]
    pub employees: Vec<EmployeeAssignment>,
    /// Kind of work (maintenance, installation, ...).
    pub work_type: String,
    /// Billing lifecycle status.
    #[serde(default)]
    pub status: WorkStatus,
    /// Labor rate used when summarising billing.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Free-text work notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Non-labor charges.
    #[serde(default)]
    pub charges: Vec<OtherCharge>,
    /// Hours actually worked.
    pub total_hours: Decimal,
    /// Raw break time; billable unless reassigned by an allocation.
    #[serde(default)]
    pub break_time_minutes: Option<u32>,
    /// Break time assigned by a break allocation; deducted from billable hours.
    #[serde(default)]
    pub adjusted_break_time_minutes: Option<u32>,
    /// Time explicitly excluded from billing.
    #[serde(default)]
    pub non_billable_time_minutes: Option<u32>,
    /// Raw travel time; not billable on its own.
    #[serde(default)]
    pub travel_time_minutes: Option<u32>,
    /// Travel time assigned by a travel allocation; added to billable hours.
    #[serde(default)]
    pub adjusted_travel_time_minutes: Option<u32>,
    /// Derived or explicitly overridden billable hours.
    #[serde(default)]
    pub billable_hours: Option<Decimal>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl WorkRecord {
    /// Builds an unsaved record from a create request.
    ///
    /// The id is left at zero for the store to assign, and `billable_hours`
    /// is left as supplied; callers resolve it through the recalculation rule.
    pub fn from_new(new: NewWorkRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            date: new.date,
            client_id: new.client_id,
            client_name: new.client_name,
            employees: new.employees,
            work_type: new.work_type,
            status: new.status,
            hourly_rate: new.hourly_rate,
            notes: new.notes,
            charges: new.charges,
            total_hours: new.total_hours,
            break_time_minutes: new.break_time_minutes,
            adjusted_break_time_minutes: new.adjusted_break_time_minutes,
            non_billable_time_minutes: new.non_billable_time_minutes,
            travel_time_minutes: new.travel_time_minutes,
            adjusted_travel_time_minutes: new.adjusted_travel_time_minutes,
            billable_hours: new.billable_hours,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges every field present in `update` except `billable_hours`.
    ///
    /// Billable hours are owned by the recalculation rule, which decides
    /// between recomputing and honouring an explicit override.
    pub fn merge_update(&mut self, update: &WorkRecordUpdate) {
        if let Some(total_hours) = update.total_hours {
            self.total_hours = total_hours;
        }
        if let Some(value) = update.break_time_minutes {
            self.break_time_minutes = value;
        }
        if let Some(value) = update.adjusted_break_time_minutes {
            self.adjusted_break_time_minutes = value;
        }
        if let Some(value) = update.non_billable_time_minutes {
            self.non_billable_time_minutes = value;
        }
        if let Some(value) = update.travel_time_minutes {
            self.travel_time_minutes = value;
        }
        if let Some(value) = update.adjusted_travel_time_minutes {
            self.adjusted_travel_time_minutes = value;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(client_name) = &update.client_name {
            self.client_name = client_name.clone();
        }
        if let Some(work_type) = &update.work_type {
            self.work_type = work_type.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(hourly_rate) = update.hourly_rate {
            self.hourly_rate = hourly_rate;
        }
        if let Some(notes) = &update.notes {
            self.notes = notes.clone();
        }
        if let Some(employees) = &update.employees {
            self.employees = employees.clone();
        }
        if let Some(charges) = &update.charges {
            self.charges = charges.clone();
        }
    }
}

/// Request to create a work record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkRecord {
    /// The day the work was done.
    pub date: NaiveDate,
    /// The client the work was done for.
    pub client_id: String,
    /// Display name of the client.
    #[serde(default)]
    pub client_name: Option<String>,
    /// Employees who worked on the record.
    #[serde(default)]
    pub employees: Vec<EmployeeAssignment>,
    /// Kind of work.
    pub work_type: String,
    /// Billing lifecycle status.
    #[serde(default)]
    pub status: WorkStatus,
    /// Labor rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Free-text work notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Non-labor charges.
    #[serde(default)]
    pub charges: Vec<OtherCharge>,
    /// Hours actually worked.
    pub total_hours: Decimal,
    /// Raw break time.
    #[serde(default)]
    pub break_time_minutes: Option<u32>,
    /// Pre-assigned adjusted break time.
    #[serde(default)]
    pub adjusted_break_time_minutes: Option<u32>,
    /// Time excluded from billing.
    #[serde(default)]
    pub non_billable_time_minutes: Option<u32>,
    /// Raw travel time.
    #[serde(default)]
    pub travel_time_minutes: Option<u32>,
    /// Pre-assigned adjusted travel time.
    #[serde(default)]
    pub adjusted_travel_time_minutes: Option<u32>,
    /// Pre-computed billable hours; when supplied it is kept (after rounding).
    #[serde(default)]
    pub billable_hours: Option<Decimal>,
}

impl NewWorkRecord {
    /// Creates a minimal request with only the required fields set.
    ///
    /// # Example
    ///
    /// ```
    /// use billable_hours_engine::models::NewWorkRecord;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let mut new = NewWorkRecord::new(
    ///     NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
    ///     "stoller",
    ///     "maintenance",
    ///     Decimal::from(6),
    /// );
    /// new.break_time_minutes = Some(30);
    /// assert!(new.billable_hours.is_none());
    /// ```
    pub fn new(
        date: NaiveDate,
        client_id: impl Into<String>,
        work_type: impl Into<String>,
        total_hours: Decimal,
    ) -> Self {
        Self {
            date,
            client_id: client_id.into(),
            client_name: None,
            employees: Vec::new(),
            work_type: work_type.into(),
            status: WorkStatus::default(),
            hourly_rate: None,
            notes: None,
            charges: Vec::new(),
            total_hours,
            break_time_minutes: None,
            adjusted_break_time_minutes: None,
            non_billable_time_minutes: None,
            travel_time_minutes: None,
            adjusted_travel_time_minutes: None,
            billable_hours: None,
        }
    }
}

/// Partial update of a work record.
///
/// An outer `None` means "field not part of this update". For nullable
/// fields the inner `Option` distinguishes "set to a value" from "clear"
/// (JSON `null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkRecordUpdate {
    /// New worked hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<Decimal>,
    /// New raw break time.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub break_time_minutes: Option<Option<u32>>,
    /// New adjusted break time.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub adjusted_break_time_minutes: Option<Option<u32>>,
    /// New non-billable time.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub non_billable_time_minutes: Option<Option<u32>>,
    /// New raw travel time. Does not affect billable hours.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub travel_time_minutes: Option<Option<u32>>,
    /// New adjusted travel time.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub adjusted_travel_time_minutes: Option<Option<u32>>,
    /// Explicit billable hours; ignored when a billing input also changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billable_hours: Option<Decimal>,
    /// Move the record to another day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// New client display name.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_name: Option<Option<String>>,
    /// New kind of work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkStatus>,
    /// New labor rate.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub hourly_rate: Option<Option<Decimal>>,
    /// New notes.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    /// Replacement employee assignments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<Vec<EmployeeAssignment>>,
    /// Replacement charges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charges: Option<Vec<OtherCharge>>,
}

impl WorkRecordUpdate {
    /// Returns true if any field that feeds the billable hours formula is present.
    ///
    /// Raw travel time is deliberately absent: it only becomes billable once
    /// an allocation turns it into adjusted travel time.
    pub fn touches_billing_inputs(&self) -> bool {
        self.total_hours.is_some()
            || self.break_time_minutes.is_some()
            || self.adjusted_break_time_minutes.is_some()
            || self.non_billable_time_minutes.is_some()
            || self.adjusted_travel_time_minutes.is_some()
    }
}

/// Maps a present JSON value (including `null`) to `Some(..)`.
///
/// Paired with `#[serde(default)]` so a missing key stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
