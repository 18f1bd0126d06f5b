//! Work record create, read, update and delete.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculation::{
    ClientBillingSummary, RecalculationDecision, RecalculationOutcome, recalculate_on_update,
    resolve_on_create, summarize_billing,
};
use crate::config::SettingsProvider;
use crate::error::{EngineError, EngineResult};
use crate::models::{NewWorkRecord, RecordId, WorkRecord, WorkRecordUpdate};
use crate::store::WorkRecordStore;

/// A record as persisted, with the billable hours decision that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecord {
    /// The stored record.
    pub record: WorkRecord,
    /// How `record.billable_hours` was decided.
    pub recalculation: RecalculationOutcome,
}

/// Work record operations backed by a [`WorkRecordStore`].
///
/// Rounding settings are read from the [`SettingsProvider`] on every create
/// and update.
#[derive(Debug)]
pub struct WorkRecordService<S, P> {
    store: S,
    settings: P,
}

impl<S: WorkRecordStore, P: SettingsProvider> WorkRecordService<S, P> {
    /// Creates a service over `store`, reading rounding settings from `settings`.
    pub fn new(store: S, settings: P) -> Self {
        Self { store, settings }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The settings provider.
    pub fn settings(&self) -> &P {
        &self.settings
    }

    /// Validates and persists a new record.
    ///
    /// A supplied `billable_hours` is kept (after rounding); otherwise it is
    /// computed from the supplied time fields.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidRecord`] for an empty client id, negative hours,
    ///   or hours and minutes above [`MAX_RECORD_HOURS`] and [`MAX_RECORD_MINUTES`].
    /// - Any error from the settings provider or the store.
    pub fn create(&self, new: NewWorkRecord) -> EngineResult<SavedRecord> {
        validate_new(&new)?;

        let rounding = self.settings.rounding_config()?;
        let recalculation = resolve_on_create(&new, &rounding, 1);

        let mut record = WorkRecord::from_new(new, Utc::now());
        record.billable_hours = recalculation.billable_hours;
        let record = self.store.create(record)?;

        info!(
            record_id = record.id,
            client_id = %record.client_id,
            date = %record.date,
            billable_hours = ?record.billable_hours,
            decision = ?recalculation.decision,
            "Work record created"
        );

        Ok(SavedRecord {
            record,
            recalculation,
        })
    }

    /// Fetches a record.
    ///
    /// # Errors
    ///
    /// [`EngineError::RecordNotFound`] if no record has `id`.
    pub fn get(&self, id: RecordId) -> EngineResult<WorkRecord> {
        self.store
            .get_by_id(id)?
            .ok_or(EngineError::RecordNotFound { id })
    }

    /// Applies a partial update and resolves billable hours.
    ///
    /// A change to any billing input recomputes billable hours and discards an
    /// explicit `billable_hours` in the same update. An explicit value alone is
    /// stored after rounding. Anything else leaves billable hours as they were.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RecordNotFound`] if no record has `id`.
    /// - [`EngineError::InvalidRecord`] for negative or out of range hours and minutes.
    /// - Any error from the settings provider or the store.
    pub fn update(&self, id: RecordId, update: WorkRecordUpdate) -> EngineResult<SavedRecord> {
        validate_update(&update)?;

        let mut record = self.get(id)?;
        let rounding = self.settings.rounding_config()?;
        let recalculation = recalculate_on_update(&record, &update, &rounding, 1);

        if recalculation.explicit_value_ignored {
            warn!(
                record_id = id,
                "Explicit billable hours ignored because billing inputs changed"
            );
        }

        record.merge_update(&update);
        record.billable_hours = recalculation.billable_hours;
        record.updated_at = Utc::now();
        let record = self.store.update(record)?;

        match recalculation.decision {
            RecalculationDecision::Unchanged => {
                debug!(record_id = id, "Work record updated, billable hours unchanged");
            }
            decision => {
                info!(
                    record_id = id,
                    billable_hours = ?record.billable_hours,
                    decision = ?decision,
                    "Work record updated"
                );
            }
        }

        Ok(SavedRecord {
            record,
            recalculation,
        })
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// [`EngineError::RecordNotFound`] if no record has `id`.
    pub fn delete(&self, id: RecordId) -> EngineResult<()> {
        if !self.store.delete(id)? {
            return Err(EngineError::RecordNotFound { id });
        }
        info!(record_id = id, "Work record deleted");
        Ok(())
    }

    /// Lists records dated within `start..=end`, ordered by date then id.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidDateRange`] if `start` is after `end`.
    pub fn list(&self, start: NaiveDate, end: NaiveDate) -> EngineResult<Vec<WorkRecord>> {
        if start > end {
            return Err(EngineError::InvalidDateRange { start, end });
        }
        self.store.list_by_date_range(start, end)
    }

    /// Per-client billing totals for records dated within `start..=end`.
    pub fn billing_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<ClientBillingSummary>> {
        let records = self.list(start, end)?;
        Ok(summarize_billing(&records))
    }
}

/// Upper bound on a record's total or billable hours.
///
/// Records may cover a whole crew, so this is far above a single working day.
pub const MAX_RECORD_HOURS: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// Upper bound on any of a record's minute fields.
pub const MAX_RECORD_MINUTES: u32 = 60_000;

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidRecord {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn check_hours(field: &str, hours: Decimal) -> EngineResult<()> {
    if hours < Decimal::ZERO {
        return Err(invalid(field, "must not be negative"));
    }
    if hours > MAX_RECORD_HOURS {
        return Err(invalid(field, "exceeds the maximum hours per record"));
    }
    Ok(())
}

fn check_minutes(field: &str, minutes: Option<u32>) -> EngineResult<()> {
    if minutes.is_some_and(|minutes| minutes > MAX_RECORD_MINUTES) {
        return Err(invalid(field, "exceeds the maximum minutes per record"));
    }
    Ok(())
}

fn validate_new(new: &NewWorkRecord) -> EngineResult<()> {
    if new.client_id.trim().is_empty() {
        return Err(invalid("client_id", "must not be empty"));
    }
    check_hours("total_hours", new.total_hours)?;
    if let Some(hours) = new.billable_hours {
        check_hours("billable_hours", hours)?;
    }
    check_minutes("break_time_minutes", new.break_time_minutes)?;
    check_minutes("adjusted_break_time_minutes", new.adjusted_break_time_minutes)?;
    check_minutes("non_billable_time_minutes", new.non_billable_time_minutes)?;
    check_minutes("travel_time_minutes", new.travel_time_minutes)?;
    check_minutes("adjusted_travel_time_minutes", new.adjusted_travel_time_minutes)?;
    Ok(())
}

fn validate_update(update: &WorkRecordUpdate) -> EngineResult<()> {
    if let Some(hours) = update.total_hours {
        check_hours("total_hours", hours)?;
    }
    if let Some(hours) = update.billable_hours {
        check_hours("billable_hours", hours)?;
    }
    let minutes = [
        ("break_time_minutes", update.break_time_minutes),
        ("adjusted_break_time_minutes", update.adjusted_break_time_minutes),
        ("non_billable_time_minutes", update.non_billable_time_minutes),
        ("travel_time_minutes", update.travel_time_minutes),
        ("adjusted_travel_time_minutes", update.adjusted_travel_time_minutes),
    ];
    for (field, value) in minutes {
        check_minutes(field, value.flatten())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InMemorySettings, StaticSettings};
    use crate::store::InMemoryStore;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn service() -> WorkRecordService<InMemoryStore, StaticSettings> {
        WorkRecordService::new(InMemoryStore::new(), StaticSettings::disabled())
    }

    fn new_record(total: &str) -> NewWorkRecord {
        NewWorkRecord::new(make_date("2025-06-03"), "stoller", "maintenance", dec(total))
    }

    #[test]
    fn test_create_computes_billable_hours() {
        let mut new = new_record("8");
        new.break_time_minutes = Some(60);
        new.adjusted_break_time_minutes = Some(30);
        new.non_billable_time_minutes = Some(30);
        new.adjusted_travel_time_minutes = Some(45);

        let saved = service().create(new).unwrap();

        assert_eq!(saved.record.id, 1);
        assert_eq!(saved.record.billable_hours, Some(dec("7.75")));
        assert_eq!(saved.recalculation.decision, RecalculationDecision::Recomputed);
    }

    #[test]
    fn test_create_keeps_explicit_billable_hours() {
        let mut new = new_record("8");
        new.billable_hours = Some(dec("5.5"));

        let saved = service().create(new).unwrap();

        assert_eq!(saved.record.billable_hours, Some(dec("5.5")));
        assert_eq!(
            saved.recalculation.decision,
            RecalculationDecision::ExplicitOverride
        );
    }

    #[test]
    fn test_create_rounds_with_current_settings() {
        let service = WorkRecordService::new(InMemoryStore::new(), StaticSettings::new(true, "up"));
        let saved = service.create(new_record("6.1")).unwrap();
        assert_eq!(saved.record.billable_hours, Some(dec("6.5")));
    }

    #[test]
    fn test_create_rejects_empty_client() {
        let mut new = new_record("2");
        new.client_id = "  ".to_string();
        match service().create(new) {
            Err(EngineError::InvalidRecord { field, .. }) => assert_eq!(field, "client_id"),
            other => panic!("Expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_create_rejects_negative_hours() {
        assert!(matches!(
            service().create(new_record("-1")),
            Err(EngineError::InvalidRecord { .. })
        ));

        let mut new = new_record("2");
        new.billable_hours = Some(dec("-0.5"));
        assert!(matches!(
            service().create(new),
            Err(EngineError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_update_notes_only_leaves_billable_hours() {
        let service = service();
        let mut new = new_record("6");
        new.billable_hours = Some(dec("4.25"));
        let id = service.create(new).unwrap().record.id;

        let saved = service
            .update(
                id,
                WorkRecordUpdate {
                    notes: Some(Some("Edge beds".to_string())),
                    work_type: Some("cleanup".to_string()),
                    hourly_rate: Some(Some(dec("55"))),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(saved.record.billable_hours, Some(dec("4.25")));
        assert_eq!(saved.recalculation.decision, RecalculationDecision::Unchanged);
        assert_eq!(saved.record.notes.as_deref(), Some("Edge beds"));
    }

    #[test]
    fn test_update_total_hours_ignores_stale_explicit_value() {
        let service = service();
        let id = service.create(new_record("6")).unwrap().record.id;

        let saved = service
            .update(
                id,
                WorkRecordUpdate {
                    total_hours: Some(dec("4")),
                    billable_hours: Some(dec("6")),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(saved.record.billable_hours, Some(dec("4")));
        assert!(saved.recalculation.explicit_value_ignored);
    }

    #[test]
    fn test_update_reads_settings_fresh() {
        let service = WorkRecordService::new(InMemoryStore::new(), InMemorySettings::default());
        let id = service.create(new_record("6.2")).unwrap().record.id;
        assert_eq!(service.get(id).unwrap().billable_hours, Some(dec("6.2")));

        service.settings().set_rounding_enabled(true).unwrap();
        service.settings().set_rounding_method("down").unwrap();

        let saved = service
            .update(
                id,
                WorkRecordUpdate {
                    total_hours: Some(dec("6.2")),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(saved.record.billable_hours, Some(dec("6")));
    }

    #[test]
    fn test_update_missing_record_is_not_found() {
        assert!(matches!(
            service().update(42, WorkRecordUpdate::default()),
            Err(EngineError::RecordNotFound { id: 42 })
        ));
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let service = service();
        let id = service.create(new_record("1")).unwrap().record.id;
        service.delete(id).unwrap();
        assert!(matches!(
            service.get(id),
            Err(EngineError::RecordNotFound { .. })
        ));
        assert!(matches!(
            service.delete(id),
            Err(EngineError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn test_list_rejects_inverted_range() {
        let result = service().list(make_date("2025-06-10"), make_date("2025-06-01"));
        assert!(matches!(result, Err(EngineError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_billing_summary_over_range() {
        let service = service();
        let mut a = new_record("2");
        a.hourly_rate = Some(dec("60"));
        service.create(a).unwrap();
        service.create(new_record("3")).unwrap();

        let summary = service
            .billing_summary(make_date("2025-06-01"), make_date("2025-06-30"))
            .unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].record_count, 2);
        assert_eq!(summary[0].billable_hours, dec("5"));
        assert_eq!(summary[0].labor_amount, dec("120.00"));
        assert_eq!(summary[0].unpriced_records, 1);
    }

    #[test]
    fn test_create_rejects_out_of_range_values() {
        let mut new = new_record("1001");
        match service().create(new.clone()) {
            Err(EngineError::InvalidRecord { field, .. }) => assert_eq!(field, "total_hours"),
            other => panic!("Expected InvalidRecord, got {:?}", other),
        }

        new.total_hours = Decimal::MAX;
        assert!(matches!(
            service().create(new),
            Err(EngineError::InvalidRecord { .. })
        ));

        let mut new = new_record("8");
        new.billable_hours = Some(Decimal::MAX);
        assert!(matches!(
            service().create(new),
            Err(EngineError::InvalidRecord { .. })
        ));

        let mut new = new_record("8");
        new.travel_time_minutes = Some(u32::MAX);
        match service().create(new) {
            Err(EngineError::InvalidRecord { field, .. }) => {
                assert_eq!(field, "travel_time_minutes")
            }
            other => panic!("Expected InvalidRecord, got {:?}", other),
        }

        assert!(service().create(new_record("1000")).is_ok());
    }

    #[test]
    fn test_update_rejects_out_of_range_values() {
        let service = service();
        let id = service.create(new_record("6")).unwrap().record.id;

        let result = service.update(
            id,
            WorkRecordUpdate {
                billable_hours: Some(Decimal::MAX),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(EngineError::InvalidRecord { .. })));

        let result = service.update(
            id,
            WorkRecordUpdate {
                break_time_minutes: Some(Some(MAX_RECORD_MINUTES + 1)),
                ..Default::default()
            },
        );
        match result {
            Err(EngineError::InvalidRecord { field, .. }) => {
                assert_eq!(field, "break_time_minutes")
            }
            other => panic!("Expected InvalidRecord, got {:?}", other),
        }
        assert_eq!(service.get(id).unwrap().break_time_minutes, None);
    }
}
