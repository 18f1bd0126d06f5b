//! Work record persistence.
//!
//! The engine reads and writes work records through the [`WorkRecordStore`]
//! trait so it can sit on top of whatever database the surrounding service
//! uses. [`InMemoryStore`] is the implementation shipped with the crate.

mod memory;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{RecordId, WorkRecord};

pub use memory::InMemoryStore;

/// Persistence operations the engine needs for work records.
///
/// Each call is a single read or a single-record write; the store gives no
/// ordering guarantee between concurrent writes to the same record beyond
/// last write wins.
pub trait WorkRecordStore: Send + Sync {
    /// Fetches a record, or `None` if it does not exist.
    fn get_by_id(&self, id: RecordId) -> EngineResult<Option<WorkRecord>>;

    /// Persists a new record, assigning its id. The supplied id is ignored.
    fn create(&self, record: WorkRecord) -> EngineResult<WorkRecord>;

    /// Replaces an existing record.
    ///
    /// Returns [`EngineError::RecordNotFound`](crate::error::EngineError::RecordNotFound)
    /// if no record has `record.id`.
    fn update(&self, record: WorkRecord) -> EngineResult<WorkRecord>;

    /// Lists records dated within `start..=end`, ordered by date then id.
    fn list_by_date_range(&self, start: NaiveDate, end: NaiveDate)
    -> EngineResult<Vec<WorkRecord>>;

    /// Deletes a record. Returns whether it existed.
    fn delete(&self, id: RecordId) -> EngineResult<bool>;
}

impl<S: WorkRecordStore + ?Sized> WorkRecordStore for Arc<S> {
    fn get_by_id(&self, id: RecordId) -> EngineResult<Option<WorkRecord>> {
        (**self).get_by_id(id)
    }

    fn create(&self, record: WorkRecord) -> EngineResult<WorkRecord> {
        (**self).create(record)
    }

    fn update(&self, record: WorkRecord) -> EngineResult<WorkRecord> {
        (**self).update(record)
    }

    fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<WorkRecord>> {
        (**self).list_by_date_range(start, end)
    }

    fn delete(&self, id: RecordId) -> EngineResult<bool> {
        (**self).delete(id)
    }
}
