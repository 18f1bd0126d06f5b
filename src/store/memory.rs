//! In-memory work record store.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{RecordId, WorkRecord};

use super::WorkRecordStore;

#[derive(Debug)]
struct Inner {
    records: BTreeMap<RecordId, WorkRecord>,
    next_id: RecordId,
}

/// A [`WorkRecordStore`] backed by a map behind an `RwLock`.
///
/// Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.read()?.records.len())
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.read()?.records.is_empty())
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| EngineError::StoreError {
            message: "record store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| EngineError::StoreError {
            message: "record store lock poisoned".to_string(),
        })
    }
}

impl WorkRecordStore for InMemoryStore {
    fn get_by_id(&self, id: RecordId) -> EngineResult<Option<WorkRecord>> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    fn create(&self, mut record: WorkRecord) -> EngineResult<WorkRecord> {
        let mut inner = self.write()?;
        record.id = inner.next_id;
        inner.next_id += 1;
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: WorkRecord) -> EngineResult<WorkRecord> {
        let mut inner = self.write()?;
        match inner.records.get_mut(&record.id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(record)
            }
            None => Err(EngineError::RecordNotFound { id: record.id }),
        }
    }

    fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<WorkRecord>> {
        let inner = self.read()?;
        let mut records: Vec<WorkRecord> = inner
            .records
            .values()
            .filter(|record| record.date >= start && record.date <= end)
            .cloned()
            .collect();
        records.sort_by_key(|record| (record.date, record.id));
        Ok(records)
    }

    fn delete(&self, id: RecordId) -> EngineResult<bool> {
        Ok(self.write()?.records.remove(&id).is_some())
    }
}
