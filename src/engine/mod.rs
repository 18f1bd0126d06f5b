//! Engine services over a record store and a settings provider.
//!
//! [`WorkRecordService`] owns every mutation of a work record and routes it
//! through the recalculation rule. [`TimeAllocator`] previews and applies
//! proportional break or travel allocations on top of the service, so that
//! applied adjustments are recalculated the same way as any other edit.
//!
//! # Example
//!
//! ```
//! use billable_hours_engine::config::StaticSettings;
//! use billable_hours_engine::engine::{TimeAllocator, WorkRecordService};
//! use billable_hours_engine::models::{AllocationKind, AllocationTarget, NewWorkRecord};
//! use billable_hours_engine::store::InMemoryStore;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let service = WorkRecordService::new(InMemoryStore::new(), StaticSettings::disabled());
//! let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
//!
//! let mut first = NewWorkRecord::new(date, "kabeiseman", "maintenance", Decimal::from(3));
//! first.travel_time_minutes = Some(40);
//! service.create(first).unwrap();
//! service.create(NewWorkRecord::new(date, "kurzweil", "maintenance", Decimal::from(1))).unwrap();
//!
//! let allocator = TimeAllocator::new(&service);
//! let preview = allocator.allocate(AllocationTarget::Date { date }, AllocationKind::Travel).unwrap();
//! assert_eq!(preview.days[0].records[0].allocated_minutes, 30);
//!
//! let applied = allocator.apply(&preview).unwrap();
//! assert!(applied.is_complete());
//! assert_eq!(applied.updated_records.len(), 2);
//! ```

mod allocator;
mod service;

pub use allocator::TimeAllocator;
pub use service::{MAX_RECORD_HOURS, MAX_RECORD_MINUTES, SavedRecord, WorkRecordService};
