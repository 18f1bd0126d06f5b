//! Core data models for the Billable Hours Engine.
//!
//! This module contains the work record, allocation and audit types used
//! throughout the engine.

mod allocation;
mod audit;
mod charge;
mod work_record;

pub use allocation::{
    AllocationDirection, AllocationKind, AllocationResult, AllocationTarget, AppliedResult,
    BatchFailure, ClientAllocationSummary, DayAllocation, RecordAllocation, UnallocatedDay,
};
pub use audit::{AuditStep, AuditWarning, Severity};
pub use charge::{ChargeType, OtherCharge};
pub use work_record::{
    EmployeeAssignment, NewWorkRecord, RecordId, WorkRecord, WorkRecordUpdate, WorkStatus,
};
