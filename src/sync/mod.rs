//! Reconciling work records edited both locally and in an external system.
//!
//! Records can be edited in an external data-entry database as well as in the
//! local store. Which side wins is decided from three timestamps alone; see
//! [`resolve_sync`].

mod conflict;

pub use conflict::{SyncAction, SyncDecision, SyncTimestamps, resolve_sync};
