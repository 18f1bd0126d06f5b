//! Last-write-wins comparison of external and local edit times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The timestamps needed to reconcile one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTimestamps {
    /// When the record was last edited externally; `None` if it does not exist there.
    pub external_edited_at: Option<DateTime<Utc>>,
    /// When the two sides were last reconciled; `None` if never.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// When the local record was last updated.
    pub local_updated_at: DateTime<Utc>,
}

/// What to do with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Overwrite the local record with the external one.
    PullExternal,
    /// Overwrite the external record with the local one.
    PushLocal,
    /// Nothing changed on either side.
    InSync,
}

/// The outcome of [`resolve_sync`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDecision {
    /// The action to take.
    pub action: SyncAction,
    /// Whether both sides changed since the last sync.
    pub conflict: bool,
    /// Human-readable explanation.
    pub reason: String,
}

impl SyncDecision {
    fn new(action: SyncAction, conflict: bool, reason: impl Into<String>) -> Self {
        Self {
            action,
            conflict,
            reason: reason.into(),
        }
    }
}

fn newer_side(external: DateTime<Utc>, local: DateTime<Utc>) -> SyncAction {
    if external > local {
        SyncAction::PullExternal
    } else {
        SyncAction::PushLocal
    }
}

/// Decides which side of a record wins.
///
/// Local wins every tie.
///
/// # Example
///
/// ```
/// use billable_hours_engine::sync::{SyncAction, SyncTimestamps, resolve_sync};
/// use chrono::{TimeZone, Utc};
///
/// let decision = resolve_sync(&SyncTimestamps {
///     external_edited_at: Some(Utc.with_ymd_and_hms(2025, 6, 3, 17, 0, 0).unwrap()),
///     last_synced_at: Some(Utc.with_ymd_and_hms(2025, 6, 3, 12, 0, 0).unwrap()),
///     local_updated_at: Utc.with_ymd_and_hms(2025, 6, 3, 15, 0, 0).unwrap(),
/// });
/// assert_eq!(decision.action, SyncAction::PullExternal);
/// assert!(decision.conflict);
/// ```
pub fn resolve_sync(timestamps: &SyncTimestamps) -> SyncDecision {
    let local = timestamps.local_updated_at;

    let Some(external) = timestamps.external_edited_at else {
        return SyncDecision::new(
            SyncAction::PushLocal,
            false,
            "Record does not exist externally",
        );
    };

    let decision = match timestamps.last_synced_at {
        None => SyncDecision::new(
            newer_side(external, local),
            false,
            "Never synced; newer side wins",
        ),
        Some(synced) => match (external > synced, local > synced) {
            (true, true) => SyncDecision::new(
                newer_side(external, local),
                true,
                "Both sides changed since last sync; last write wins",
            ),
            (true, false) => SyncDecision::new(
                SyncAction::PullExternal,
                false,
                "Only the external record changed",
            ),
            (false, true) => {
                SyncDecision::new(SyncAction::PushLocal, false, "Only the local record changed")
            }
            (false, false) => SyncDecision::new(
                SyncAction::InSync,
                false,
                "Neither side changed since last sync",
            ),
        },
    };

    debug!(
        action = ?decision.action,
        conflict = decision.conflict,
        %external,
        %local,
        "Resolved sync"
    );

    decision
}
