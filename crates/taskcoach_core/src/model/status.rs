//! Synchronisation lifecycle of domain objects.
//!
//! # Responsibility
//! - Define the four sync states and the legal transitions between them.
//! - Report which lifecycle signal (if any) a transition must publish.
//!
//! # Invariants
//! - `markDeleted` is signalled only when the status actually changes.
//! - Leaving `Deleted` through any transition signals `markNotDeleted`.

use serde::{Deserialize, Serialize};

/// Sync state of an item relative to its last persisted form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Created and never synchronised.
    #[default]
    New,
    /// Modified since the last synchronisation.
    Changed,
    /// Tombstoned; kept around until synchronisation completes.
    Deleted,
    /// Matches the persisted form.
    Clean,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Changed => "changed",
            Self::Deleted => "deleted",
            Self::Clean => "clean",
        }
    }
}

/// Lifecycle signal published next to a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSignal {
    MarkDeleted,
    MarkNotDeleted,
}

/// Requested lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    MarkDeleted,
    MarkNotDeleted,
    MarkNew,
    CleanDirty,
    MarkDirty { force: bool },
}

impl Transition {
    /// Applies the transition to `current`.
    pub fn apply(self, current: SyncStatus) -> (SyncStatus, Option<StatusSignal>) {
        let was_deleted = current == SyncStatus::Deleted;
        let leaving_deleted = |next: SyncStatus| {
            if was_deleted && next != SyncStatus::Deleted {
                Some(StatusSignal::MarkNotDeleted)
            } else {
                None
            }
        };
        match self {
            Self::MarkDeleted => {
                let signal = (!was_deleted).then_some(StatusSignal::MarkDeleted);
                (SyncStatus::Deleted, signal)
            }
            Self::MarkNotDeleted => {
                if was_deleted {
                    (SyncStatus::Changed, Some(StatusSignal::MarkNotDeleted))
                } else {
                    (current, None)
                }
            }
            Self::MarkNew => (SyncStatus::New, leaving_deleted(SyncStatus::New)),
            Self::CleanDirty => (SyncStatus::Clean, leaving_deleted(SyncStatus::Clean)),
            Self::MarkDirty { force } => {
                let next = if force || current == SyncStatus::Clean {
                    SyncStatus::Changed
                } else {
                    current
                };
                (next, leaving_deleted(next))
            }
        }
    }
}

/// Signal needed to move from `old` to `new` when restoring a snapshot.
pub fn restore_signal(old: SyncStatus, new: SyncStatus) -> Option<StatusSignal> {
    match (old == SyncStatus::Deleted, new == SyncStatus::Deleted) {
        (false, true) => Some(StatusSignal::MarkDeleted),
        (true, false) => Some(StatusSignal::MarkNotDeleted),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{restore_signal, StatusSignal, SyncStatus, Transition};

    #[test]
    fn mark_deleted_signals_once() {
        assert_eq!(
            Transition::MarkDeleted.apply(SyncStatus::Clean),
            (SyncStatus::Deleted, Some(StatusSignal::MarkDeleted))
        );
        assert_eq!(
            Transition::MarkDeleted.apply(SyncStatus::Deleted),
            (SyncStatus::Deleted, None)
        );
    }

    #[test]
    fn mark_dirty_only_promotes_clean_unless_forced() {
        assert_eq!(
            Transition::MarkDirty { force: false }.apply(SyncStatus::New),
            (SyncStatus::New, None)
        );
        assert_eq!(
            Transition::MarkDirty { force: false }.apply(SyncStatus::Clean),
            (SyncStatus::Changed, None)
        );
        assert_eq!(
            Transition::MarkDirty { force: true }.apply(SyncStatus::Deleted),
            (SyncStatus::Changed, Some(StatusSignal::MarkNotDeleted))
        );
    }

    #[test]
    fn clean_dirty_from_deleted_signals_not_deleted() {
        assert_eq!(
            Transition::CleanDirty.apply(SyncStatus::Deleted),
            (SyncStatus::Clean, Some(StatusSignal::MarkNotDeleted))
        );
        assert_eq!(Transition::CleanDirty.apply(SyncStatus::New), (SyncStatus::Clean, None));
    }

    #[test]
    fn restore_signal_tracks_deleted_edges() {
        assert_eq!(
            restore_signal(SyncStatus::Deleted, SyncStatus::New),
            Some(StatusSignal::MarkNotDeleted)
        );
        assert_eq!(restore_signal(SyncStatus::Clean, SyncStatus::Changed), None);
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&SyncStatus::Changed).expect("serialize");
        assert_eq!(json, "\"changed\"");
    }
}
