use std::collections::HashSet;

use tracing::trace;

use crate::core::{ChangeRef, Projection, SharedChange};

/// Which direction, if any, is currently being synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    PushingToUi,
    PullingFromUi,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub pushes: u64,
    pub pulls: u64,
    /// Model notifications received, whether acted on or not.
    pub notifications: u64,
    pub suppressed_echoes: u64,
}

/// Bridge between the externally visible selected changes and the row
/// selection of the active projection. One instance per view; both
/// directions run through the same state so neither can re-enter the other.
#[derive(Debug, Default)]
pub struct SelectionSync {
    state: SyncState,
    stats: SyncStats,
}

impl SelectionSync {
    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    #[must_use]
    pub const fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Domain to UI. Selects the rows backing `selected` and returns what the
    /// model ended up holding (`selected` minus records the projection does
    /// not contain). `None` when called while a sync is already running.
    pub(crate) fn push(
        &mut self,
        projection: Option<&mut Projection>,
        selected: &[SharedChange],
    ) -> Option<Vec<SharedChange>> {
        if self.state != SyncState::Idle {
            self.stats.suppressed_echoes += 1;
            trace!(state = ?self.state, "push ignored during sync");
            return None;
        }

        self.state = SyncState::PushingToUi;
        self.stats.pushes += 1;

        let applied = match projection {
            None => Vec::new(),
            Some(p) => {
                let members: HashSet<ChangeRef> = selected.iter().map(ChangeRef::new).collect();
                let changed = if members.is_empty() {
                    p.clear_selection()
                } else {
                    p.apply_changes(&members)
                };
                if changed {
                    // The model notifies like it would for user input; the
                    // state check turns that into a no-op.
                    let echoed = self.on_model_changed(p);
                    trace!(echoed = echoed.is_some(), "push notified the model");
                }
                p.selected_changes()
            }
        };

        self.state = SyncState::Idle;
        Some(applied)
    }

    /// UI to domain. Handler for the model's selection-changed notification;
    /// returns the flattened selection, or `None` when the notification is
    /// the echo of a push.
    pub(crate) fn on_model_changed(
        &mut self,
        projection: &Projection,
    ) -> Option<Vec<SharedChange>> {
        self.stats.notifications += 1;
        if self.state != SyncState::Idle {
            self.stats.suppressed_echoes += 1;
            trace!(state = ?self.state, "selection notification suppressed");
            return None;
        }

        self.state = SyncState::PullingFromUi;
        self.stats.pulls += 1;
        let selected = projection.selected_changes();
        self.state = SyncState::Idle;
        Some(selected)
    }
}
