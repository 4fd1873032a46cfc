//! Where the flow mirrors its query parameters.
//!
//! In a browser host a navigation writes the page URL's query so that reload
//! and back/forward rebuild the flow. Step changes push a history entry so
//! browser Back returns to the previous step; edits within a step and
//! hydrate normalization replace the current entry.
//!
//! Navigation effects run as independent tasks and may arrive out of order.
//! Every [`Navigation`] carries the flow's revision, and navigators apply
//! only revisions newer than the last one applied ([`RevisionGate`]).

use std::sync::{Mutex, PoisonError};

/// How a navigation touches the browser history
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationKind {
    /// Add a history entry (step changes)
    Push,
    /// Overwrite the current entry (selection edits, hydrate normalization)
    Replace,
}

/// One query-parameter write
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    /// Flow revision the query was built at; strictly increasing per flow
    pub revision: u64,
    /// Push or replace
    pub kind: NavigationKind,
    /// Encoded query, no leading `?`
    pub query: String,
}

/// Sink for the flow's encoded query string
pub trait Navigator: Send + Sync {
    /// Apply `navigation` unless a newer revision was already applied
    fn navigate(&self, navigation: &Navigation);
}

/// Drops navigations older than the last applied revision.
///
/// The check and the write run under one lock, so a stale navigation can
/// never land after a newer one.
#[derive(Debug, Default)]
pub struct RevisionGate {
    applied: Mutex<u64>,
}

impl RevisionGate {
    /// Gate that has applied nothing yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `apply` if `revision` is newer than every revision applied so far
    ///
    /// Returns whether `apply` ran.
    pub fn apply_if_newer(&self, revision: u64, apply: impl FnOnce()) -> bool {
        let mut applied = self.applied.lock().unwrap_or_else(PoisonError::into_inner);
        if revision <= *applied {
            tracing::debug!(revision, applied = *applied, "Stale navigation dropped");
            return false;
        }
        apply();
        *applied = revision;
        true
    }

    /// Last applied revision, 0 if none
    #[must_use]
    pub fn applied(&self) -> u64 {
        *self.applied.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Navigator that only logs, for hosts without a URL
#[derive(Debug, Default)]
pub struct TracingNavigator {
    gate: RevisionGate,
}

impl TracingNavigator {
    /// Creates a new `TracingNavigator`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Navigator for TracingNavigator {
    fn navigate(&self, navigation: &Navigation) {
        self.gate.apply_if_newer(navigation.revision, || {
            tracing::info!(
                revision = navigation.revision,
                kind = ?navigation.kind,
                query = %navigation.query,
                "Flow query updated"
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_drops_older_revisions() {
        let gate = RevisionGate::new();
        let mut applied = Vec::new();

        for revision in [2, 1, 3, 3] {
            gate.apply_if_newer(revision, || applied.push(revision));
        }

        assert_eq!(applied, vec![2, 3]);
        assert_eq!(gate.applied(), 3);
    }

    #[test]
    fn test_tracing_navigator_tracks_revision() {
        let navigator = TracingNavigator::new();
        navigator.navigate(&Navigation {
            revision: 4,
            kind: NavigationKind::Push,
            query: "step=confirm".to_string(),
        });
        navigator.navigate(&Navigation {
            revision: 2,
            kind: NavigationKind::Replace,
            query: "step=select".to_string(),
        });

        assert_eq!(navigator.gate.applied(), 4);
    }
}
