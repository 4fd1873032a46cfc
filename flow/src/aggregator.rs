//! Commit execution and result aggregation.
//!
//! A commit is a list of independent reservations. Each succeeds or fails on
//! its own; successes are never rolled back when a sibling fails. The
//! aggregator runs the list against the ledger and folds the per-target
//! outcomes into one [`CommitReport`].

use crate::catalog::SlotCatalog;
use crate::error::{ConfigError, FailureKind, ReservationError};
use crate::ledger::CapacityLedger;
use crate::selection::{Selection, SelectionMode};
use crate::types::{SessionId, SlotId, UserId};
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};
use std::str::FromStr;

/// What one reservation books
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitTarget {
    /// A slot of a slotted session
    Slot(SlotId),
    /// An unslotted session as a whole
    Session(SessionId),
}

impl fmt::Display for CommitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(id) => write!(f, "slot {id}"),
            Self::Session(id) => write!(f, "session {id}"),
        }
    }
}

/// One reservation to issue, with the label users know it by
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedReservation {
    /// What to reserve
    pub target: CommitTarget,
    /// Display label, e.g. "slot 2"
    pub label: String,
}

/// Build the commit plan for the current selection
///
/// Unslotted sessions yield one session reservation. Otherwise one slot
/// reservation per selected id, in selection order.
#[must_use]
pub fn plan_commit(
    mode: SelectionMode,
    session_id: SessionId,
    catalog: &SlotCatalog,
    selection: &Selection,
) -> Vec<PlannedReservation> {
    if mode == SelectionMode::Unslotted {
        return vec![PlannedReservation {
            target: CommitTarget::Session(session_id),
            label: "session".to_string(),
        }];
    }

    selection
        .ids()
        .iter()
        .map(|id| PlannedReservation {
            target: CommitTarget::Slot(*id),
            label: catalog
                .get(id)
                .map_or_else(|| format!("slot {id}"), |slot| format!("slot {}", slot.slot_number)),
        })
        .collect()
}

/// Result of one reservation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingOutcome {
    /// What was reserved
    pub target: CommitTarget,
    /// Display label
    pub label: String,
    /// `None` on success
    pub failure: Option<ReservationError>,
}

impl BookingOutcome {
    /// Successful outcome
    #[must_use]
    pub const fn succeeded(target: CommitTarget, label: String) -> Self {
        Self {
            target,
            label,
            failure: None,
        }
    }

    /// Failed outcome
    #[must_use]
    pub const fn failed(target: CommitTarget, label: String, error: ReservationError) -> Self {
        Self {
            target,
            label,
            failure: Some(error),
        }
    }

    /// Whether the reservation went through
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// One failed reservation in a report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitFailure {
    /// What failed
    pub target: CommitTarget,
    /// Display label
    pub label: String,
    /// Why
    pub kind: FailureKind,
    /// Human-readable reason
    pub message: String,
}

/// Folded result of a commit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReport {
    /// Reservations that went through
    pub success_count: usize,
    /// Reservations issued
    pub total_attempted: usize,
    /// Every failure, in selection order
    pub failures: Vec<CommitFailure>,
    /// The commit booked an unslotted session rather than slots
    pub whole_session: bool,
    /// When the last outcome was folded in
    pub settled_at: DateTime<Utc>,
}

impl CommitReport {
    /// Nothing went through
    #[must_use]
    pub const fn is_total_failure(&self) -> bool {
        self.success_count == 0
    }

    /// Some, but not all, went through
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.success_count > 0 && self.success_count < self.total_attempted
    }

    /// User-facing summary naming every failure
    ///
    /// `"1 of 2 slots booked; slot 2 failed: This slot is already full"`
    #[must_use]
    pub fn summary(&self) -> String {
        let noun = if self.whole_session {
            "session"
        } else if self.total_attempted == 1 {
            "slot"
        } else {
            "slots"
        };
        let mut summary = format!("{} of {} {noun} booked", self.success_count, self.total_attempted);
        for failure in &self.failures {
            let _ = write!(summary, "; {} failed: {}", failure.label, failure.message);
        }
        summary
    }
}

/// Fold outcomes into a report, keeping their order
#[must_use]
pub fn aggregate(outcomes: &[BookingOutcome], settled_at: DateTime<Utc>) -> CommitReport {
    let failures: Vec<CommitFailure> = outcomes
        .iter()
        .filter_map(|outcome| {
            outcome.failure.as_ref().map(|error| CommitFailure {
                target: outcome.target,
                label: outcome.label.clone(),
                kind: error.kind(),
                message: error.message().to_string(),
            })
        })
        .collect();

    CommitReport {
        success_count: outcomes.len() - failures.len(),
        total_attempted: outcomes.len(),
        failures,
        whole_session: outcomes
            .iter()
            .any(|outcome| matches!(outcome.target, CommitTarget::Session(_))),
        settled_at,
    }
}

/// How the reservations of one commit are issued
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommitDispatch {
    /// One at a time, each awaited before the next starts
    #[default]
    Sequential,
    /// All at once; outcomes are still reported in plan order
    Parallel,
}

impl FromStr for CommitDispatch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            other => Err(ConfigError::UnknownDispatch(other.to_string())),
        }
    }
}

async fn reserve(
    ledger: &dyn CapacityLedger,
    user_id: UserId,
    planned: PlannedReservation,
) -> BookingOutcome {
    let result = match planned.target {
        CommitTarget::Slot(slot_id) => ledger.reserve_slot(slot_id, user_id).await,
        CommitTarget::Session(session_id) => ledger.reserve_session(session_id, user_id).await,
    };

    let outcome = match result {
        Ok(()) => BookingOutcome::succeeded(planned.target, planned.label),
        Err(error) => {
            tracing::info!(
                target_id = %planned.target,
                kind = %error.kind(),
                message = error.message(),
                "Reservation failed"
            );
            BookingOutcome::failed(planned.target, planned.label, error)
        },
    };
    crate::metrics::record_outcome(&outcome);
    outcome
}

/// Issue every planned reservation and collect outcomes in plan order
///
/// Every call is awaited; nothing is cancelled part-way.
pub async fn execute_commit(
    ledger: &dyn CapacityLedger,
    user_id: UserId,
    plan: Vec<PlannedReservation>,
    dispatch: CommitDispatch,
) -> Vec<BookingOutcome> {
    tracing::debug!(reservations = plan.len(), ?dispatch, "Executing commit");

    match dispatch {
        CommitDispatch::Sequential => {
            let mut outcomes = Vec::with_capacity(plan.len());
            for planned in plan {
                outcomes.push(reserve(ledger, user_id, planned).await);
            }
            outcomes
        },
        CommitDispatch::Parallel => {
            futures::future::join_all(
                plan.into_iter()
                    .map(|planned| reserve(ledger, user_id, planned)),
            )
            .await
        },
    }
}
