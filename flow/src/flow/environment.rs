//! Collaborators injected into the booking flow reducer.

use crate::aggregator::CommitDispatch;
use crate::ledger::CapacityLedger;
use crate::navigator::Navigator;
use crate::types::UserId;
use photo_booking_core::environment::Clock;
use std::sync::Arc;

/// Environment dependencies for the booking flow
#[derive(Clone)]
pub struct BookingFlowEnvironment {
    /// Timestamps commit reports
    pub clock: Arc<dyn Clock>,
    /// Where reservations are made
    pub ledger: Arc<dyn CapacityLedger>,
    /// Where the query parameters are mirrored
    pub navigator: Arc<dyn Navigator>,
    /// Participant making the booking
    pub user_id: UserId,
    /// How a commit issues its reservations
    pub dispatch: CommitDispatch,
}

impl BookingFlowEnvironment {
    /// Creates a new `BookingFlowEnvironment` with sequential dispatch
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ledger: Arc<dyn CapacityLedger>,
        navigator: Arc<dyn Navigator>,
        user_id: UserId,
    ) -> Self {
        Self {
            clock,
            ledger,
            navigator,
            user_id,
            dispatch: CommitDispatch::default(),
        }
    }

    /// Use `dispatch` for commits
    #[must_use]
    pub const fn with_dispatch(mut self, dispatch: CommitDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }
}

impl std::fmt::Debug for BookingFlowEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingFlowEnvironment")
            .field("user_id", &self.user_id)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}
