//! Capacity ledger contract.
//!
//! The ledger holds the authoritative participant counts and performs
//! "reserve if capacity available" atomically. The flow never checks
//! capacity itself beyond the advisory catalog snapshot.

use crate::error::ReservationError;
use crate::types::{SessionId, SlotId, UserId};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Result of one reservation call
pub type ReservationResult = Result<(), ReservationError>;

/// Boxed future returned by ledger calls
pub type ReservationFuture<'a> = Pin<Box<dyn Future<Output = ReservationResult> + Send + 'a>>;

/// Authoritative capacity store
///
/// Each call is independent: there is no cross-call transaction and no
/// rollback. Implementations map transport failures and timeouts to
/// [`ReservationError::Unexpected`].
pub trait CapacityLedger: Send + Sync {
    /// Reserve one place in a slot for `user_id`
    ///
    /// # Errors
    ///
    /// [`ReservationError::CapacityExceeded`] when the slot is full,
    /// [`ReservationError::Unexpected`] for anything else.
    fn reserve_slot(&self, slot_id: SlotId, user_id: UserId) -> ReservationFuture<'_>;

    /// Reserve one place in an unslotted session for `user_id`
    ///
    /// # Errors
    ///
    /// Same as [`CapacityLedger::reserve_slot`].
    fn reserve_session(&self, session_id: SessionId, user_id: UserId) -> ReservationFuture<'_>;
}

impl<T: CapacityLedger + ?Sized> CapacityLedger for Arc<T> {
    fn reserve_slot(&self, slot_id: SlotId, user_id: UserId) -> ReservationFuture<'_> {
        (**self).reserve_slot(slot_id, user_id)
    }

    fn reserve_session(&self, session_id: SessionId, user_id: UserId) -> ReservationFuture<'_> {
        (**self).reserve_session(session_id, user_id)
    }
}
