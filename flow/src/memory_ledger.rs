//! In-memory capacity ledger.
//!
//! Holds slot rows and session capacities behind one mutex so every
//! "reserve if available" is a single check-and-increment. Used by the demo
//! binary and by tests that run several flows against shared capacity.

use crate::catalog::{CatalogResult, SlotCatalogSource};
use crate::error::ReservationError;
use crate::ledger::{CapacityLedger, ReservationFuture, ReservationResult};
use crate::types::{SessionId, Slot, SlotId, UserId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct SessionCapacity {
    max: u32,
    current: u32,
}

#[derive(Debug, Default)]
struct LedgerState {
    slots: HashMap<SlotId, Slot>,
    session_slots: HashMap<SessionId, Vec<SlotId>>,
    sessions: HashMap<SessionId, SessionCapacity>,
}

/// Capacity ledger kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    latency: Option<Duration>,
}

impl InMemoryLedger {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reservation by `latency` before it takes the lock
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register a slot of a session with its current counts
    pub async fn add_slot(&self, session_id: SessionId, slot: Slot) {
        let mut state = self.state.lock().await;
        state.session_slots.entry(session_id).or_default().push(slot.id);
        state.slots.insert(slot.id, slot);
    }

    /// Register an unslotted session's capacity
    pub async fn add_session(&self, session_id: SessionId, max_participants: u32) {
        self.state.lock().await.sessions.insert(
            session_id,
            SessionCapacity {
                max: max_participants,
                current: 0,
            },
        );
    }

    /// Participants currently booked into a slot
    pub async fn slot_participants(&self, slot_id: SlotId) -> Option<u32> {
        self.state
            .lock()
            .await
            .slots
            .get(&slot_id)
            .map(|slot| slot.current_participants)
    }

    /// Participants currently booked into an unslotted session
    pub async fn session_participants(&self, session_id: SessionId) -> Option<u32> {
        self.state
            .lock()
            .await
            .sessions
            .get(&session_id)
            .map(|capacity| capacity.current)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl CapacityLedger for InMemoryLedger {
    fn reserve_slot(&self, slot_id: SlotId, user_id: UserId) -> ReservationFuture<'_> {
        Box::pin(async move {
            self.simulate_latency().await;

            let mut state = self.state.lock().await;
            let Some(slot) = state.slots.get_mut(&slot_id) else {
                return Err(ReservationError::unexpected(format!("Unknown slot {slot_id}")));
            };
            reserve_one(&mut slot.current_participants, slot.max_participants)?;

            tracing::debug!(
                %slot_id,
                %user_id,
                current = slot.current_participants,
                max = slot.max_participants,
                "Slot reserved"
            );
            Ok(())
        })
    }

    fn reserve_session(&self, session_id: SessionId, user_id: UserId) -> ReservationFuture<'_> {
        Box::pin(async move {
            self.simulate_latency().await;

            let mut state = self.state.lock().await;
            let Some(capacity) = state.sessions.get_mut(&session_id) else {
                return Err(ReservationError::unexpected(format!(
                    "Unknown session {session_id}"
                )));
            };
            reserve_one(&mut capacity.current, capacity.max)?;

            tracing::debug!(%session_id, %user_id, current = capacity.current, "Session reserved");
            Ok(())
        })
    }
}

fn reserve_one(current: &mut u32, max: u32) -> ReservationResult {
    if *current >= max {
        return Err(ReservationError::capacity_exceeded());
    }
    *current += 1;
    Ok(())
}

impl SlotCatalogSource for InMemoryLedger {
    fn load_slots(
        &self,
        session_id: SessionId,
    ) -> Pin<Box<dyn Future<Output = CatalogResult<Vec<Slot>>> + Send + '_>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            let slots = state
                .session_slots
                .get(&session_id)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| state.slots.get(id).cloned())
                        .collect()
                })
                .unwrap_or_default();
            Ok(slots)
        })
    }
}
