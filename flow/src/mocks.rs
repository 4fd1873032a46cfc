//! Test doubles for the flow's collaborators.
//!
//! - [`ScriptedLedger`]: capacity ledger with per-target scripted results,
//!   recorded calls and an optional gate that holds calls in flight
//! - [`RecordingNavigator`]: navigator that keeps every navigation it applied
//! - [`StaticCatalogSource`]: slot source returning a fixed list
//! - [`slot`] and [`session`]: fixture builders

use crate::aggregator::CommitTarget;
use crate::catalog::{CatalogResult, SlotCatalogSource};
use crate::ledger::{CapacityLedger, ReservationFuture, ReservationResult};
use crate::navigator::{Navigation, Navigator, RevisionGate};
use crate::types::{CapacityMode, Money, Session, SessionId, Slot, SlotId, TimeRange, UserId};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;

const FIXTURE_EPOCH_SECONDS: i64 = 1_772_326_800;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fixture_start() -> DateTime<Utc> {
    DateTime::from_timestamp(FIXTURE_EPOCH_SECONDS, 0).unwrap_or_default()
}

/// Slot fixture: 30 minutes long, starting `number - 1` half hours after
/// 2026-03-01 01:00 UTC
#[must_use]
pub fn slot(number: u32, price_yen: u64, max_participants: u32, current_participants: u32) -> Slot {
    let start = fixture_start() + ChronoDuration::minutes(30 * i64::from(number.saturating_sub(1)));
    Slot {
        id: SlotId::new(),
        slot_number: number,
        time: TimeRange::new(start, start + ChronoDuration::minutes(30)),
        max_participants,
        current_participants,
        price_per_person: Money::from_yen(price_yen),
    }
}

/// Session fixture
#[must_use]
pub fn session(capacity_mode: CapacityMode, allow_multiple_bookings: bool, price_yen: u64) -> Session {
    let start = fixture_start();
    Session {
        id: SessionId::new(),
        title: "Spring portrait session".to_string(),
        time: TimeRange::new(start, start + ChronoDuration::hours(3)),
        location: "Studio A".to_string(),
        price_per_person: Money::from_yen(price_yen),
        capacity_mode,
        allow_multiple_bookings,
    }
}

/// Slot source returning the same list for every session
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    slots: Vec<Slot>,
}

impl StaticCatalogSource {
    /// Source serving `slots`
    #[must_use]
    pub const fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }
}

impl SlotCatalogSource for StaticCatalogSource {
    fn load_slots(
        &self,
        _session_id: SessionId,
    ) -> Pin<Box<dyn Future<Output = CatalogResult<Vec<Slot>>> + Send + '_>> {
        let slots = self.slots.clone();
        Box::pin(async move { Ok(slots) })
    }
}

#[derive(Debug, Default)]
struct Script {
    results: HashMap<CommitTarget, VecDeque<ReservationResult>>,
    delays: HashMap<CommitTarget, Duration>,
    calls: Vec<CommitTarget>,
    completed: Vec<CommitTarget>,
}

/// Capacity ledger driven by a script
///
/// Each target answers with its queued results in order, then succeeds once
/// the queue is empty. A gated ledger holds every call until
/// [`ScriptedLedger::release`] hands out a permit.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLedger {
    script: Arc<Mutex<Script>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedLedger {
    /// Ledger where every reservation succeeds immediately
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger whose calls wait for [`ScriptedLedger::release`]
    #[must_use]
    pub fn gated() -> Self {
        Self {
            script: Arc::default(),
            gate: Some(Arc::new(Semaphore::new(0))),
        }
    }

    /// Queue a result for the next reservation of `slot_id`
    pub fn script_slot(&self, slot_id: SlotId, result: ReservationResult) {
        self.script(CommitTarget::Slot(slot_id), result);
    }

    /// Queue a result for the next reservation of `session_id`
    pub fn script_session(&self, session_id: SessionId, result: ReservationResult) {
        self.script(CommitTarget::Session(session_id), result);
    }

    fn script(&self, target: CommitTarget, result: ReservationResult) {
        lock(&self.script)
            .results
            .entry(target)
            .or_default()
            .push_back(result);
    }

    /// Delay every reservation of `slot_id`
    pub fn delay_slot(&self, slot_id: SlotId, delay: Duration) {
        lock(&self.script).delays.insert(CommitTarget::Slot(slot_id), delay);
    }

    /// Let `calls` held reservations proceed
    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    /// Targets in the order calls started
    #[must_use]
    pub fn calls(&self) -> Vec<CommitTarget> {
        lock(&self.script).calls.clone()
    }

    /// Number of calls started
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.script).calls.len()
    }

    /// Targets in the order calls finished
    #[must_use]
    pub fn completion_order(&self) -> Vec<CommitTarget> {
        lock(&self.script).completed.clone()
    }

    async fn answer(&self, target: CommitTarget) -> ReservationResult {
        let delay = {
            let mut script = lock(&self.script);
            script.calls.push(target);
            script.delays.get(&target).copied()
        };

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = lock(&self.script);
        script.completed.push(target);
        script
            .results
            .get_mut(&target)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(()))
    }
}

impl CapacityLedger for ScriptedLedger {
    fn reserve_slot(&self, slot_id: SlotId, _user_id: UserId) -> ReservationFuture<'_> {
        Box::pin(self.answer(CommitTarget::Slot(slot_id)))
    }

    fn reserve_session(&self, session_id: SessionId, _user_id: UserId) -> ReservationFuture<'_> {
        Box::pin(self.answer(CommitTarget::Session(session_id)))
    }
}

/// Navigator that records every navigation it applies
///
/// Navigations older than the last applied revision are dropped, as a
/// browser host would.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    applied: Arc<Mutex<Vec<Navigation>>>,
    gate: Arc<RevisionGate>,
}

impl RecordingNavigator {
    /// Empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every applied query in order
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        lock(&self.applied).iter().map(|n| n.query.clone()).collect()
    }

    /// Every applied navigation in order
    #[must_use]
    pub fn navigations(&self) -> Vec<Navigation> {
        lock(&self.applied).clone()
    }

    /// Most recent applied query
    #[must_use]
    pub fn last(&self) -> Option<String> {
        lock(&self.applied).last().map(|n| n.query.clone())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, navigation: &Navigation) {
        self.gate.apply_if_newer(navigation.revision, || {
            lock(&self.applied).push(navigation.clone());
        });
    }
}

