//! Booking step machine.

use super::actions::BookingFlowAction;
use super::environment::BookingFlowEnvironment;
use super::state::{FlowState, FlowStep, Notice};
use crate::aggregator::{aggregate, execute_commit, plan_commit, BookingOutcome};
use crate::metrics;
use crate::navigator::{Navigation, NavigationKind};
use crate::query::FlowQuery;
use crate::selection::{Selection, SelectionMode};
use crate::types::SlotId;
use photo_booking_core::{
    async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec,
};
use std::sync::Arc;
use std::time::Instant;

type Effects = SmallVec<[Effect<BookingFlowAction>; 4]>;

/// Reducer for the booking flow
///
/// Pure and synchronous; reservations and navigation run as effects.
#[derive(Clone, Debug, Default)]
pub struct BookingFlowReducer;

impl BookingFlowReducer {
    /// Creates a new `BookingFlowReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Mirror the current step and selection to the navigator
    ///
    /// Bumps the flow revision so the navigator can drop a mirror that
    /// arrives after a newer one.
    fn navigate(
        state: &mut FlowState,
        env: &BookingFlowEnvironment,
        kind: NavigationKind,
    ) -> Effect<BookingFlowAction> {
        state.revision += 1;
        let navigation = Navigation {
            revision: state.revision,
            kind,
            query: state.query().encode(state.mode),
        };
        let navigator = Arc::clone(&env.navigator);
        async_effect! {
            navigator.navigate(&navigation);
            None
        }
    }

    fn ignore(reason: &'static str) -> Effects {
        tracing::debug!(reason, "Intent ignored");
        metrics::record_ignored(reason);
        SmallVec::new()
    }

    /// Bring a decoded query in line with the catalog and the guards
    ///
    /// A restored `complete` step keeps booked slots even when they are now
    /// full; other steps keep only selectable slots. `confirm` and
    /// `complete` fall back to `select` when the guard no longer holds.
    fn normalize(state: &FlowState, decoded: &FlowQuery) -> FlowQuery {
        let keep = |id: &SlotId| {
            if decoded.step == FlowStep::Complete {
                state.catalog.get(id).is_some()
            } else {
                state.is_selectable(id)
            }
        };
        let selection = match state.mode {
            SelectionMode::Unslotted => Selection::new(),
            SelectionMode::Single => {
                Selection::from_ids(decoded.selection.ids().iter().copied().find(&keep))
            },
            SelectionMode::Multiple => {
                let mut selection = decoded.selection.clone();
                selection.retain(&keep);
                selection
            },
        };

        let mut normalized = FlowQuery::new(decoded.step, selection);
        if normalized.step != FlowStep::Select {
            let restored = FlowState {
                selection: normalized.selection.clone(),
                ..state.clone()
            };
            if let Err(error) = restored.check_proceed() {
                tracing::debug!(
                    step = %normalized.step,
                    reason = error.reason(),
                    "Demoting restored step"
                );
                normalized.step = FlowStep::Select;
            }
        }
        normalized
    }

    fn hydrate(state: &mut FlowState, raw: &str, env: &BookingFlowEnvironment) -> Effects {
        if state.is_committing {
            return Self::ignore("committing");
        }
        if state.step == FlowStep::Complete {
            return Self::ignore("flow_complete");
        }

        let (decoded, unreadable) = match FlowQuery::decode(raw) {
            Ok(decoded) => (decoded, false),
            Err(error) => {
                tracing::warn!(
                    session_id = %state.session.id,
                    %error,
                    "Unreadable flow query, starting from selection"
                );
                (FlowQuery::default(), true)
            },
        };
        let normalized = Self::normalize(state, &decoded);

        state.step = normalized.step;
        state.selection = normalized.selection.clone();
        state.notice = None;

        tracing::debug!(
            session_id = %state.session.id,
            step = %state.step,
            selected = state.selection.len(),
            "Flow hydrated"
        );

        if normalized == decoded && !unreadable {
            SmallVec::new()
        } else {
            smallvec![Self::navigate(state, env, NavigationKind::Replace)]
        }
    }

    /// Apply a slot intent with the semantics of the flow's mode: toggle in
    /// multiple mode, replace in single mode
    fn select_slot(state: &mut FlowState, slot_id: SlotId, env: &BookingFlowEnvironment) -> Effects {
        if state.is_committing {
            return Self::ignore("committing");
        }
        if state.step != FlowStep::Select {
            return Self::ignore("not_selecting");
        }
        if state.mode == SelectionMode::Unslotted {
            return Self::ignore("unslotted");
        }
        let Some(slot) = state.catalog.get(&slot_id) else {
            tracing::debug!(%slot_id, "Unknown slot");
            return Self::ignore("unknown_slot");
        };
        if slot.is_full() {
            tracing::debug!(%slot_id, slot_number = slot.slot_number, "Full slot");
            return Self::ignore("slot_full");
        }

        let before = state.selection.clone();
        if state.mode == SelectionMode::Multiple {
            state.selection.toggle(slot_id);
        } else {
            state.selection.choose(slot_id);
        }
        if state.selection == before {
            return SmallVec::new();
        }

        state.notice = None;
        smallvec![Self::navigate(state, env, NavigationKind::Replace)]
    }

    fn proceed(state: &mut FlowState, env: &BookingFlowEnvironment) -> Effects {
        if state.step != FlowStep::Select || state.is_committing {
            return Self::ignore("not_selecting");
        }
        if let Err(error) = state.check_proceed() {
            tracing::info!(
                session_id = %state.session.id,
                reason = error.reason(),
                "Proceed refused"
            );
            metrics::record_refused(error.reason());
            state.notice = Some(Notice::warning(error.to_string()));
            return SmallVec::new();
        }

        state.step = FlowStep::Confirm;
        state.notice = None;
        smallvec![Self::navigate(state, env, NavigationKind::Push)]
    }

    fn commit(state: &mut FlowState, env: &BookingFlowEnvironment) -> Effects {
        if state.is_committing {
            tracing::debug!(attempt = state.attempt, "Commit already in flight");
            return Self::ignore("committing");
        }
        if state.step != FlowStep::Confirm {
            return Self::ignore("not_confirming");
        }
        if let Err(error) = state.check_proceed() {
            metrics::record_refused(error.reason());
            state.notice = Some(Notice::warning(error.to_string()));
            return SmallVec::new();
        }

        state.attempt += 1;
        state.is_committing = true;
        state.notice = None;

        let attempt = state.attempt;
        let plan = plan_commit(state.mode, state.session.id, &state.catalog, &state.selection);
        let ledger = Arc::clone(&env.ledger);
        let user_id = env.user_id;
        let dispatch = env.dispatch;

        tracing::info!(
            session_id = %state.session.id,
            attempt,
            reservations = plan.len(),
            "Commit started"
        );

        smallvec![async_effect! {
            let started = Instant::now();
            let outcomes = execute_commit(&*ledger, user_id, plan, dispatch).await;
            metrics::record_commit_duration(started.elapsed());
            Some(BookingFlowAction::CommitSettled { attempt, outcomes })
        }]
    }

    fn settle(
        state: &mut FlowState,
        attempt: u64,
        outcomes: &[BookingOutcome],
        env: &BookingFlowEnvironment,
    ) -> Effects {
        if !state.is_committing || attempt != state.attempt {
            tracing::warn!(
                attempt,
                current = state.attempt,
                committing = state.is_committing,
                "Stale commit result ignored"
            );
            return SmallVec::new();
        }

        let report = aggregate(outcomes, env.clock.now());
        metrics::record_commit_result(&report);
        state.is_committing = false;

        tracing::info!(
            session_id = %state.session.id,
            attempt,
            success_count = report.success_count,
            total_attempted = report.total_attempted,
            "Commit settled"
        );

        let effects = if report.is_total_failure() {
            state.notice = Some(Notice::error(report.summary()));
            SmallVec::new()
        } else {
            state.step = FlowStep::Complete;
            state.notice = Some(if report.is_partial() {
                Notice::warning(report.summary())
            } else {
                Notice::info(report.summary())
            });
            smallvec![Self::navigate(state, env, NavigationKind::Push)]
        };
        state.last_report = Some(report);
        effects
    }
}

impl Reducer for BookingFlowReducer {
    type State = FlowState;
    type Action = BookingFlowAction;
    type Environment = BookingFlowEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingFlowAction::Hydrate { query } => Self::hydrate(state, &query, env),

            BookingFlowAction::ChooseSlot { slot_id } | BookingFlowAction::ToggleSlot { slot_id } => {
                Self::select_slot(state, slot_id, env)
            },

            BookingFlowAction::ClearSelection => {
                if state.is_committing || state.step != FlowStep::Select {
                    return Self::ignore("not_selecting");
                }
                if state.selection.is_empty() {
                    return SmallVec::new();
                }
                state.selection.clear();
                state.notice = None;
                smallvec![Self::navigate(state, env, NavigationKind::Replace)]
            },

            BookingFlowAction::Proceed => Self::proceed(state, env),

            BookingFlowAction::Back => {
                if state.step != FlowStep::Confirm || state.is_committing {
                    return Self::ignore("not_confirming");
                }
                state.step = FlowStep::Select;
                state.notice = None;
                smallvec![Self::navigate(state, env, NavigationKind::Push)]
            },

            BookingFlowAction::Commit => Self::commit(state, env),

            BookingFlowAction::CommitSettled { attempt, outcomes } => {
                Self::settle(state, attempt, &outcomes, env)
            },

            BookingFlowAction::Finish => {
                if state.step != FlowStep::Complete {
                    return Self::ignore("not_complete");
                }
                state.step = FlowStep::Select;
                state.selection.clear();
                state.last_report = None;
                state.notice = None;
                smallvec![Self::navigate(state, env, NavigationKind::Push)]
            },

            BookingFlowAction::DismissNotice => {
                state.notice = None;
                SmallVec::new()
            },
        }
    }
}
