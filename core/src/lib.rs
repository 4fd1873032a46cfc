//! # Photo Booking Core
//!
//! The small functional kernel the booking flow is written against.
//!
//! A feature is described by four pieces:
//!
//! - **State**: plain owned data for one flow instance
//! - **Action**: every input the flow reacts to (user intents and effect feedback)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`, pure and synchronous
//! - **Effect**: a description of asynchronous work; the runtime executes it and
//!   feeds the resulting action back into the reducer
//!
//! Collaborators (clock, capacity ledger, navigator) reach the reducer through
//! the `Environment` associated type, so tests swap them for fakes.
//!
//! ## Example
//!
//! ```
//! use photo_booking_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Default)]
//! struct Seats { taken: u32 }
//!
//! enum SeatAction { Take, Release }
//!
//! struct SeatReducer;
//!
//! impl Reducer for SeatReducer {
//!     type State = Seats;
//!     type Action = SeatAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Seats, action: SeatAction, _env: &()) -> SmallVec<[Effect<SeatAction>; 4]> {
//!         match action {
//!             SeatAction::Take => state.taken += 1,
//!             SeatAction::Release => state.taken = state.taken.saturating_sub(1),
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut seats = Seats::default();
//! SeatReducer.reduce(&mut seats, SeatAction::Take, &());
//! assert_eq!(seats.taken, 1);
//! ```

pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

mod effect_macros;

/// The reducer contract.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Business logic of one feature.
    ///
    /// `reduce` validates the action, mutates `state` in place and returns
    /// descriptions of the side effects to run. It must not perform I/O
    /// itself; everything asynchronous goes through an [`Effect`].
    ///
    /// Most actions produce zero or one effect, so the return type keeps up
    /// to four inline without allocating.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// Injected collaborators
        type Environment;

        /// Reduce an action into state changes and effects
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Side-effect descriptions.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Boxed future an effect resolves to.
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Describes work for the runtime to perform after a reducer returns.
    ///
    /// Effects are values, not execution. The runtime spawns them and, when a
    /// [`Effect::Future`] resolves to `Some(action)`, sends that action back
    /// through the reducer.
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Arbitrary async computation whose optional result is fed back
        Future(EffectFuture<Action>),
    }

    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block as an effect
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// True for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Dependency traits shared by every environment.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of the current time
    ///
    /// Production code uses [`SystemClock`]; tests pin time with a fixed clock
    /// so reports carry reproducible timestamps.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[test]
    fn none_effect_debug() {
        let effect: Effect<()> = Effect::None;
        assert!(effect.is_none());
        assert_eq!(format!("{effect:?}"), "Effect::None");
    }

    #[tokio::test]
    async fn future_effect_resolves_to_action() {
        let effect = Effect::future(async { Some(7_u8) });
        assert!(!effect.is_none());

        let Effect::Future(fut) = effect else {
            unreachable!("constructed as a future")
        };
        assert_eq!(fut.await, Some(7));
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
