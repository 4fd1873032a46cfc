//! # Photo Booking Testing
//!
//! Test support for reducers written against `photo-booking-core`:
//!
//! - [`ReducerTest`]: Given-When-Then harness that runs a reducer without a runtime
//! - [`FixedClock`]: deterministic time
//! - [`assertions`]: effect assertions
//!
//! ## Example
//!
//! ```ignore
//! use photo_booking_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(BookingFlowReducer::new())
//!     .with_env(env)
//!     .given_state(state)
//!     .when_action(BookingFlowAction::Proceed)
//!     .then_state(|s| assert_eq!(s.step, FlowStep::Confirm))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use photo_booking_core::environment::Clock;

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Clock frozen at one instant
    ///
    /// ```
    /// use photo_booking_testing::mocks::FixedClock;
    /// use photo_booking_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Seconds since the epoch of [`test_clock`]'s instant (2026-03-01 01:00:00 UTC)
    pub const TEST_EPOCH_SECONDS: i64 = 1_772_326_800;

    /// Default fixed clock for tests, pinned to 2026-03-01 01:00:00 UTC
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::from_timestamp(TEST_EPOCH_SECONDS, 0).unwrap_or_default())
    }
}

pub use mocks::{FixedClock, test_clock};
