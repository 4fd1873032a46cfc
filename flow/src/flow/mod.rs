//! Booking step machine: `select -> confirm -> complete`.
//!
//! The reducer owns the flow's step, selection and commit bookkeeping. It
//! performs no I/O: reservations go through a commit effect that feeds
//! [`BookingFlowAction::CommitSettled`] back, and every step or selection
//! change emits a navigation effect mirroring the [`FlowQuery`] into the
//! [`Navigator`].
//!
//! Transitions:
//!
//! | From | Action | To | Guard |
//! |---|---|---|---|
//! | `Select` | `Proceed` | `Confirm` | single: one slot, multiple: at least one |
//! | `Confirm` | `Back` | `Select` | not committing |
//! | `Confirm` | `Commit` then `CommitSettled` | `Complete` | at least one success |
//! | `Complete` | `Finish` | `Select` | |
//!
//! A commit with no success stays in `Confirm` so the user can retry or go
//! back.
//!
//! [`FlowQuery`]: crate::query::FlowQuery
//! [`Navigator`]: crate::navigator::Navigator

mod actions;
mod environment;
mod reducer;
mod state;


pub use actions::BookingFlowAction;
pub use environment::BookingFlowEnvironment;
pub use reducer::BookingFlowReducer;
pub use state::{FlowState, FlowStep, Notice, NoticeLevel};
