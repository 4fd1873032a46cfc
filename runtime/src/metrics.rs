//! Metric names recorded by the Store.
//!
//! The Store records through the `metrics` facade only. Nothing is exported
//! unless the host installs a recorder; without one every call is a no-op.
//!
//! ## Counters
//! - `store.commands.total` - actions sent into a store
//! - `store.effects.executed{type}` - effects started, by variant
//! - `store.feedback.total` - actions produced by effects and fed back
//! - `store.shutdown.rejected_actions` - actions refused during shutdown
//!
//! ## Histograms
//! - `store.reducer.duration_seconds` - time spent inside `Reducer::reduce`

use metrics::{describe_counter, describe_histogram};

/// Counter: actions sent into a store
pub const COMMANDS_TOTAL: &str = "store.commands.total";
/// Counter: effects started, labelled by `type`
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";
/// Counter: actions produced by effects
pub const FEEDBACK_TOTAL: &str = "store.feedback.total";
/// Counter: actions refused because the store is shutting down
pub const SHUTDOWN_REJECTED: &str = "store.shutdown.rejected_actions";
/// Histogram: reducer execution time
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";

/// Register descriptions for every Store metric.
///
/// Call once at startup, after installing a recorder.
pub fn register_store_metrics() {
    describe_counter!(COMMANDS_TOTAL, "Total number of actions sent into a store");
    describe_counter!(EFFECTS_EXECUTED, "Effects started by the store, by variant");
    describe_counter!(FEEDBACK_TOTAL, "Actions produced by effects and fed back to the reducer");
    describe_counter!(SHUTDOWN_REJECTED, "Actions rejected because the store was shutting down");
    describe_histogram!(REDUCER_DURATION, "Time spent executing the reducer");

    tracing::debug!("Store metrics registered");
}
