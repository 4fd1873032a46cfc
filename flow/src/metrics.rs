//! Booking flow metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.
//!
//! ## Counters
//! - `booking_flow_transitions_refused_total{reason}` - guarded transitions refused
//! - `booking_flow_intents_ignored_total{reason}` - selection intents dropped
//! - `booking_flow_commits_total{result}` - commits by `success`, `partial`, `failed`
//! - `booking_flow_reservations_total{outcome}` - reservations by `success` or failure kind
//!
//! ## Histograms
//! - `booking_flow_commit_duration_seconds` - wall time of one commit effect

use crate::aggregator::{BookingOutcome, CommitReport};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Counter: guarded transitions refused, labelled by `reason`
pub const TRANSITIONS_REFUSED: &str = "booking_flow_transitions_refused_total";
/// Counter: selection intents ignored, labelled by `reason`
pub const INTENTS_IGNORED: &str = "booking_flow_intents_ignored_total";
/// Counter: settled commits, labelled by `result`
pub const COMMITS_TOTAL: &str = "booking_flow_commits_total";
/// Counter: individual reservations, labelled by `outcome`
pub const RESERVATIONS_TOTAL: &str = "booking_flow_reservations_total";
/// Histogram: commit effect duration
pub const COMMIT_DURATION: &str = "booking_flow_commit_duration_seconds";

/// Register descriptions for every booking flow metric.
pub fn register_booking_metrics() {
    describe_counter!(TRANSITIONS_REFUSED, "Step transitions refused by a guard");
    describe_counter!(INTENTS_IGNORED, "Selection intents ignored by the step machine");
    describe_counter!(COMMITS_TOTAL, "Settled commits by result");
    describe_counter!(RESERVATIONS_TOTAL, "Reservation calls by outcome");
    describe_histogram!(COMMIT_DURATION, "Time spent executing one commit");

    tracing::debug!("Booking flow metrics registered");
}

pub(crate) fn record_refused(reason: &'static str) {
    counter!(TRANSITIONS_REFUSED, "reason" => reason).increment(1);
}

pub(crate) fn record_ignored(reason: &'static str) {
    counter!(INTENTS_IGNORED, "reason" => reason).increment(1);
}

pub(crate) fn record_outcome(outcome: &BookingOutcome) {
    let label = match &outcome.failure {
        None => "success",
        Some(err) => match err.kind() {
            crate::error::FailureKind::CapacityExceeded => "capacity_exceeded",
            crate::error::FailureKind::Unexpected => "unexpected",
        },
    };
    counter!(RESERVATIONS_TOTAL, "outcome" => label).increment(1);
}

pub(crate) fn record_commit_result(report: &CommitReport) {
    let result = if report.is_total_failure() {
        "failed"
    } else if report.is_partial() {
        "partial"
    } else {
        "success"
    };
    counter!(COMMITS_TOTAL, "result" => result).increment(1);
}

pub(crate) fn record_commit_duration(elapsed: Duration) {
    histogram!(COMMIT_DURATION).record(elapsed.as_secs_f64());
}
