//! Error types for the booking flow and its collaborators.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a reservation was refused.
///
/// The step machine does not branch on the kind; it is carried through to
/// the commit report so the presentation layer can phrase the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The slot or session filled before this request was processed
    CapacityExceeded,
    /// Anything else: ledger unreachable, timeout, server error
    Unexpected,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded => write!(f, "CapacityExceeded"),
            Self::Unexpected => write!(f, "Unexpected"),
        }
    }
}

/// Failure returned by the capacity ledger for one reservation
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ReservationError {
    /// No capacity left
    #[error("{message}")]
    CapacityExceeded {
        /// Human-readable reason
        message: String,
    },

    /// Any other failure
    #[error("{message}")]
    Unexpected {
        /// Human-readable reason
        message: String,
    },
}

impl ReservationError {
    /// Capacity error with the default message
    #[must_use]
    pub fn capacity_exceeded() -> Self {
        Self::CapacityExceeded {
            message: "This slot is already full".to_string(),
        }
    }

    /// Unexpected error with the given message
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Failure kind
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::CapacityExceeded { .. } => FailureKind::CapacityExceeded,
            Self::Unexpected { .. } => FailureKind::Unexpected,
        }
    }

    /// Human-readable reason
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::CapacityExceeded { message } | Self::Unexpected { message } => message,
        }
    }
}

/// Failure loading the slot catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport-level failure
    #[error("Failed to reach slot catalog: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Slot catalog returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The same slot id appears twice in the catalog
    #[error("Duplicate slot id {0} in catalog")]
    DuplicateSlot(crate::types::SlotId),
}

/// Failure decoding flow query parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// `step` is not one of `select`, `confirm`, `complete`
    #[error("Unknown step '{0}'")]
    UnknownStep(String),

    /// A slot id is not a valid identifier
    #[error("Invalid slot id '{0}'")]
    InvalidSlotId(String),
}

/// Selection that cannot move on to confirmation
///
/// Raised locally by the `Proceed` guard; no network call is made.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Single-slot session without a chosen slot
    #[error("Choose a slot to continue")]
    NoSlotChosen,

    /// Multiple-slot session with an empty selection
    #[error("Choose at least one slot to continue")]
    EmptySelection,
}

impl ValidationError {
    /// Short label for metrics and logs
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NoSlotChosen => "no_slot_chosen",
            Self::EmptySelection => "empty_selection",
        }
    }
}

/// Invalid configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The ledger base URL is empty
    #[error("BOOKING_LEDGER_URL must not be empty")]
    MissingLedgerUrl,

    /// The ledger timeout is zero
    #[error("BOOKING_LEDGER_TIMEOUT_MS must be greater than zero")]
    ZeroTimeout,

    /// Unknown commit dispatch strategy
    #[error("Unknown commit dispatch '{0}' (expected 'sequential' or 'parallel')")]
    UnknownDispatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_error_kind_and_message() {
        let full = ReservationError::capacity_exceeded();
        assert_eq!(full.kind(), FailureKind::CapacityExceeded);
        assert_eq!(full.message(), "This slot is already full");
        assert_eq!(full.to_string(), "This slot is already full");

        let down = ReservationError::unexpected("ledger unreachable");
        assert_eq!(down.kind(), FailureKind::Unexpected);
        assert_eq!(down.message(), "ledger unreachable");
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::EmptySelection.to_string(),
            "Choose at least one slot to continue"
        );
        assert_eq!(ValidationError::NoSlotChosen.reason(), "no_slot_chosen");
    }
}
