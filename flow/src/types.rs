//! Domain types for photo-session booking.
//!
//! Sessions and slots are snapshots read from the hosted backend when the
//! flow is entered. They are immutable for the lifetime of a flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing `Uuid`
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a photo session
    SessionId
);

uuid_id!(
    /// Unique identifier for a slot within a session
    SlotId
);

uuid_id!(
    /// Unique identifier for the participant making a booking
    UserId
);

// ============================================================================
// Money
// ============================================================================

/// Price in yen. Zero means the session or slot is free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// No charge
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from yen
    #[must_use]
    pub const fn from_yen(yen: u64) -> Self {
        Self(yen)
    }

    /// Amount in yen
    #[must_use]
    pub const fn yen(&self) -> u64 {
        self.0
    }

    /// True when nothing is charged
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, saturating at `u64::MAX`
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Label shown next to a price: "Free" for zero, otherwise the amount
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_free() {
            "Free".to_string()
        } else {
            self.to_string()
        }
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "¥{grouped}")
    }
}

// ============================================================================
// Session & Slot
// ============================================================================

/// Start and end of a session or slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// When it starts
    pub start_time: DateTime<Utc>,
    /// When it ends
    pub end_time: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new time range
    #[must_use]
    pub const fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time,
        }
    }
}

/// How a session's capacity is divided
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    /// The session itself is the bookable unit
    Single,
    /// The session is divided into slots
    Slotted,
}

/// A bookable photo session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session ID
    pub id: SessionId,
    /// Display title
    pub title: String,
    /// When the session runs
    #[serde(flatten)]
    pub time: TimeRange,
    /// Where it takes place
    pub location: String,
    /// Flat price, used when the session is booked without slots
    pub price_per_person: Money,
    /// Whether capacity is split into slots
    pub capacity_mode: CapacityMode,
    /// Whether one participant may book several slots at once
    pub allow_multiple_bookings: bool,
}

/// A capacity-bounded sub-unit of a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot ID
    pub id: SlotId,
    /// Position within the session (1-based)
    pub slot_number: u32,
    /// When the slot runs
    #[serde(flatten)]
    pub time: TimeRange,
    /// Capacity
    pub max_participants: u32,
    /// Participants already booked when the snapshot was read
    pub current_participants: u32,
    /// Price for one participant
    pub price_per_person: Money,
}

impl Slot {
    /// Whether the snapshot shows no room left
    ///
    /// Also true when the snapshot is over capacity, which the ledger should
    /// never allow but the flow must not trust.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current_participants >= self.max_participants
    }

    /// Places left according to the snapshot. Advisory only: the ledger is
    /// the authority and may disagree at commit time.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.max_participants.saturating_sub(self.current_participants)
    }
}
