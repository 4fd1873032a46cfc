//! State of one booking flow.

use crate::aggregator::CommitReport;
use crate::catalog::SlotCatalog;
use crate::error::{QueryError, ValidationError};
use crate::pricing::total_price;
use crate::query::FlowQuery;
use crate::selection::{Selection, SelectionMode};
use crate::types::{Money, Session, SlotId};
use std::fmt;
use std::str::FromStr;

/// Step of the booking flow
///
/// `Select -> Confirm -> Complete`. `Complete` is terminal until the flow is
/// finished and reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowStep {
    /// Choosing slots
    #[default]
    Select,
    /// Reviewing the selection and price before committing
    Confirm,
    /// At least one reservation went through
    Complete,
}

impl FlowStep {
    /// Query-parameter value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Confirm => "confirm",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowStep {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(Self::Select),
            "confirm" => Ok(Self::Confirm),
            "complete" => Ok(Self::Complete),
            other => Err(QueryError::UnknownStep(other.to_string())),
        }
    }
}

/// Severity of a notice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// Something needs the user's attention but the flow moved on
    Warning,
    /// The last action failed
    Error,
}

/// Message for the user, shown until dismissed or replaced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text
    pub message: String,
}

impl Notice {
    /// Info notice
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Warning notice
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Error notice
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// State of one booking flow
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowState {
    /// Session being booked
    pub session: Session,
    /// Slot snapshot read at flow entry
    pub catalog: SlotCatalog,
    /// Selection mode, fixed at flow entry
    pub mode: SelectionMode,
    /// Current step
    pub step: FlowStep,
    /// Chosen slots
    pub selection: Selection,
    /// A commit is in flight
    pub is_committing: bool,
    /// Id of the latest commit attempt
    pub attempt: u64,
    /// Report of the latest settled commit
    pub last_report: Option<CommitReport>,
    /// Current notice
    pub notice: Option<Notice>,
    /// Revision of the last mirrored query; bumped by every navigation
    pub revision: u64,
}

impl FlowState {
    /// Fresh flow at `Select` with nothing chosen
    #[must_use]
    pub fn new(session: Session, catalog: SlotCatalog) -> Self {
        let mode = SelectionMode::for_session(&session, &catalog);
        Self {
            session,
            catalog,
            mode,
            step: FlowStep::Select,
            selection: Selection::new(),
            is_committing: false,
            attempt: 0,
            last_report: None,
            notice: None,
            revision: 0,
        }
    }

    /// Price of the current selection
    #[must_use]
    pub fn total_price(&self) -> Money {
        total_price(self.mode, &self.session, &self.catalog, &self.selection)
    }

    /// Query parameters mirroring step and selection
    #[must_use]
    pub fn query(&self) -> FlowQuery {
        FlowQuery::new(self.step, self.selection.clone())
    }

    /// Whether the slot can be added to the selection
    #[must_use]
    pub fn is_selectable(&self, slot_id: &SlotId) -> bool {
        self.catalog.is_selectable(slot_id)
    }

    /// Guard for `Select -> Confirm`
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] to show when the selection is not
    /// enough to continue.
    pub fn check_proceed(&self) -> Result<(), ValidationError> {
        match self.mode {
            SelectionMode::Unslotted => Ok(()),
            SelectionMode::Single if self.selection.len() == 1 => Ok(()),
            SelectionMode::Single => Err(ValidationError::NoSlotChosen),
            SelectionMode::Multiple if self.selection.is_empty() => {
                Err(ValidationError::EmptySelection)
            },
            SelectionMode::Multiple => Ok(()),
        }
    }
}
