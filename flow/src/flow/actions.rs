//! Inputs of the booking flow.

use crate::aggregator::BookingOutcome;
use crate::types::SlotId;

/// Actions for the booking flow
///
/// User intents plus the feedback produced by the commit effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingFlowAction {
    /// Rebuild step and selection from the page query (mount, reload,
    /// back/forward)
    Hydrate {
        /// Raw query string, with or without the leading `?`
        query: String,
    },

    /// Pick a slot (radio control)
    ///
    /// The flow's mode decides the effect: single mode replaces any previous
    /// choice, multiple mode toggles the slot like [`Self::ToggleSlot`].
    ChooseSlot {
        /// Slot to pick
        slot_id: SlotId,
    },

    /// Flip a slot in or out of the selection (checkbox control)
    ///
    /// In multiple mode the slot is added if absent and removed if present;
    /// single mode treats it like [`Self::ChooseSlot`].
    ToggleSlot {
        /// Slot to toggle
        slot_id: SlotId,
    },

    /// Empty the selection
    ClearSelection,

    /// Move from selection to confirmation
    Proceed,

    /// Return from confirmation to selection, keeping the selection
    Back,

    /// Issue the reservations for the current selection
    Commit,

    /// Every reservation of a commit attempt has answered
    CommitSettled {
        /// Attempt the outcomes belong to
        attempt: u64,
        /// Outcomes in selection order
        outcomes: Vec<BookingOutcome>,
    },

    /// Leave a completed flow and start over
    Finish,

    /// Clear the current notice
    DismissNotice,
}
