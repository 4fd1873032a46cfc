//! Query-parameter mirror of the flow's step and selection.
//!
//! The page URL is the flow's only durable representation: a reload or a
//! browser back/forward rebuilds the flow from it. Layout:
//!
//! ```text
//! ?step=confirm&slot=<id>              single-slot sessions
//! ?step=confirm&slots=<id>,<id>,<id>   multiple-slot sessions
//! ?step=select                         empty selection: no slot key at all
//! ```
//!
//! `step` defaults to `select` when absent. Unknown keys are ignored so the
//! flow can share the URL with the rest of the page.

use crate::error::QueryError;
use crate::flow::FlowStep;
use crate::selection::{Selection, SelectionMode};
use crate::types::SlotId;

const STEP_KEY: &str = "step";
const SLOT_KEY: &str = "slot";
const SLOTS_KEY: &str = "slots";

/// Decoded query parameters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowQuery {
    /// Step to show
    pub step: FlowStep,
    /// Chosen slots
    pub selection: Selection,
}

impl FlowQuery {
    /// Query for a step and selection
    #[must_use]
    pub const fn new(step: FlowStep, selection: Selection) -> Self {
        Self { step, selection }
    }

    /// Key/value pairs in URL order
    ///
    /// Single mode writes `slot`, multiple mode writes `slots`; unslotted
    /// sessions and empty selections write no slot key.
    #[must_use]
    pub fn to_pairs(&self, mode: SelectionMode) -> Vec<(&'static str, String)> {
        let mut pairs = vec![(STEP_KEY, self.step.as_str().to_string())];

        if self.selection.is_empty() {
            return pairs;
        }
        match mode {
            SelectionMode::Unslotted => {},
            SelectionMode::Single => {
                if let Some(first) = self.selection.ids().first() {
                    pairs.push((SLOT_KEY, first.to_string()));
                }
            },
            SelectionMode::Multiple => {
                let joined = self
                    .selection
                    .ids()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                pairs.push((SLOTS_KEY, joined));
            },
        }
        pairs
    }

    /// Encode as a query string without the leading `?`
    #[must_use]
    pub fn encode(&self, mode: SelectionMode) -> String {
        self.to_pairs(mode)
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Decode key/value pairs
    ///
    /// Both `slot` and `slots` are read regardless of mode; the flow
    /// normalizes against the catalog afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownStep`] for an unrecognised step and
    /// [`QueryError::InvalidSlotId`] for a malformed id.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, QueryError> {
        let mut query = Self::default();
        let mut ids = Vec::new();

        for (key, value) in pairs {
            match key {
                STEP_KEY if !value.is_empty() => query.step = value.parse()?,
                SLOT_KEY | SLOTS_KEY => {
                    for raw in value.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
                        let id = raw
                            .parse::<SlotId>()
                            .map_err(|_| QueryError::InvalidSlotId(raw.to_string()))?;
                        ids.push(id);
                    }
                },
                _ => {},
            }
        }

        query.selection = Selection::from_ids(ids);
        Ok(query)
    }

    /// Decode a query string, with or without the leading `?`
    ///
    /// Percent-encoded commas (`%2C`) in slot lists are accepted.
    ///
    /// # Errors
    ///
    /// Same as [`FlowQuery::from_pairs`].
    pub fn decode(query: &str) -> Result<Self, QueryError> {
        let normalized = query
            .trim_start_matches('?')
            .replace("%2C", ",")
            .replace("%2c", ",");
        let pairs = normalized
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| part.split_once('=').unwrap_or((part, "")));
        Self::from_pairs(pairs)
    }
}
