//! Slot catalog: the read-only snapshot of a session's slots.
//!
//! Loaded once by the host before the flow starts and never re-polled.
//! Participant counts in the snapshot may be stale by the time the user
//! commits; a "full" error surfacing only at commit time is expected.

use crate::error::CatalogError;
use crate::types::{SessionId, Slot, SlotId};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

/// Result of a catalog load
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Where slot lists come from
///
/// Implemented by the hosted backend client; tests use a static source.
pub trait SlotCatalogSource: Send + Sync {
    /// Fetch the slots of a session
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or answers with a
    /// failure status.
    fn load_slots(
        &self,
        session_id: SessionId,
    ) -> Pin<Box<dyn Future<Output = CatalogResult<Vec<Slot>>> + Send + '_>>;
}

/// Immutable, slot-number-ordered snapshot of a session's slots.
///
/// An empty catalog means the session itself is the bookable unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotCatalog {
    slots: Vec<Slot>,
}

impl SlotCatalog {
    /// Build a catalog, ordering slots by slot number
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateSlot`] if an id appears twice, since
    /// ids are used as selection keys.
    pub fn new(mut slots: Vec<Slot>) -> CatalogResult<Self> {
        let mut seen = HashSet::with_capacity(slots.len());
        for slot in &slots {
            if !seen.insert(slot.id) {
                return Err(CatalogError::DuplicateSlot(slot.id));
            }
        }
        slots.sort_by_key(|slot| slot.slot_number);
        Ok(Self { slots })
    }

    /// Catalog of a session booked without slots
    #[must_use]
    pub const fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    /// Load and build the catalog for a session
    ///
    /// # Errors
    ///
    /// Propagates source failures and duplicate ids.
    pub async fn load(source: &dyn SlotCatalogSource, session_id: SessionId) -> CatalogResult<Self> {
        let slots = source.load_slots(session_id).await?;
        let catalog = Self::new(slots)?;
        tracing::debug!(
            %session_id,
            slots = catalog.len(),
            full = catalog.slots.iter().filter(|s| s.is_full()).count(),
            "Slot catalog loaded"
        );
        Ok(catalog)
    }

    /// All slots in slot-number order
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Look up a slot by id
    #[must_use]
    pub fn get(&self, id: &SlotId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == *id)
    }

    /// Whether the slot exists and had room when the snapshot was read
    #[must_use]
    pub fn is_selectable(&self, id: &SlotId) -> bool {
        self.get(id).is_some_and(|slot| !slot.is_full())
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the session has no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
