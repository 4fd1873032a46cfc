//! Total price of a selection.

use crate::catalog::SlotCatalog;
use crate::selection::{Selection, SelectionMode};
use crate::types::{Money, Session};

/// Price the user will pay for the current selection.
///
/// - unslotted: the session's flat price
/// - single: the chosen slot's price, zero if nothing is chosen
/// - multiple: sum over chosen slots
///
/// Ids missing from the catalog contribute nothing. An empty slotted
/// selection totals exactly zero.
#[must_use]
pub fn total_price(
    mode: SelectionMode,
    session: &Session,
    catalog: &SlotCatalog,
    selection: &Selection,
) -> Money {
    match mode {
        SelectionMode::Unslotted => session.price_per_person,
        SelectionMode::Single => selection
            .single()
            .and_then(|id| catalog.get(&id))
            .map_or(Money::ZERO, |slot| slot.price_per_person),
        SelectionMode::Multiple => selection
            .ids()
            .iter()
            .filter_map(|id| catalog.get(id))
            .map(|slot| slot.price_per_person)
            .sum(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{session, slot};
    use crate::types::{CapacityMode, SlotId};

    #[test]
    fn test_multiple_sums_selected_slots() {
        let slots = vec![slot(1, 1000, 2, 0), slot(2, 0, 2, 0), slot(3, 2500, 2, 0)];
        let ids: Vec<SlotId> = slots.iter().map(|s| s.id).collect();
        let catalog = SlotCatalog::new(slots).unwrap();
        let session = session(CapacityMode::Slotted, true, 9999);

        let selection = Selection::from_ids(ids);
        let total = total_price(SelectionMode::Multiple, &session, &catalog, &selection);
        assert_eq!(total, Money::from_yen(3500));

        let empty = total_price(SelectionMode::Multiple, &session, &catalog, &Selection::new());
        assert_eq!(empty, Money::ZERO);
    }

    #[test]
    fn test_single_uses_chosen_slot() {
        let cheap = slot(1, 1000, 2, 0);
        let dear = slot(2, 4000, 2, 0);
        let catalog = SlotCatalog::new(vec![cheap, dear.clone()]).unwrap();
        let session = session(CapacityMode::Slotted, false, 9999);

        let mut selection = Selection::new();
        assert_eq!(
            total_price(SelectionMode::Single, &session, &catalog, &selection),
            Money::ZERO
        );

        selection.choose(dear.id);
        assert_eq!(
            total_price(SelectionMode::Single, &session, &catalog, &selection),
            Money::from_yen(4000)
        );
    }

    #[test]
    fn test_unslotted_uses_session_price() {
        let session = session(CapacityMode::Single, false, 5500);
        let total = total_price(
            SelectionMode::Unslotted,
            &session,
            &SlotCatalog::empty(),
            &Selection::new(),
        );
        assert_eq!(total, Money::from_yen(5500));
    }

    #[test]
    fn test_free_selection_is_zero_not_sentinel() {
        let free = slot(1, 0, 2, 0);
        let catalog = SlotCatalog::new(vec![free.clone()]).unwrap();
        let session = session(CapacityMode::Slotted, true, 0);

        let total = total_price(
            SelectionMode::Multiple,
            &session,
            &catalog,
            &Selection::from_ids([free.id]),
        );
        assert_eq!(total.yen(), 0);
        assert_eq!(total.label(), "Free");
    }
}
