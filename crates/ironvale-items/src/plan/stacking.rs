//! Stack-aware placement into a slot-indexed inventory.
//!
//! Placement is a pure computation over a snapshot: callers mutate a clone,
//! inspect the [`Placement`], and only then write the container back. A
//! plan that reports overflow never half-applies.

use std::collections::BTreeMap;

use ironvale_types::{ItemKind, SlotRecord};

/// Result of placing a quantity of one item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// First slot that received units, if any did.
    pub first_slot: Option<u16>,
    /// Units absorbed by the inventory.
    pub placed: u32,
    /// Units that did not fit.
    pub overflow: u32,
}

impl Placement {
    const fn nothing(quantity: u32) -> Self {
        Self {
            first_slot: None,
            placed: 0,
            overflow: quantity,
        }
    }
}

/// Slots `0..max_slots` not currently occupied, in index order.
pub fn empty_slots(inventory: &BTreeMap<u16, SlotRecord>, max_slots: u16) -> Vec<u16> {
    (0..max_slots)
        .filter(|slot| !inventory.contains_key(slot))
        .collect()
}

/// Place `quantity` units of `item` into `inventory`, topping up existing
/// stacks of the same kind first and then opening new slots in index order.
///
/// `durability` is carried onto newly opened slots; stackable kinds never
/// carry durability so top-ups ignore it. Units that fit nowhere are
/// reported as overflow and the inventory is left holding everything that
/// did fit.
pub fn place(
    inventory: &mut BTreeMap<u16, SlotRecord>,
    max_slots: u16,
    item: ItemKind,
    quantity: u32,
    durability: Option<u32>,
) -> Placement {
    if quantity == 0 {
        return Placement::nothing(0);
    }
    let max_stack = item.max_stack();
    let mut remaining = quantity;
    let mut first_slot: Option<u16> = None;

    if max_stack > 1 {
        // Top up existing stacks in slot order before opening new ones.
        for (slot, record) in inventory.iter_mut() {
            if record.item != item || record.quantity >= max_stack {
                continue;
            }
            let room = max_stack.saturating_sub(record.quantity);
            let take = remaining.min(room);
            record.quantity = record.quantity.saturating_add(take);
            remaining = remaining.saturating_sub(take);
            if take > 0 && first_slot.is_none() {
                first_slot = Some(*slot);
            }
            if remaining == 0 {
                break;
            }
        }
    }

    if remaining > 0 {
        for slot in empty_slots(inventory, max_slots) {
            let take = remaining.min(max_stack);
            inventory.insert(
                slot,
                SlotRecord {
                    item,
                    quantity: take,
                    durability,
                },
            );
            remaining = remaining.saturating_sub(take);
            if first_slot.is_none() {
                first_slot = Some(slot);
            }
            if remaining == 0 {
                break;
            }
        }
    }

    Placement {
        first_slot,
        placed: quantity.saturating_sub(remaining),
        overflow: remaining,
    }
}

/// Remove up to `quantity` units from `slot`, clearing the slot when it
/// empties. Returns the units actually removed (zero for a vacant slot).
pub fn remove(inventory: &mut BTreeMap<u16, SlotRecord>, slot: u16, quantity: u32) -> u32 {
    let Some(record) = inventory.get_mut(&slot) else {
        return 0;
    };
    let take = record.quantity.min(quantity);
    record.quantity = record.quantity.saturating_sub(take);
    if record.quantity == 0 {
        inventory.remove(&slot);
    }
    take
}

/// Total units of `item` across all slots.
pub fn count(inventory: &BTreeMap<u16, SlotRecord>, item: ItemKind) -> u32 {
    inventory
        .values()
        .filter(|record| record.item == item)
        .fold(0_u32, |total, record| total.saturating_add(record.quantity))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_SLOTS: u16 = 28;

    fn inv(slots: &[(u16, ItemKind, u32)]) -> BTreeMap<u16, SlotRecord> {
        slots
            .iter()
            .map(|&(slot, item, quantity)| (slot, SlotRecord::new(item, quantity)))
            .collect()
    }

    #[test]
    fn tops_up_before_opening_new_slots() {
        let mut inventory = inv(&[(3, ItemKind::CopperOre, 60)]);
        let placement = place(&mut inventory, MAX_SLOTS, ItemKind::CopperOre, 10, None);
        assert_eq!(placement.first_slot, Some(3));
        assert_eq!(placement.placed, 10);
        assert_eq!(placement.overflow, 0);
        assert_eq!(inventory.get(&3).map(|r| r.quantity), Some(64));
        assert_eq!(inventory.get(&0).map(|r| r.quantity), Some(6));
    }

    #[test]
    fn non_stackables_take_one_slot_each() {
        let mut inventory = inv(&[(0, ItemKind::Logs, 5)]);
        let placement = place(
            &mut inventory,
            MAX_SLOTS,
            ItemKind::BronzeSword,
            2,
            Some(250),
        );
        assert_eq!(placement.first_slot, Some(1));
        assert_eq!(placement.placed, 2);
        assert_eq!(inventory.get(&1).map(|r| r.quantity), Some(1));
        assert_eq!(inventory.get(&2).map(|r| r.quantity), Some(1));
        assert_eq!(inventory.get(&1).and_then(|r| r.durability), Some(250));
    }

    #[test]
    fn overflow_reported_when_full() {
        let mut inventory: BTreeMap<u16, SlotRecord> = (0..MAX_SLOTS)
            .map(|slot| (slot, SlotRecord::new(ItemKind::BronzeSword, 1)))
            .collect();
        let placement = place(&mut inventory, MAX_SLOTS, ItemKind::CopperOre, 10, None);
        assert_eq!(placement.first_slot, None);
        assert_eq!(placement.placed, 0);
        assert_eq!(placement.overflow, 10);
    }

    #[test]
    fn partial_placement_keeps_what_fit() {
        // 27 full slots of swords, one empty slot; 100 ore fits 64.
        let mut inventory: BTreeMap<u16, SlotRecord> = (0..27_u16)
            .map(|slot| (slot, SlotRecord::new(ItemKind::BronzeSword, 1)))
            .collect();
        let placement = place(&mut inventory, MAX_SLOTS, ItemKind::CopperOre, 100, None);
        assert_eq!(placement.placed, 64);
        assert_eq!(placement.overflow, 36);
        assert_eq!(inventory.get(&27).map(|r| r.quantity), Some(64));
    }

    #[test]
    fn ammo_stacks_to_its_large_cap() {
        let mut inventory = inv(&[(0, ItemKind::BronzeArrow, 8000)]);
        let placement = place(&mut inventory, MAX_SLOTS, ItemKind::BronzeArrow, 500, None);
        assert_eq!(placement.placed, 500);
        assert_eq!(inventory.get(&0).map(|r| r.quantity), Some(8192));
        assert_eq!(inventory.get(&1).map(|r| r.quantity), Some(308));
    }

    #[test]
    fn remove_clears_emptied_slots() {
        let mut inventory = inv(&[(4, ItemKind::CopperOre, 10)]);
        assert_eq!(remove(&mut inventory, 4, 10), 10);
        assert!(!inventory.contains_key(&4));
        assert_eq!(remove(&mut inventory, 4, 1), 0);
    }

    #[test]
    fn remove_is_capped_at_slot_quantity() {
        let mut inventory = inv(&[(4, ItemKind::CopperOre, 10)]);
        assert_eq!(remove(&mut inventory, 4, 50), 10);
        assert!(inventory.is_empty());
    }

    #[test]
    fn count_sums_across_slots() {
        let inventory = inv(&[
            (0, ItemKind::CopperOre, 64),
            (5, ItemKind::CopperOre, 12),
            (6, ItemKind::TinOre, 9),
        ]);
        assert_eq!(count(&inventory, ItemKind::CopperOre), 76);
    }
}
