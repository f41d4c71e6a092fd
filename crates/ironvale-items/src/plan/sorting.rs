//! Stack merging and inventory sorting.

use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

use ironvale_types::{ItemCategory, ItemDef, SlotRecord, SortOrder};

/// Combine split stacks of each stackable kind into as few full stacks as
/// possible, packed into the kind's earliest occupied slots. Non-stackable
/// records are untouched. Total quantities are preserved.
pub fn merge_stacks(inventory: &mut BTreeMap<u16, SlotRecord>) {
    let kinds: Vec<_> = {
        let mut seen = Vec::new();
        for record in inventory.values() {
            if record.item.max_stack() > 1 && !seen.contains(&record.item) {
                seen.push(record.item);
            }
        }
        seen
    };

    for kind in kinds {
        let slots: Vec<u16> = inventory
            .iter()
            .filter(|(_, record)| record.item == kind)
            .map(|(slot, _)| *slot)
            .collect();
        if slots.len() < 2 {
            continue;
        }
        let mut total = slots
            .iter()
            .filter_map(|slot| inventory.get(slot))
            .fold(0_u32, |sum, record| sum.saturating_add(record.quantity));
        let max_stack = kind.max_stack();
        for slot in slots {
            if total == 0 {
                inventory.remove(&slot);
                continue;
            }
            let take = total.min(max_stack);
            inventory.insert(slot, SlotRecord::new(kind, take));
            total = total.saturating_sub(take);
        }
    }
}

/// Merge stacks, then rewrite the inventory in `order`, compacted into
/// slots `0..n`.
///
/// Re-keying goes through staging indices at `max_slots` and above so that
/// no live slot index is ever held by two records mid-rewrite, even if a
/// snapshot of the map escapes between the phases.
pub fn sort(inventory: &mut BTreeMap<u16, SlotRecord>, order: SortOrder, max_slots: u16) {
    merge_stacks(inventory);

    // Phase one: park every record above the live slot range.
    let keys: Vec<u16> = inventory.keys().copied().collect();
    for (offset, key) in keys.into_iter().enumerate() {
        if let Some(record) = inventory.remove(&key) {
            let staged = max_slots.saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
            inventory.insert(staged, record);
        }
    }

    // Phase two: drain the staging range in the requested order back into
    // slots from zero.
    let mut records: Vec<SlotRecord> = std::mem::take(inventory).into_values().collect();
    records.sort_by(|a, b| compare(order, a, b));
    for (index, record) in records.into_iter().enumerate() {
        inventory.insert(u16::try_from(index).unwrap_or(u16::MAX), record);
    }
}

fn compare(order: SortOrder, a: &SlotRecord, b: &SlotRecord) -> Ordering {
    let (da, db) = (a.item.def(), b.item.def());
    match order {
        SortOrder::Category => category_key(da).cmp(&category_key(db)),
        SortOrder::Rarity => (Reverse(da.rarity.rank()), da.name).cmp(&(Reverse(db.rarity.rank()), db.name)),
        SortOrder::Value => {
            (Reverse(da.value), Reverse(da.rarity.rank()), da.name)
                .cmp(&(Reverse(db.value), Reverse(db.rarity.rank()), db.name))
        }
        SortOrder::Name => {
            (da.name, Reverse(da.rarity.rank())).cmp(&(db.name, Reverse(db.rarity.rank())))
        }
        SortOrder::Equipment => {
            let slot_rank = |def: &ItemDef| def.slot.map_or(u8::MAX, |slot| slot.ordinal());
            (slot_rank(da), Reverse(da.rarity.rank()), da.name)
                .cmp(&(slot_rank(db), Reverse(db.rarity.rank()), db.name))
        }
    }
}

const fn category_key(def: &ItemDef) -> (ItemCategory, Reverse<u8>, &'static str) {
    (def.category, Reverse(def.rarity.rank()), def.name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::stacking;
    use ironvale_types::ItemKind;

    const MAX_SLOTS: u16 = 28;

    #[test]
    fn merge_combines_split_stacks() {
        let mut inventory: BTreeMap<u16, SlotRecord> = [
            (0, SlotRecord::new(ItemKind::CopperOre, 20)),
            (3, SlotRecord::new(ItemKind::CopperOre, 30)),
            (7, SlotRecord::new(ItemKind::CopperOre, 40)),
        ]
        .into_iter()
        .collect();
        merge_stacks(&mut inventory);
        assert_eq!(inventory.get(&0).map(|r| r.quantity), Some(64));
        assert_eq!(inventory.get(&3).map(|r| r.quantity), Some(26));
        assert!(!inventory.contains_key(&7));
        assert_eq!(stacking::count(&inventory, ItemKind::CopperOre), 90);
    }

    #[test]
    fn merge_leaves_gear_alone() {
        let mut inventory: BTreeMap<u16, SlotRecord> = [
            (0, SlotRecord::new(ItemKind::BronzeSword, 1)),
            (1, SlotRecord::new(ItemKind::BronzeSword, 1)),
        ]
        .into_iter()
        .collect();
        merge_stacks(&mut inventory);
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn sort_by_category_compacts_from_zero() {
        let mut inventory: BTreeMap<u16, SlotRecord> = [
            (5, SlotRecord::new(ItemKind::CopperOre, 10)),
            (12, SlotRecord::new(ItemKind::BronzeSword, 1)),
            (20, SlotRecord::new(ItemKind::BronzeHelmet, 1)),
        ]
        .into_iter()
        .collect();
        sort(&mut inventory, SortOrder::Category, MAX_SLOTS);
        // Weapon < Armor < Material in category order.
        assert_eq!(inventory.get(&0).map(|r| r.item), Some(ItemKind::BronzeSword));
        assert_eq!(inventory.get(&1).map(|r| r.item), Some(ItemKind::BronzeHelmet));
        assert_eq!(inventory.get(&2).map(|r| r.item), Some(ItemKind::CopperOre));
        assert_eq!(inventory.len(), 3);
    }

    #[test]
    fn sort_by_value_is_descending() {
        let mut inventory: BTreeMap<u16, SlotRecord> = [
            (0, SlotRecord::new(ItemKind::Logs, 3)),
            (1, SlotRecord::new(ItemKind::Zweihander, 1)),
            (2, SlotRecord::new(ItemKind::BronzeBar, 5)),
        ]
        .into_iter()
        .collect();
        sort(&mut inventory, SortOrder::Value, MAX_SLOTS);
        assert_eq!(inventory.get(&0).map(|r| r.item), Some(ItemKind::Zweihander));
        let values: Vec<u32> = inventory.values().map(|r| r.item.def().value).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(values, sorted);
    }

    #[test]
    fn sort_merges_before_ordering() {
        let mut inventory: BTreeMap<u16, SlotRecord> = [
            (2, SlotRecord::new(ItemKind::BronzeArrow, 100)),
            (9, SlotRecord::new(ItemKind::BronzeArrow, 50)),
            (15, SlotRecord::new(ItemKind::CookedTrout, 3)),
        ]
        .into_iter()
        .collect();
        sort(&mut inventory, SortOrder::Name, MAX_SLOTS);
        assert_eq!(inventory.len(), 2);
        assert_eq!(stacking::count(&inventory, ItemKind::BronzeArrow), 150);
    }

    #[test]
    fn equipment_order_puts_gear_in_slot_order_first() {
        let mut inventory: BTreeMap<u16, SlotRecord> = [
            (0, SlotRecord::new(ItemKind::CopperOre, 10)),
            (1, SlotRecord::new(ItemKind::LeatherBoots, 1)),
            (2, SlotRecord::new(ItemKind::BronzeHelmet, 1)),
        ]
        .into_iter()
        .collect();
        sort(&mut inventory, SortOrder::Equipment, MAX_SLOTS);
        assert_eq!(inventory.get(&0).map(|r| r.item), Some(ItemKind::BronzeHelmet));
        assert_eq!(inventory.get(&2).map(|r| r.item), Some(ItemKind::CopperOre));
    }

    #[test]
    fn equipment_order_breaks_slot_ties_by_rarity_then_name() {
        // Three weapon-slot items: the rare Zweihander leads, then the two
        // common weapons alphabetically.
        let mut inventory: BTreeMap<u16, SlotRecord> = [
            (0, SlotRecord::new(ItemKind::Shortbow, 1)),
            (1, SlotRecord::new(ItemKind::Zweihander, 1)),
            (2, SlotRecord::new(ItemKind::BronzeSword, 1)),
        ]
        .into_iter()
        .collect();
        sort(&mut inventory, SortOrder::Equipment, MAX_SLOTS);
        assert_eq!(inventory.get(&0).map(|r| r.item), Some(ItemKind::Zweihander));
        assert_eq!(inventory.get(&1).map(|r| r.item), Some(ItemKind::BronzeSword));
        assert_eq!(inventory.get(&2).map(|r| r.item), Some(ItemKind::Shortbow));
    }

    #[test]
    fn sort_preserves_totals() {
        let mut inventory: BTreeMap<u16, SlotRecord> = [
            (4, SlotRecord::new(ItemKind::GoldCoin, 1200)),
            (8, SlotRecord::new(ItemKind::GoldCoin, 300)),
            (11, SlotRecord::new(ItemKind::HealthPotion, 2)),
        ]
        .into_iter()
        .collect();
        sort(&mut inventory, SortOrder::Rarity, MAX_SLOTS);
        assert_eq!(stacking::count(&inventory, ItemKind::GoldCoin), 1500);
        assert_eq!(stacking::count(&inventory, ItemKind::HealthPotion), 2);
    }
}
