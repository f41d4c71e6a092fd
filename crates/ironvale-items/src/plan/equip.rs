//! Equip and unequip planning.
//!
//! Planners take container snapshots by reference and return fully rebuilt
//! containers on success. A rejected plan leaves the caller's snapshots
//! untouched, so a failed equip never half-moves gear.

use std::collections::BTreeMap;

use ironvale_types::{
    AMMO_MAX_STACK, EquipSlot, ItemKind, Skill, SkillState, SlotRecord,
};

use crate::error::OpError;
use crate::plan::stacking;

/// A validated equip, ready to write back.
#[derive(Debug, Clone)]
pub struct EquipPlan {
    /// Inventory after the source stack left and displaced gear returned.
    pub inventory: BTreeMap<u16, SlotRecord>,
    /// Equipment after the swap.
    pub equipment: BTreeMap<EquipSlot, SlotRecord>,
    /// Slot the item landed in.
    pub slot: EquipSlot,
    /// Gear pushed back into the inventory to make room.
    pub displaced: Vec<ItemKind>,
    /// Net maximum-HP bonus change from the swap.
    pub health_delta: i32,
}

/// A validated unequip; the engine decides what happens to any remainder.
#[derive(Debug, Clone)]
pub struct UnequipPlan {
    /// Inventory holding everything that fit.
    pub inventory: BTreeMap<u16, SlotRecord>,
    /// Equipment with the slot cleared.
    pub equipment: BTreeMap<EquipSlot, SlotRecord>,
    /// Units moved into the inventory.
    pub moved: u32,
    /// First inventory slot that received units.
    pub first_slot: Option<u16>,
    /// Units that did not fit anywhere.
    pub remainder: Option<SlotRecord>,
    /// Maximum-HP bonus lost if the slot fully empties.
    pub health_lost: i32,
}

/// Plan moving the stack at `inv_slot` onto the player's equipment.
///
/// Rules enforced here: the item must be equippable, any skill gate must be
/// met, and every displaced piece of gear must fit back into the inventory
/// or the whole operation is refused. Ammunition of the same kind merges
/// onto the equipped stack instead of swapping, with overflow staying in
/// the source slot.
pub fn plan_equip(
    inventory: &BTreeMap<u16, SlotRecord>,
    equipment: &BTreeMap<EquipSlot, SlotRecord>,
    inv_slot: u16,
    skills: &BTreeMap<Skill, SkillState>,
    max_slots: u16,
) -> Result<EquipPlan, OpError> {
    let source = *inventory
        .get(&inv_slot)
        .ok_or_else(|| OpError::Validation(format!("inventory slot {inv_slot} is empty")))?;
    let def = source.item.def();
    let slot = def
        .slot
        .ok_or_else(|| OpError::Validation(format!("{} cannot be equipped", def.name)))?;

    if let Some((skill, level)) = def.required_skill {
        let have = skills
            .get(&skill)
            .map_or_else(|| skill.starting_level(), |state| state.level);
        if have < level {
            return Err(OpError::Validation(format!(
                "{} requires {} level {level}",
                def.name,
                skill.as_str()
            )));
        }
    }

    let mut inv = inventory.clone();
    let mut equip = equipment.clone();

    // Ammunition merges onto a matching equipped stack.
    if slot == EquipSlot::Ammo {
        if let Some(worn) = equip.get_mut(&slot) {
            if worn.item == source.item {
                let room = AMMO_MAX_STACK.saturating_sub(worn.quantity);
                let take = source.quantity.min(room);
                worn.quantity = worn.quantity.saturating_add(take);
                let leftover = source.quantity.saturating_sub(take);
                if leftover == 0 {
                    inv.remove(&inv_slot);
                } else {
                    inv.insert(inv_slot, SlotRecord { quantity: leftover, ..source });
                }
                return Ok(EquipPlan {
                    inventory: inv,
                    equipment: equip,
                    slot,
                    displaced: Vec::new(),
                    health_delta: 0,
                });
            }
        }
    }

    let mut displaced_records: Vec<SlotRecord> = Vec::new();
    if let Some(worn) = equip.remove(&slot) {
        displaced_records.push(worn);
    }
    // A two-handed weapon claims the shield slot too, and a shield evicts a
    // wielded two-handed weapon.
    if def.two_handed && slot == EquipSlot::Weapon {
        if let Some(shield) = equip.remove(&EquipSlot::Shield) {
            displaced_records.push(shield);
        }
    }
    if slot == EquipSlot::Shield {
        let wielding_two_handed = equip
            .get(&EquipSlot::Weapon)
            .is_some_and(|worn| worn.item.def().two_handed);
        if wielding_two_handed {
            if let Some(weapon) = equip.remove(&EquipSlot::Weapon) {
                displaced_records.push(weapon);
            }
        }
    }

    inv.remove(&inv_slot);
    let mut displaced = Vec::with_capacity(displaced_records.len());
    let mut health_delta = def.stats.health;
    for record in displaced_records {
        let placement = stacking::place(
            &mut inv,
            max_slots,
            record.item,
            record.quantity,
            record.durability,
        );
        if placement.overflow > 0 {
            return Err(OpError::Capacity(format!(
                "no room to unequip {}",
                record.item.def().name
            )));
        }
        health_delta = health_delta.saturating_sub(record.item.def().stats.health);
        displaced.push(record.item);
    }
    equip.insert(slot, source);

    Ok(EquipPlan {
        inventory: inv,
        equipment: equip,
        slot,
        displaced,
        health_delta,
    })
}

/// Plan removing whatever occupies `slot`, placing as much as fits into the
/// inventory. Units that fit nowhere come back as `remainder` with the slot
/// cleared; the engine either drops them or reinstates them.
pub fn plan_unequip(
    inventory: &BTreeMap<u16, SlotRecord>,
    equipment: &BTreeMap<EquipSlot, SlotRecord>,
    slot: EquipSlot,
    max_slots: u16,
) -> Result<UnequipPlan, OpError> {
    let worn = *equipment
        .get(&slot)
        .ok_or_else(|| OpError::Validation(format!("nothing equipped in {}", slot.as_str())))?;

    let mut inv = inventory.clone();
    let mut equip = equipment.clone();
    equip.remove(&slot);

    let placement = stacking::place(&mut inv, max_slots, worn.item, worn.quantity, worn.durability);
    let remainder = (placement.overflow > 0).then(|| SlotRecord {
        quantity: placement.overflow,
        ..worn
    });

    Ok(UnequipPlan {
        inventory: inv,
        equipment: equip,
        moved: placement.placed,
        first_slot: placement.first_slot,
        remainder,
        health_lost: worn.item.def().stats.health,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MAX_SLOTS: u16 = 28;

    fn skills_with(skill: Skill, level: u32) -> BTreeMap<Skill, SkillState> {
        [(skill, SkillState { level, xp: 0 })].into_iter().collect()
    }

    fn no_skills() -> BTreeMap<Skill, SkillState> {
        BTreeMap::new()
    }

    #[test]
    fn equips_into_an_empty_slot() {
        let inventory = [(0, SlotRecord::new(ItemKind::BronzeHelmet, 1))]
            .into_iter()
            .collect();
        let plan =
            plan_equip(&inventory, &BTreeMap::new(), 0, &no_skills(), MAX_SLOTS).unwrap();
        assert_eq!(plan.slot, EquipSlot::Head);
        assert!(plan.inventory.is_empty());
        assert_eq!(
            plan.equipment.get(&EquipSlot::Head).map(|r| r.item),
            Some(ItemKind::BronzeHelmet)
        );
        assert!(plan.displaced.is_empty());
    }

    #[test]
    fn swaps_the_current_occupant_back_to_inventory() {
        let inventory = [(0, SlotRecord::new(ItemKind::Zweihander, 1))]
            .into_iter()
            .collect();
        let equipment = [(EquipSlot::Weapon, SlotRecord::new(ItemKind::BronzeSword, 1))]
            .into_iter()
            .collect();
        let plan = plan_equip(
            &inventory,
            &equipment,
            0,
            &skills_with(Skill::Attack, 20),
            MAX_SLOTS,
        )
        .unwrap();
        assert_eq!(plan.displaced, vec![ItemKind::BronzeSword]);
        assert_eq!(
            plan.inventory.get(&0).map(|r| r.item),
            Some(ItemKind::BronzeSword)
        );
    }

    #[test]
    fn two_handed_weapon_also_displaces_the_shield() {
        let inventory = [(0, SlotRecord::new(ItemKind::Shortbow, 1))]
            .into_iter()
            .collect();
        let equipment: BTreeMap<_, _> = [
            (EquipSlot::Weapon, SlotRecord::new(ItemKind::BronzeSword, 1)),
            (EquipSlot::Shield, SlotRecord::new(ItemKind::BronzeShield, 1)),
        ]
        .into_iter()
        .collect();
        let plan = plan_equip(&inventory, &equipment, 0, &no_skills(), MAX_SLOTS).unwrap();
        assert_eq!(plan.displaced.len(), 2);
        assert!(!plan.equipment.contains_key(&EquipSlot::Shield));
        assert_eq!(plan.inventory.len(), 2);
    }

    #[test]
    fn shield_evicts_a_wielded_two_handed_weapon() {
        let inventory = [(0, SlotRecord::new(ItemKind::BronzeShield, 1))]
            .into_iter()
            .collect();
        let equipment = [(EquipSlot::Weapon, SlotRecord::new(ItemKind::Shortbow, 1))]
            .into_iter()
            .collect();
        let plan = plan_equip(&inventory, &equipment, 0, &no_skills(), MAX_SLOTS).unwrap();
        assert_eq!(plan.displaced, vec![ItemKind::Shortbow]);
        assert!(!plan.equipment.contains_key(&EquipSlot::Weapon));
        assert_eq!(
            plan.equipment.get(&EquipSlot::Shield).map(|r| r.item),
            Some(ItemKind::BronzeShield)
        );
    }

    #[test]
    fn displacement_without_room_is_refused_whole() {
        // Every slot full; equipping the bow must return both the current
        // weapon and shield, which cannot fit.
        let mut inventory: BTreeMap<u16, SlotRecord> = (1..MAX_SLOTS)
            .map(|slot| (slot, SlotRecord::new(ItemKind::Logs, 1)))
            .collect();
        inventory.insert(0, SlotRecord::new(ItemKind::Shortbow, 1));
        let equipment: BTreeMap<_, _> = [
            (EquipSlot::Weapon, SlotRecord::new(ItemKind::BronzeSword, 1)),
            (EquipSlot::Shield, SlotRecord::new(ItemKind::BronzeShield, 1)),
        ]
        .into_iter()
        .collect();
        let err = plan_equip(&inventory, &equipment, 0, &no_skills(), MAX_SLOTS).unwrap_err();
        assert_eq!(err.code(), "capacity");
    }

    #[test]
    fn skill_gate_is_enforced() {
        let inventory = [(0, SlotRecord::new(ItemKind::Zweihander, 1))]
            .into_iter()
            .collect();
        let err = plan_equip(
            &inventory,
            &BTreeMap::new(),
            0,
            &skills_with(Skill::Attack, 19),
            MAX_SLOTS,
        )
        .unwrap_err();
        assert_eq!(err.code(), "validation");
    }

    #[test]
    fn non_equippable_items_are_rejected() {
        let inventory = [(0, SlotRecord::new(ItemKind::CopperOre, 5))]
            .into_iter()
            .collect();
        let err =
            plan_equip(&inventory, &BTreeMap::new(), 0, &no_skills(), MAX_SLOTS).unwrap_err();
        assert_eq!(err.code(), "validation");
    }

    #[test]
    fn ammo_merges_onto_the_equipped_stack() {
        let inventory = [(0, SlotRecord::new(ItemKind::BronzeArrow, 100))]
            .into_iter()
            .collect();
        let equipment = [(EquipSlot::Ammo, SlotRecord::new(ItemKind::BronzeArrow, 50))]
            .into_iter()
            .collect();
        let plan = plan_equip(&inventory, &equipment, 0, &no_skills(), MAX_SLOTS).unwrap();
        assert!(plan.inventory.is_empty());
        assert_eq!(
            plan.equipment.get(&EquipSlot::Ammo).map(|r| r.quantity),
            Some(150)
        );
    }

    #[test]
    fn ammo_merge_overflow_stays_in_the_source_slot() {
        let inventory = [(0, SlotRecord::new(ItemKind::BronzeArrow, 500))]
            .into_iter()
            .collect();
        let equipment = [(EquipSlot::Ammo, SlotRecord::new(ItemKind::BronzeArrow, 8092))]
            .into_iter()
            .collect();
        let plan = plan_equip(&inventory, &equipment, 0, &no_skills(), MAX_SLOTS).unwrap();
        assert_eq!(
            plan.equipment.get(&EquipSlot::Ammo).map(|r| r.quantity),
            Some(AMMO_MAX_STACK)
        );
        assert_eq!(plan.inventory.get(&0).map(|r| r.quantity), Some(400));
    }

    #[test]
    fn health_delta_tracks_the_swap() {
        // Platebody grants +5 health; nothing displaced.
        let inventory = [(0, SlotRecord::new(ItemKind::BronzePlatebody, 1))]
            .into_iter()
            .collect();
        let plan = plan_equip(&inventory, &BTreeMap::new(), 0, &no_skills(), MAX_SLOTS).unwrap();
        assert_eq!(plan.health_delta, 5);
    }

    #[test]
    fn unequip_places_stack_aware() {
        let inventory = [(0, SlotRecord::new(ItemKind::BronzeArrow, 100))]
            .into_iter()
            .collect();
        let equipment = [(EquipSlot::Ammo, SlotRecord::new(ItemKind::BronzeArrow, 40))]
            .into_iter()
            .collect();
        let plan = plan_unequip(&inventory, &equipment, EquipSlot::Ammo, MAX_SLOTS).unwrap();
        assert_eq!(plan.moved, 40);
        assert!(plan.remainder.is_none());
        assert_eq!(plan.inventory.get(&0).map(|r| r.quantity), Some(140));
        assert!(plan.equipment.is_empty());
    }

    #[test]
    fn unequip_reports_the_unplaceable_remainder() {
        let inventory: BTreeMap<u16, SlotRecord> = (0..MAX_SLOTS)
            .map(|slot| (slot, SlotRecord::new(ItemKind::Logs, 1)))
            .collect();
        let equipment = [(EquipSlot::Head, SlotRecord::new(ItemKind::BronzeHelmet, 1))]
            .into_iter()
            .collect();
        let plan = plan_unequip(&inventory, &equipment, EquipSlot::Head, MAX_SLOTS).unwrap();
        assert_eq!(plan.moved, 0);
        assert_eq!(plan.remainder.map(|r| r.quantity), Some(1));
    }

    #[test]
    fn unequip_empty_slot_is_rejected() {
        let err = plan_unequip(&BTreeMap::new(), &BTreeMap::new(), EquipSlot::Head, MAX_SLOTS)
            .unwrap_err();
        assert_eq!(err.code(), "validation");
    }
}
