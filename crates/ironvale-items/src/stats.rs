//! Equipment stat aggregation and hit-point math.

use std::collections::BTreeMap;

use ironvale_types::{EquipSlot, ItemStats, Skill, SkillState, SlotRecord};

/// Component-wise total of the bonuses granted by a full equipment set.
#[must_use]
pub fn equipment_stats(equipment: &BTreeMap<EquipSlot, SlotRecord>) -> ItemStats {
    equipment
        .values()
        .fold(ItemStats::default(), |total, record| {
            total.saturating_add(record.item.def().stats)
        })
}

/// Maximum hit points: the Hitpoints skill level plus equipped health
/// bonuses, never below one.
#[must_use]
pub fn max_hp(skills: &BTreeMap<Skill, SkillState>, equipment: &BTreeMap<EquipSlot, SlotRecord>) -> u32 {
    let level = skills
        .get(&Skill::Hitpoints)
        .map_or_else(|| Skill::Hitpoints.starting_level(), |state| state.level);
    let bonus = equipment_stats(equipment).health;
    let total = i64::from(level).saturating_add(i64::from(bonus));
    u32::try_from(total.max(1)).unwrap_or(1)
}

/// Clamp `current_hp` into `1..=max_hp` after an equipment change.
#[must_use]
pub const fn clamp_hp(current_hp: u32, max: u32) -> u32 {
    if current_hp < 1 {
        1
    } else if current_hp > max {
        max
    } else {
        current_hp
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ironvale_types::ItemKind;

    #[test]
    fn stats_sum_across_the_set() {
        let equipment: BTreeMap<_, _> = [
            (EquipSlot::Weapon, SlotRecord::new(ItemKind::BronzeSword, 1)),
            (EquipSlot::Body, SlotRecord::new(ItemKind::BronzePlatebody, 1)),
        ]
        .into_iter()
        .collect();
        let stats = equipment_stats(&equipment);
        assert_eq!(stats.attack, 4);
        assert_eq!(stats.defence, 9);
        assert_eq!(stats.health, 5);
    }

    #[test]
    fn max_hp_adds_equipment_health() {
        let skills: BTreeMap<_, _> = [(Skill::Hitpoints, SkillState { level: 30, xp: 0 })]
            .into_iter()
            .collect();
        let equipment: BTreeMap<_, _> =
            [(EquipSlot::Body, SlotRecord::new(ItemKind::BronzePlatebody, 1))]
                .into_iter()
                .collect();
        assert_eq!(max_hp(&skills, &equipment), 35);
        assert_eq!(max_hp(&skills, &BTreeMap::new()), 30);
    }

    #[test]
    fn missing_hitpoints_skill_uses_the_starting_level() {
        assert_eq!(max_hp(&BTreeMap::new(), &BTreeMap::new()), 10);
    }

    #[test]
    fn hp_clamps_to_the_valid_band() {
        assert_eq!(clamp_hp(0, 10), 1);
        assert_eq!(clamp_hp(5, 10), 5);
        assert_eq!(clamp_hp(15, 10), 10);
    }
}
