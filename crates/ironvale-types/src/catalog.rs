//! The static item catalog.
//!
//! Every item that can exist in the game is a variant of [`ItemKind`], with
//! its immutable properties held in a `'static` [`ItemDef`]. The database
//! stores the snake-case id string; gameplay code works with the enum and
//! never looks definitions up by name at runtime.

use serde::{Deserialize, Serialize};

use crate::enums::{EquipSlot, ItemCategory, ItemRarity, Skill, UnknownVariant};

/// Maximum stack size for currency items.
pub const CURRENCY_MAX_STACK: u32 = i32::MAX as u32;
/// Maximum stack size for ammunition.
pub const AMMO_MAX_STACK: u32 = 8192;
/// Maximum stack size for materials and consumables.
pub const MATERIAL_MAX_STACK: u32 = 64;

/// Combat and vitality bonuses granted by a single equipped item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStats {
    /// Melee accuracy bonus.
    pub attack: i32,
    /// Melee damage bonus.
    pub strength: i32,
    /// Mitigation bonus.
    pub defence: i32,
    /// Ranged accuracy/damage bonus.
    pub ranged: i32,
    /// Maximum-HP bonus while equipped.
    pub health: i32,
}

impl ItemStats {
    /// Component-wise saturating sum, for aggregating a full equipment set.
    pub const fn saturating_add(self, other: Self) -> Self {
        Self {
            attack: self.attack.saturating_add(other.attack),
            strength: self.strength.saturating_add(other.strength),
            defence: self.defence.saturating_add(other.defence),
            ranged: self.ranged.saturating_add(other.ranged),
            health: self.health.saturating_add(other.health),
        }
    }
}

/// Immutable definition of one item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDef {
    /// Human-readable display name.
    pub name: &'static str,
    /// Functional class.
    pub category: ItemCategory,
    /// Rarity tier (drives ground timers and sorting).
    pub rarity: ItemRarity,
    /// Base vendor value of a single unit.
    pub value: u32,
    /// Largest quantity one slot can hold.
    pub max_stack: u32,
    /// Equipment slot this item occupies, if equippable.
    pub slot: Option<EquipSlot>,
    /// Whether equipping also claims the shield slot.
    pub two_handed: bool,
    /// Skill level gate for equipping, if any.
    pub required_skill: Option<(Skill, u32)>,
    /// Starting durability for degradable gear.
    pub durability: Option<u32>,
    /// Bonuses granted while equipped.
    pub stats: ItemStats,
}

impl ItemDef {
    /// Whether more than one unit fits in a slot.
    pub const fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }
}

const NO_STATS: ItemStats = ItemStats {
    attack: 0,
    strength: 0,
    defence: 0,
    ranged: 0,
    health: 0,
};

const fn stats(attack: i32, strength: i32, defence: i32, ranged: i32, health: i32) -> ItemStats {
    ItemStats {
        attack,
        strength,
        defence,
        ranged,
        health,
    }
}

/// Every item kind in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Standard coinage.
    GoldCoin,
    /// Copper-bearing ore.
    CopperOre,
    /// Tin-bearing ore.
    TinOre,
    /// Felled logs.
    Logs,
    /// Smelted bronze.
    BronzeBar,
    /// Cooked fish.
    CookedTrout,
    /// Restores health on use.
    HealthPotion,
    /// Basic arrows for bows.
    BronzeArrow,
    /// Entry-level melee weapon.
    BronzeSword,
    /// Heavy two-handed greatsword.
    Zweihander,
    /// Basic ranged weapon. Requires both hands.
    Shortbow,
    /// Basic head protection.
    BronzeHelmet,
    /// Basic chest armor.
    BronzePlatebody,
    /// Basic leg armor.
    BronzePlatelegs,
    /// Basic off-hand shield.
    BronzeShield,
    /// Light hand protection.
    LeatherGloves,
    /// Light footwear.
    LeatherBoots,
    /// Simple woolen cape.
    WoolCape,
    /// Silver neck charm.
    SilverAmulet,
    /// Plain band.
    CopperRing,
}

impl ItemKind {
    /// Every catalog entry, in canonical order. Used to seed the durable
    /// `items` table at startup.
    pub const ALL: [Self; 20] = [
        Self::GoldCoin,
        Self::CopperOre,
        Self::TinOre,
        Self::Logs,
        Self::BronzeBar,
        Self::CookedTrout,
        Self::HealthPotion,
        Self::BronzeArrow,
        Self::BronzeSword,
        Self::Zweihander,
        Self::Shortbow,
        Self::BronzeHelmet,
        Self::BronzePlatebody,
        Self::BronzePlatelegs,
        Self::BronzeShield,
        Self::LeatherGloves,
        Self::LeatherBoots,
        Self::WoolCape,
        Self::SilverAmulet,
        Self::CopperRing,
    ];

    /// Stable snake-case id, the form stored in the database and cache.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GoldCoin => "gold_coin",
            Self::CopperOre => "copper_ore",
            Self::TinOre => "tin_ore",
            Self::Logs => "logs",
            Self::BronzeBar => "bronze_bar",
            Self::CookedTrout => "cooked_trout",
            Self::HealthPotion => "health_potion",
            Self::BronzeArrow => "bronze_arrow",
            Self::BronzeSword => "bronze_sword",
            Self::Zweihander => "zweihander",
            Self::Shortbow => "shortbow",
            Self::BronzeHelmet => "bronze_helmet",
            Self::BronzePlatebody => "bronze_platebody",
            Self::BronzePlatelegs => "bronze_platelegs",
            Self::BronzeShield => "bronze_shield",
            Self::LeatherGloves => "leather_gloves",
            Self::LeatherBoots => "leather_boots",
            Self::WoolCape => "wool_cape",
            Self::SilverAmulet => "silver_amulet",
            Self::CopperRing => "copper_ring",
        }
    }

    /// The static definition for this kind.
    pub const fn def(self) -> &'static ItemDef {
        match self {
            Self::GoldCoin => const {
                &ItemDef {
                    name: "Gold Coin",
                    category: ItemCategory::Currency,
                    rarity: ItemRarity::Common,
                    value: 1,
                    max_stack: CURRENCY_MAX_STACK,
                    slot: None,
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: NO_STATS,
                }
            },
            Self::CopperOre => const {
                &ItemDef {
                    name: "Copper Ore",
                    category: ItemCategory::Material,
                    rarity: ItemRarity::Poor,
                    value: 5,
                    max_stack: MATERIAL_MAX_STACK,
                    slot: None,
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: NO_STATS,
                }
            },
            Self::TinOre => const {
                &ItemDef {
                    name: "Tin Ore",
                    category: ItemCategory::Material,
                    rarity: ItemRarity::Poor,
                    value: 5,
                    max_stack: MATERIAL_MAX_STACK,
                    slot: None,
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: NO_STATS,
                }
            },
            Self::Logs => const {
                &ItemDef {
                    name: "Logs",
                    category: ItemCategory::Material,
                    rarity: ItemRarity::Poor,
                    value: 2,
                    max_stack: MATERIAL_MAX_STACK,
                    slot: None,
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: NO_STATS,
                }
            },
            Self::BronzeBar => const {
                &ItemDef {
                    name: "Bronze Bar",
                    category: ItemCategory::Material,
                    rarity: ItemRarity::Common,
                    value: 12,
                    max_stack: MATERIAL_MAX_STACK,
                    slot: None,
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: NO_STATS,
                }
            },
            Self::CookedTrout => const {
                &ItemDef {
                    name: "Cooked Trout",
                    category: ItemCategory::Consumable,
                    rarity: ItemRarity::Common,
                    value: 8,
                    max_stack: MATERIAL_MAX_STACK,
                    slot: None,
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: NO_STATS,
                }
            },
            Self::HealthPotion => const {
                &ItemDef {
                    name: "Health Potion",
                    category: ItemCategory::Consumable,
                    rarity: ItemRarity::Uncommon,
                    value: 30,
                    max_stack: MATERIAL_MAX_STACK,
                    slot: None,
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: NO_STATS,
                }
            },
            Self::BronzeArrow => const {
                &ItemDef {
                    name: "Bronze Arrow",
                    category: ItemCategory::Ammo,
                    rarity: ItemRarity::Common,
                    value: 1,
                    max_stack: AMMO_MAX_STACK,
                    slot: Some(EquipSlot::Ammo),
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: stats(0, 0, 0, 1, 0),
                }
            },
            Self::BronzeSword => const {
                &ItemDef {
                    name: "Bronze Sword",
                    category: ItemCategory::Weapon,
                    rarity: ItemRarity::Common,
                    value: 20,
                    max_stack: 1,
                    slot: Some(EquipSlot::Weapon),
                    two_handed: false,
                    required_skill: Some((Skill::Attack, 1)),
                    durability: Some(250),
                    stats: stats(4, 3, 0, 0, 0),
                }
            },
            Self::Zweihander => const {
                &ItemDef {
                    name: "Zweihander",
                    category: ItemCategory::Weapon,
                    rarity: ItemRarity::Rare,
                    value: 240,
                    max_stack: 1,
                    slot: Some(EquipSlot::Weapon),
                    two_handed: true,
                    required_skill: Some((Skill::Attack, 20)),
                    durability: Some(400),
                    stats: stats(14, 16, 0, 0, 0),
                }
            },
            Self::Shortbow => const {
                &ItemDef {
                    name: "Shortbow",
                    category: ItemCategory::Weapon,
                    rarity: ItemRarity::Common,
                    value: 35,
                    max_stack: 1,
                    slot: Some(EquipSlot::Weapon),
                    two_handed: true,
                    required_skill: Some((Skill::Ranged, 1)),
                    durability: Some(180),
                    stats: stats(0, 0, 0, 6, 0),
                }
            },
            Self::BronzeHelmet => const {
                &ItemDef {
                    name: "Bronze Helmet",
                    category: ItemCategory::Armor,
                    rarity: ItemRarity::Common,
                    value: 15,
                    max_stack: 1,
                    slot: Some(EquipSlot::Head),
                    two_handed: false,
                    required_skill: Some((Skill::Defence, 1)),
                    durability: Some(220),
                    stats: stats(0, 0, 3, 0, 0),
                }
            },
            Self::BronzePlatebody => const {
                &ItemDef {
                    name: "Bronze Platebody",
                    category: ItemCategory::Armor,
                    rarity: ItemRarity::Common,
                    value: 48,
                    max_stack: 1,
                    slot: Some(EquipSlot::Body),
                    two_handed: false,
                    required_skill: Some((Skill::Defence, 1)),
                    durability: Some(300),
                    stats: stats(0, 0, 9, 0, 5),
                }
            },
            Self::BronzePlatelegs => const {
                &ItemDef {
                    name: "Bronze Platelegs",
                    category: ItemCategory::Armor,
                    rarity: ItemRarity::Common,
                    value: 36,
                    max_stack: 1,
                    slot: Some(EquipSlot::Legs),
                    two_handed: false,
                    required_skill: Some((Skill::Defence, 1)),
                    durability: Some(280),
                    stats: stats(0, 0, 6, 0, 0),
                }
            },
            Self::BronzeShield => const {
                &ItemDef {
                    name: "Bronze Shield",
                    category: ItemCategory::Armor,
                    rarity: ItemRarity::Common,
                    value: 28,
                    max_stack: 1,
                    slot: Some(EquipSlot::Shield),
                    two_handed: false,
                    required_skill: Some((Skill::Defence, 1)),
                    durability: Some(260),
                    stats: stats(0, 0, 5, 0, 0),
                }
            },
            Self::LeatherGloves => const {
                &ItemDef {
                    name: "Leather Gloves",
                    category: ItemCategory::Armor,
                    rarity: ItemRarity::Poor,
                    value: 6,
                    max_stack: 1,
                    slot: Some(EquipSlot::Gloves),
                    two_handed: false,
                    required_skill: None,
                    durability: Some(120),
                    stats: stats(0, 0, 1, 0, 0),
                }
            },
            Self::LeatherBoots => const {
                &ItemDef {
                    name: "Leather Boots",
                    category: ItemCategory::Armor,
                    rarity: ItemRarity::Poor,
                    value: 6,
                    max_stack: 1,
                    slot: Some(EquipSlot::Boots),
                    two_handed: false,
                    required_skill: None,
                    durability: Some(120),
                    stats: stats(0, 0, 1, 0, 0),
                }
            },
            Self::WoolCape => const {
                &ItemDef {
                    name: "Wool Cape",
                    category: ItemCategory::Armor,
                    rarity: ItemRarity::Poor,
                    value: 4,
                    max_stack: 1,
                    slot: Some(EquipSlot::Cape),
                    two_handed: false,
                    required_skill: None,
                    durability: Some(100),
                    stats: stats(0, 0, 1, 0, 0),
                }
            },
            Self::SilverAmulet => const {
                &ItemDef {
                    name: "Silver Amulet",
                    category: ItemCategory::Armor,
                    rarity: ItemRarity::Uncommon,
                    value: 90,
                    max_stack: 1,
                    slot: Some(EquipSlot::Amulet),
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: stats(0, 0, 0, 0, 2),
                }
            },
            Self::CopperRing => const {
                &ItemDef {
                    name: "Copper Ring",
                    category: ItemCategory::Armor,
                    rarity: ItemRarity::Poor,
                    value: 3,
                    max_stack: 1,
                    slot: Some(EquipSlot::Ring),
                    two_handed: false,
                    required_skill: None,
                    durability: None,
                    stats: NO_STATS,
                }
            },
        }
    }

    /// Display name shortcut.
    pub const fn name(self) -> &'static str {
        self.def().name
    }

    /// Largest quantity one slot of this kind can hold.
    pub const fn max_stack(self) -> u32 {
        self.def().max_stack
    }

    /// Rarity shortcut.
    pub const fn rarity(self) -> ItemRarity {
        self.def().rarity
    }
}

impl core::str::FromStr for ItemKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for kind in Self::ALL {
            if kind.as_str() == s {
                return Ok(kind);
            }
        }
        Err(UnknownVariant {
            kind: "ItemKind",
            value: s.to_owned(),
        })
    }
}

impl core::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_roundtrips_through_its_id() {
        for kind in ItemKind::ALL {
            let parsed: ItemKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn equippable_items_carry_a_slot() {
        for kind in ItemKind::ALL {
            let def = kind.def();
            if matches!(def.category, ItemCategory::Weapon | ItemCategory::Armor) {
                assert!(def.slot.is_some(), "{} missing slot", def.name);
                assert_eq!(def.max_stack, 1, "{} gear must not stack", def.name);
            }
        }
    }

    #[test]
    fn only_ammo_stacks_in_equipment() {
        for kind in ItemKind::ALL {
            let def = kind.def();
            if def.slot.is_some() && def.max_stack > 1 {
                assert_eq!(def.slot, Some(EquipSlot::Ammo));
            }
        }
    }

    #[test]
    fn two_handed_weapons_use_the_weapon_slot() {
        for kind in ItemKind::ALL {
            let def = kind.def();
            if def.two_handed {
                assert_eq!(def.slot, Some(EquipSlot::Weapon));
            }
        }
    }

    #[test]
    fn stats_saturating_add_sums_components() {
        let a = stats(1, 2, 3, 4, 5);
        let b = stats(10, 0, -3, 0, 5);
        let sum = a.saturating_add(b);
        assert_eq!(sum, stats(11, 2, 0, 4, 10));
    }

    #[test]
    fn serde_uses_snake_case_ids() {
        let json = serde_json::to_string(&ItemKind::BronzePlatebody).unwrap();
        assert_eq!(json, "\"bronze_platebody\"");
    }
}
