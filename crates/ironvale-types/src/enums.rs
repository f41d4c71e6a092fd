//! Enumeration types shared across the Ironvale workspace.
//!
//! Every enum that crosses a store boundary carries a stable string form:
//! `as_str` for writes and [`core::str::FromStr`] for reads. The database
//! stores these strings, never ordinals.

use serde::{Deserialize, Serialize};

/// Error returned when a stored string does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    /// The enum the string was parsed against.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl core::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown {} variant: {}", self.kind, self.value)
    }
}

impl core::error::Error for UnknownVariant {}

// ---------------------------------------------------------------------------
// Item classification
// ---------------------------------------------------------------------------

/// The broad functional class of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Melee and ranged weapons.
    Weapon,
    /// Wearable defensive gear.
    Armor,
    /// Gathering and crafting implements.
    Tool,
    /// Raw and processed crafting inputs.
    Material,
    /// Single-use items (food, potions).
    Consumable,
    /// Projectiles consumed by ranged weapons.
    Ammo,
    /// Medium of exchange.
    Currency,
}

impl ItemCategory {
    /// Stable string form used in the database and cache payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Tool => "tool",
            Self::Material => "material",
            Self::Consumable => "consumable",
            Self::Ammo => "ammo",
            Self::Currency => "currency",
        }
    }
}

impl core::str::FromStr for ItemCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weapon" => Ok(Self::Weapon),
            "armor" => Ok(Self::Armor),
            "tool" => Ok(Self::Tool),
            "material" => Ok(Self::Material),
            "consumable" => Ok(Self::Consumable),
            "ammo" => Ok(Self::Ammo),
            "currency" => Ok(Self::Currency),
            other => Err(UnknownVariant {
                kind: "ItemCategory",
                value: other.to_owned(),
            }),
        }
    }
}

/// Item rarity tier. Drives ground-item despawn and loot-protection timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRarity {
    /// Junk-tier items with the shortest timers.
    Poor,
    /// The default tier for everyday items.
    Common,
    /// Above-average drops.
    Uncommon,
    /// Scarce drops worth protecting.
    Rare,
    /// Very scarce drops.
    Epic,
    /// The scarcest tier with the longest timers.
    Legendary,
}

impl ItemRarity {
    /// All rarities in ascending order.
    pub const ALL: [Self; 6] = [
        Self::Poor,
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    /// Stable string form used in the database and config keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    /// Numeric rank for sort comparisons (higher is rarer).
    pub const fn rank(self) -> u8 {
        match self {
            Self::Poor => 0,
            Self::Common => 1,
            Self::Uncommon => 2,
            Self::Rare => 3,
            Self::Epic => 4,
            Self::Legendary => 5,
        }
    }
}

impl core::str::FromStr for ItemRarity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poor" => Ok(Self::Poor),
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            other => Err(UnknownVariant {
                kind: "ItemRarity",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Equipment slots
// ---------------------------------------------------------------------------

/// The fixed set of equipment slots on a player.
///
/// Only [`EquipSlot::Ammo`] holds stacks with quantity greater than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    /// Helmets and hats.
    Head,
    /// Capes and cloaks.
    Cape,
    /// Amulets and necklaces.
    Amulet,
    /// Main-hand weapon. Two-handed weapons also claim the shield slot.
    Weapon,
    /// Chest armor.
    Body,
    /// Off-hand shields. Empty while a two-handed weapon is equipped.
    Shield,
    /// Leg armor.
    Legs,
    /// Gloves and gauntlets.
    Gloves,
    /// Boots and shoes.
    Boots,
    /// Rings.
    Ring,
    /// Projectile stack for ranged weapons.
    Ammo,
}

impl EquipSlot {
    /// All slots in canonical (paper-doll) order.
    pub const ALL: [Self; 11] = [
        Self::Head,
        Self::Cape,
        Self::Amulet,
        Self::Weapon,
        Self::Body,
        Self::Shield,
        Self::Legs,
        Self::Gloves,
        Self::Boots,
        Self::Ring,
        Self::Ammo,
    ];

    /// Stable string form used in the database and cache hash fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Cape => "cape",
            Self::Amulet => "amulet",
            Self::Weapon => "weapon",
            Self::Body => "body",
            Self::Shield => "shield",
            Self::Legs => "legs",
            Self::Gloves => "gloves",
            Self::Boots => "boots",
            Self::Ring => "ring",
            Self::Ammo => "ammo",
        }
    }

    /// Position in the canonical order, for equipment-first sorting.
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Head => 0,
            Self::Cape => 1,
            Self::Amulet => 2,
            Self::Weapon => 3,
            Self::Body => 4,
            Self::Shield => 5,
            Self::Legs => 6,
            Self::Gloves => 7,
            Self::Boots => 8,
            Self::Ring => 9,
            Self::Ammo => 10,
        }
    }
}

impl core::str::FromStr for EquipSlot {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "head" => Ok(Self::Head),
            "cape" => Ok(Self::Cape),
            "amulet" => Ok(Self::Amulet),
            "weapon" => Ok(Self::Weapon),
            "body" => Ok(Self::Body),
            "shield" => Ok(Self::Shield),
            "legs" => Ok(Self::Legs),
            "gloves" => Ok(Self::Gloves),
            "boots" => Ok(Self::Boots),
            "ring" => Ok(Self::Ring),
            "ammo" => Ok(Self::Ammo),
            other => Err(UnknownVariant {
                kind: "EquipSlot",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// A trainable player skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    /// Melee accuracy.
    Attack,
    /// Melee damage.
    Strength,
    /// Damage mitigation.
    Defence,
    /// Health pool. Starts at level 10; every other skill starts at 1.
    Hitpoints,
    /// Ranged accuracy and damage.
    Ranged,
    /// Ore extraction.
    Mining,
    /// Metalworking.
    Smithing,
    /// Tree felling.
    Woodcutting,
    /// Fishing.
    Fishing,
    /// Food preparation.
    Cooking,
}

impl Skill {
    /// All skills in canonical order.
    pub const ALL: [Self; 10] = [
        Self::Attack,
        Self::Strength,
        Self::Defence,
        Self::Hitpoints,
        Self::Ranged,
        Self::Mining,
        Self::Smithing,
        Self::Woodcutting,
        Self::Fishing,
        Self::Cooking,
    ];

    /// Stable string form used in the database and cache hash fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Strength => "strength",
            Self::Defence => "defence",
            Self::Hitpoints => "hitpoints",
            Self::Ranged => "ranged",
            Self::Mining => "mining",
            Self::Smithing => "smithing",
            Self::Woodcutting => "woodcutting",
            Self::Fishing => "fishing",
            Self::Cooking => "cooking",
        }
    }

    /// Level a fresh character starts with in this skill.
    pub const fn starting_level(self) -> u32 {
        match self {
            Self::Hitpoints => 10,
            _ => 1,
        }
    }
}

impl core::str::FromStr for Skill {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attack" => Ok(Self::Attack),
            "strength" => Ok(Self::Strength),
            "defence" => Ok(Self::Defence),
            "hitpoints" => Ok(Self::Hitpoints),
            "ranged" => Ok(Self::Ranged),
            "mining" => Ok(Self::Mining),
            "smithing" => Ok(Self::Smithing),
            "woodcutting" => Ok(Self::Woodcutting),
            "fishing" => Ok(Self::Fishing),
            "cooking" => Ok(Self::Cooking),
            other => Err(UnknownVariant {
                kind: "Skill",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Data kinds (dirty tracking)
// ---------------------------------------------------------------------------

/// A category of player or world state with its own cache keyspace,
/// dirty set, and durable flush algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// Per-player inventory slots.
    Inventory,
    /// Per-player equipped items.
    Equipment,
    /// Per-player skill levels and experience.
    Skills,
    /// Per-player vitals row (current HP).
    Player,
    /// World-owned ground items.
    Ground,
}

impl DataKind {
    /// All kinds walked by a full sync pass.
    pub const ALL: [Self; 5] = [
        Self::Inventory,
        Self::Equipment,
        Self::Skills,
        Self::Player,
        Self::Ground,
    ];

    /// Stable string form, used as the cache key segment and dirty-set name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Equipment => "equipment",
            Self::Skills => "skills",
            Self::Player => "player",
            Self::Ground => "ground",
        }
    }
}

// ---------------------------------------------------------------------------
// Sort orders
// ---------------------------------------------------------------------------

/// Requested ordering for an inventory sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Category, then rarity, then name.
    Category,
    /// Rarity, then name.
    Rarity,
    /// Value descending, then rarity, then name.
    Value,
    /// Name, then rarity.
    Name,
    /// Equippable items in slot order first, then everything else by category.
    Equipment,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn equip_slot_roundtrips_through_strings() {
        for slot in EquipSlot::ALL {
            let parsed: EquipSlot = slot.as_str().parse().unwrap();
            assert_eq!(parsed, slot);
        }
    }

    #[test]
    fn skill_roundtrips_through_strings() {
        for skill in Skill::ALL {
            let parsed: Skill = skill.as_str().parse().unwrap();
            assert_eq!(parsed, skill);
        }
    }

    #[test]
    fn rarity_rank_is_ascending() {
        let mut last = None;
        for rarity in ItemRarity::ALL {
            if let Some(prev) = last {
                assert!(rarity.rank() > prev);
            }
            last = Some(rarity.rank());
        }
    }

    #[test]
    fn hitpoints_starts_at_ten() {
        assert_eq!(Skill::Hitpoints.starting_level(), 10);
        assert_eq!(Skill::Mining.starting_level(), 1);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = "bauble".parse::<EquipSlot>().unwrap_err();
        assert_eq!(err.kind, "EquipSlot");
        assert_eq!(err.value, "bauble");
    }
}
