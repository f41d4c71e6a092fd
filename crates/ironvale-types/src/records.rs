//! Record structs that cross the cache and durable-store boundaries.
//!
//! These are the JSON payloads held in cache hash fields and the row shapes
//! the durable stores persist. Business logic works with these types only;
//! untyped maps never escape the store layer.

use serde::{Deserialize, Serialize};

use crate::catalog::ItemKind;
use crate::ids::{GroundItemId, PlayerId};

/// One occupied inventory or equipment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    /// What the slot holds.
    pub item: ItemKind,
    /// How many units, `1..=max_stack` for the kind.
    pub quantity: u32,
    /// Remaining durability for degradable gear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<u32>,
}

impl SlotRecord {
    /// A slot holding `quantity` fresh units of `item`, with the kind's
    /// starting durability when it has one.
    pub fn new(item: ItemKind, quantity: u32) -> Self {
        Self {
            item,
            quantity,
            durability: item.def().durability,
        }
    }
}

/// Progress in a single skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillState {
    /// Current level.
    pub level: u32,
    /// Accumulated experience.
    pub xp: u64,
}

/// Mutable per-player vitals persisted in the `players` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerVitals {
    /// Display name.
    pub username: String,
    /// Current hit points, `1..=max_hp` while alive.
    pub current_hp: u32,
}

/// An item stack lying on the ground somewhere in the world.
///
/// Timestamps are unix-epoch seconds; sub-second precision matters for the
/// protection and despawn windows, hence `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItemRecord {
    /// Stable identity, assigned at drop time.
    pub id: GroundItemId,
    /// Map the stack lies on.
    pub map_id: String,
    /// Tile x coordinate.
    pub x: i32,
    /// Tile y coordinate.
    pub y: i32,
    /// What is on the ground.
    pub item: ItemKind,
    /// Stack size.
    pub quantity: u32,
    /// Remaining durability carried over from the dropping player's slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<u32>,
    /// Player the drop is loot-protected for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropped_by: Option<PlayerId>,
    /// Moment the stack was created.
    pub created_at: f64,
    /// Moment loot protection lapses and anyone may pick it up.
    pub public_at: f64,
    /// Moment the stack vanishes.
    pub despawn_at: f64,
}

impl GroundItemRecord {
    /// Whether the despawn timer has elapsed.
    pub fn is_despawned(&self, now: f64) -> bool {
        now >= self.despawn_at
    }

    /// Whether `player` may pick the stack up at `now`: either they dropped
    /// it, or the protection window has lapsed, or it was never protected.
    pub fn is_lootable_by(&self, player: PlayerId, now: f64) -> bool {
        match self.dropped_by {
            Some(owner) => owner == player || now >= self.public_at,
            None => true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(dropped_by: Option<PlayerId>) -> GroundItemRecord {
        GroundItemRecord {
            id: GroundItemId::new(),
            map_id: "overfield".to_owned(),
            x: 10,
            y: 20,
            item: ItemKind::BronzeSword,
            quantity: 1,
            durability: Some(200),
            dropped_by,
            created_at: 1000.0,
            public_at: 1045.0,
            despawn_at: 1120.0,
        }
    }

    #[test]
    fn owner_loots_during_protection() {
        let owner = PlayerId::new();
        let rec = record(Some(owner));
        assert!(rec.is_lootable_by(owner, 1001.0));
        assert!(!rec.is_lootable_by(PlayerId::new(), 1001.0));
    }

    #[test]
    fn anyone_loots_after_protection_lapses() {
        let rec = record(Some(PlayerId::new()));
        assert!(rec.is_lootable_by(PlayerId::new(), 1045.0));
    }

    #[test]
    fn unowned_drops_are_public_immediately() {
        let rec = record(None);
        assert!(rec.is_lootable_by(PlayerId::new(), 1000.0));
    }

    #[test]
    fn despawn_boundary_is_inclusive() {
        let rec = record(None);
        assert!(!rec.is_despawned(1119.9));
        assert!(rec.is_despawned(1120.0));
    }

    #[test]
    fn slot_record_takes_catalog_durability() {
        let slot = SlotRecord::new(ItemKind::BronzeSword, 1);
        assert_eq!(slot.durability, Some(250));
        let stack = SlotRecord::new(ItemKind::CopperOre, 30);
        assert_eq!(stack.durability, None);
    }

    #[test]
    fn ground_record_roundtrips_as_json() {
        let rec = record(Some(PlayerId::new()));
        let json = serde_json::to_string(&rec).unwrap();
        let back: GroundItemRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
