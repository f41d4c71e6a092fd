//! Typed results for item-engine operations.
//!
//! Every mutating operation reports exactly what changed, so callers can
//! update clients without re-reading state.

use serde::{Deserialize, Serialize};

use crate::catalog::ItemKind;
use crate::enums::EquipSlot;
use crate::ids::GroundItemId;

/// Result of adding items to an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOutcome {
    /// First slot the items landed in.
    pub slot: u16,
    /// Units actually placed.
    pub added: u32,
    /// Units that did not fit.
    pub overflow: u32,
}

/// How a slot-to-slot move resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Destination was empty; the stack moved.
    Moved,
    /// Destination held a different item; the stacks swapped.
    Swapped,
    /// Destination held the same kind; quantities merged, with any
    /// remainder left in the source slot.
    Merged {
        /// Units still in the source slot after the merge.
        remainder: u32,
    },
}

/// Result of equipping an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipOutcome {
    /// Slot the item now occupies.
    pub slot: EquipSlot,
    /// Previously equipped items returned to the inventory.
    pub displaced: Vec<ItemKind>,
    /// Hit points after any health-bonus gain.
    pub current_hp: u32,
    /// Maximum hit points after the change.
    pub max_hp: u32,
}

/// Result of unequipping an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnequipOutcome {
    /// Units placed back into the inventory.
    pub to_inventory: u32,
    /// Ground record created for units that did not fit, if any.
    pub to_ground: Option<GroundItemId>,
    /// Hit points after any health-bonus loss, clamped to at least 1.
    pub current_hp: u32,
    /// Maximum hit points after the change.
    pub max_hp: u32,
}

/// Result of dropping items on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropOutcome {
    /// The ground record created.
    pub ground_id: GroundItemId,
}

/// Result of picking a ground stack up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupOutcome {
    /// What was picked up.
    pub item: ItemKind,
    /// Units moved into the inventory.
    pub quantity: u32,
    /// First inventory slot the units landed in.
    pub slot: u16,
    /// Units left on the ground when the inventory could not hold all.
    pub remainder: u32,
}

/// Result of a death drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathOutcome {
    /// Ground records created from the player's inventory and equipment.
    pub dropped_stacks: u32,
}

/// Result of degrading an equipped item's durability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurabilityOutcome {
    /// Durability left on the item, `None` for indestructible gear.
    pub remaining: Option<u32>,
    /// Whether the durability just hit zero.
    pub broke: bool,
}

/// Result of consuming ammunition from the ammo slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoOutcome {
    /// Units consumed.
    pub consumed: u32,
    /// Units still equipped.
    pub remaining: u32,
}
