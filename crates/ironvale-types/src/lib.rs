//! Shared type definitions for the Ironvale game server.
//!
//! This crate is the single source of truth for the types used across the
//! workspace: strongly-typed IDs, the enum vocabulary, the static item
//! catalog, the records that cross store boundaries, and operation outcomes.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Enumeration types (categories, slots, skills, data kinds)
//! - [`catalog`] -- The static item catalog ([`ItemKind`] and [`ItemDef`])
//! - [`records`] -- Slot, skill, vitals, and ground-item records
//! - [`outcome`] -- Typed results for item-engine operations

pub mod catalog;
pub mod enums;
pub mod ids;
pub mod outcome;
pub mod records;

// Re-export all public types at crate root for convenience.
pub use catalog::{
    AMMO_MAX_STACK, CURRENCY_MAX_STACK, ItemDef, ItemKind, ItemStats, MATERIAL_MAX_STACK,
};
pub use enums::{
    DataKind, EquipSlot, ItemCategory, ItemRarity, Skill, SortOrder, UnknownVariant,
};
pub use ids::{GroundItemId, PlayerId};
pub use outcome::{
    AddOutcome, AmmoOutcome, DeathOutcome, DropOutcome, DurabilityOutcome, EquipOutcome,
    MoveOutcome, PickupOutcome, UnequipOutcome,
};
pub use records::{GroundItemRecord, PlayerVitals, SkillState, SlotRecord};
