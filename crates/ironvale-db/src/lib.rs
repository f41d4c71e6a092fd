//! Data layer for the Ironvale game server (Dragonfly cache + `PostgreSQL`).
//!
//! The cache holds the authoritative state of every online player and of
//! active ground items; `PostgreSQL` is the durable system of record. The
//! state router decides which store a request hits; the sync coordinator
//! moves dirty cache state to the durable side.
//!
//! # Architecture
//!
//! ```text
//! Gameplay code
//!     |
//!     +-- Online reads/writes --> Dragonfly (CachePool)
//!     |
//!     +-- Dirty flush ----------> PostgreSQL (PostgresPool)
//!         |-- InventoryStore   (replace-all)
//!         |-- EquipmentStore   (replace-all)
//!         |-- SkillStore       (upsert)
//!         |-- GroundItemStore  (upsert + delete, advisory pickup lock)
//!         +-- PlayerStore      (vitals upsert)
//! ```
//!
//! # Modules
//!
//! - [`cache`] -- Dragonfly (Redis-compatible) typed hash/set operations
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`inventory_store`] / [`equipment_store`] -- replace-all container flush
//! - [`skill_store`] -- per-skill upsert flush
//! - [`ground_store`] -- ground items and the pickup advisory lock
//! - [`player_store`] -- vitals rows
//! - [`item_store`] -- catalog table seeding
//! - [`error`] -- Shared error types

pub mod cache;
pub mod equipment_store;
pub mod error;
pub mod ground_store;
pub mod inventory_store;
pub mod item_store;
pub mod player_store;
pub mod postgres;
pub mod skill_store;

// Re-export primary types for convenience.
pub use cache::CachePool;
pub use equipment_store::EquipmentStore;
pub use error::DbError;
pub use ground_store::GroundItemStore;
pub use inventory_store::InventoryStore;
pub use item_store::ItemCatalogStore;
pub use player_store::PlayerStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use skill_store::SkillStore;
