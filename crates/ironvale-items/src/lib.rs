//! Item transaction engine for Ironvale.
//!
//! Everything that moves items between a player's inventory, their
//! equipment, and the ground goes through [`ItemEngine`]. Operations are
//! plan-then-write: a pure planner validates the request against container
//! snapshots and computes the complete result, and only a valid plan is
//! written back through the state router. Concurrent pickups of the same
//! ground stack serialize on a per-item advisory lock.

pub mod engine;
pub mod error;
pub mod plan;
pub mod stats;

pub use engine::ItemEngine;
pub use error::OpError;
