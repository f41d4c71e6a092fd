//! Pure planning layer.
//!
//! Every mutation the engine performs is first computed here as an
//! all-or-nothing plan over container snapshots. Planners never touch a
//! store; the engine validates through them, then writes the rebuilt
//! containers through the state router in one pass per container.

pub mod equip;
pub mod sorting;
pub mod stacking;
