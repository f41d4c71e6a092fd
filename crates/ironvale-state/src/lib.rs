//! State routing and synchronization for the Ironvale game server.
//!
//! Online players are served from the cache; offline players from the
//! durable store. The [`StateRouter`] makes that decision per request, the
//! [`OnlineRegistry`] tracks who is where, and the [`SyncCoordinator`]
//! moves dirty cache state to `PostgreSQL` on an interval, at logout, and
//! at shutdown.
//!
//! # Modules
//!
//! - [`router`] -- cache-or-durable routing with auto-load and dirty marks
//! - [`registry`] -- the online-player set
//! - [`sync`] -- the batch sync coordinator
//! - [`config`] -- YAML-loaded [`GameConfig`]
//! - [`clock`] -- unix-seconds wall clock for ground timers
//! - [`error`] -- shared error type

pub mod clock;
pub mod config;
pub mod error;
pub mod registry;
pub mod router;
pub mod sync;

// Re-export primary types for convenience.
pub use clock::unix_now;
pub use config::{ConfigError, GameConfig};
pub use error::StateError;
pub use registry::OnlineRegistry;
pub use router::StateRouter;
pub use sync::{SyncCoordinator, SyncReport};
