//! In-process registry of online players.
//!
//! Membership decides routing: online players live in the cache, offline
//! players go straight to the durable store. The registry is the only
//! shared mutable state in the router; a poisoned lock is recovered rather
//! than propagated since the set stays valid after a panicking reader.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use ironvale_types::PlayerId;

/// Thread-safe set of currently online players.
#[derive(Debug, Default)]
pub struct OnlineRegistry {
    players: RwLock<HashSet<PlayerId>>,
}

impl OnlineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a player online. Returns `false` if they already were.
    pub fn register(&self, player: PlayerId) -> bool {
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player)
    }

    /// Mark a player offline. Returns `false` if they were not online.
    pub fn unregister(&self, player: PlayerId) -> bool {
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&player)
    }

    /// Whether a player is currently online.
    pub fn is_online(&self, player: PlayerId) -> bool {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&player)
    }

    /// Snapshot of every online player.
    pub fn all(&self) -> Vec<PlayerId> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    /// Number of players online.
    pub fn count(&self) -> usize {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_unregister() {
        let registry = OnlineRegistry::new();
        let player = PlayerId::new();

        assert!(!registry.is_online(player));
        assert!(registry.register(player));
        assert!(!registry.register(player), "double-register must report false");
        assert!(registry.is_online(player));
        assert_eq!(registry.count(), 1);

        assert!(registry.unregister(player));
        assert!(!registry.unregister(player));
        assert!(!registry.is_online(player));
    }

    #[test]
    fn all_returns_every_member() {
        let registry = OnlineRegistry::new();
        let a = PlayerId::new();
        let b = PlayerId::new();
        registry.register(a);
        registry.register(b);

        let mut members = registry.all();
        members.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(members, expected);
    }
}
