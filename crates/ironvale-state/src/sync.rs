//! The batch sync coordinator: moves dirty cache state to the durable store.
//!
//! Three entry points, all idempotent and at-least-once:
//!
//! - [`SyncCoordinator::sync_all`] -- the periodic pass over every dirty set
//! - [`SyncCoordinator::sync_player`] -- one player's full flush at logout
//! - [`SyncCoordinator::sync_all_online`] -- shutdown flush of every session
//!
//! Dirty marks are cleared only after the durable commit succeeds, so a
//! crash between commit and clear costs one redundant flush, never a lost
//! one. A member whose flush fails keeps its mark and is retried next pass.
//! The host process owns the schedule; nothing here spawns its own loop.

use ironvale_db::{EquipmentStore, GroundItemStore, InventoryStore, PlayerStore, SkillStore};
use ironvale_types::{DataKind, GroundItemId, GroundItemRecord, PlayerId};

use crate::error::StateError;
use crate::router::StateRouter;

/// Counters from one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Inventories flushed.
    pub inventories: usize,
    /// Equipment sets flushed.
    pub equipment: usize,
    /// Skill tables flushed.
    pub skills: usize,
    /// Vitals rows flushed.
    pub players: usize,
    /// Ground records upserted.
    pub ground_upserts: usize,
    /// Ground rows deleted.
    pub ground_deletes: usize,
}

/// Flushes dirty cache state to the durable store.
pub struct SyncCoordinator {
    router: StateRouter,
}

impl SyncCoordinator {
    /// Create a coordinator over a router.
    pub const fn new(router: StateRouter) -> Self {
        Self { router }
    }

    /// The router this coordinator flushes through.
    pub const fn router(&self) -> &StateRouter {
        &self.router
    }

    /// One full pass over every dirty set.
    ///
    /// With the cache tier disabled this is a no-op: every write already
    /// went durable.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] only if a dirty set cannot be
    /// enumerated; individual member failures are logged and retried on
    /// the next pass.
    pub async fn sync_all(&self) -> Result<SyncReport, StateError> {
        let mut report = SyncReport::default();

        for kind in [DataKind::Inventory, DataKind::Equipment, DataKind::Skills, DataKind::Player] {
            for member in self.router.dirty_members(kind).await? {
                let Ok(player) = member.parse::<PlayerId>() else {
                    tracing::warn!(kind = kind.as_str(), member, "Dropping malformed dirty mark");
                    self.router.clear_dirty(kind, &member).await?;
                    continue;
                };
                match self.flush_player_kind(kind, player).await {
                    Ok(flushed) => {
                        self.router.clear_dirty(kind, &member).await?;
                        if flushed {
                            report.bump(kind);
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            kind = kind.as_str(),
                            player = %player,
                            error = %e,
                            "Flush failed, will retry next pass"
                        );
                    }
                }
            }
        }

        let ground = self.sync_ground().await?;
        report.ground_upserts = ground.ground_upserts;
        report.ground_deletes = ground.ground_deletes;

        tracing::info!(
            inventories = report.inventories,
            equipment = report.equipment,
            skills = report.skills,
            players = report.players,
            ground_upserts = report.ground_upserts,
            ground_deletes = report.ground_deletes,
            "Sync pass complete"
        );
        Ok(report)
    }

    /// Flush everything one player owns, dirty or not. Called at logout
    /// before the router purges their cache keys.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] on the first failed flush; the player's
    /// dirty marks survive for the periodic pass to retry.
    pub async fn sync_player(&self, player: PlayerId) -> Result<(), StateError> {
        let member = player.to_string();
        for kind in [DataKind::Inventory, DataKind::Equipment, DataKind::Skills, DataKind::Player] {
            self.flush_player_kind(kind, player).await?;
            self.router.clear_dirty(kind, &member).await?;
        }
        tracing::info!(player = %player, "Player state flushed");
        Ok(())
    }

    /// Shutdown flush: every online player, then the ground sets.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if enumeration fails; per-player
    /// failures are logged and skipped so one bad session cannot block
    /// the rest of shutdown.
    pub async fn sync_all_online(&self) -> Result<(), StateError> {
        let online = self.router.online().all();
        let total = online.len();
        for player in online {
            if let Err(e) = self.sync_player(player).await {
                tracing::error!(player = %player, error = %e, "Shutdown flush failed for player");
            }
        }
        self.sync_ground().await?;
        tracing::info!(players = total, "Shutdown sync complete");
        Ok(())
    }

    /// Flush the ground dirty and deletion sets.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if a set cannot be enumerated.
    pub async fn sync_ground(&self) -> Result<SyncReport, StateError> {
        let mut report = SyncReport::default();

        let dirty = self.router.dirty_members(DataKind::Ground).await?;
        let mut records: Vec<GroundItemRecord> = Vec::with_capacity(dirty.len());
        let mut flushed_ids: Vec<String> = Vec::with_capacity(dirty.len());
        for member in dirty {
            let Ok(id) = member.parse::<GroundItemId>() else {
                tracing::warn!(member, "Dropping malformed ground dirty mark");
                self.router.clear_dirty(DataKind::Ground, &member).await?;
                continue;
            };
            match self.router.ground_item(id).await {
                Ok(Some(rec)) => {
                    records.push(rec);
                    flushed_ids.push(member);
                }
                Ok(None) => {
                    // Record vanished (picked up or despawned) after the
                    // mark was set; the deletion set handles the row.
                    self.router.clear_dirty(DataKind::Ground, &member).await?;
                }
                Err(e) => {
                    tracing::error!(ground_item = %id, error = %e, "Ground read failed, will retry");
                }
            }
        }
        if !records.is_empty() {
            GroundItemStore::new(self.router.db().pool())
                .upsert_batch(&records)
                .await?;
            for member in &flushed_ids {
                self.router.clear_dirty(DataKind::Ground, member).await?;
            }
            report.ground_upserts = records.len();
        }

        let deleted = self.router.deleted_ground_members().await?;
        let mut ids: Vec<GroundItemId> = Vec::with_capacity(deleted.len());
        let mut cleared: Vec<String> = Vec::with_capacity(deleted.len());
        for member in deleted {
            match member.parse::<GroundItemId>() {
                Ok(id) => {
                    ids.push(id);
                    cleared.push(member);
                }
                Err(_) => {
                    tracing::warn!(member, "Dropping malformed ground deletion mark");
                    self.router.clear_deleted_ground(&member).await?;
                }
            }
        }
        if !ids.is_empty() {
            GroundItemStore::new(self.router.db().pool())
                .delete_batch(&ids)
                .await?;
            for member in &cleared {
                self.router.clear_deleted_ground(member).await?;
            }
            report.ground_deletes = ids.len();
        }

        Ok(report)
    }

    /// Sweep despawned ground items from one map, cache and durable store
    /// both. Returns the number of records removed from the map.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if a store operation fails.
    pub async fn cleanup_expired(&self, map_id: &str, now: f64) -> Result<usize, StateError> {
        let records = self.router.ground_items_on_map(map_id).await?;
        let mut removed = 0_usize;
        for rec in records {
            if rec.is_despawned(now) {
                self.router.remove_ground_item(rec.id, map_id).await?;
                removed = removed.saturating_add(1);
            }
        }
        // Rows that never made it into the cache still despawn.
        GroundItemStore::new(self.router.db().pool())
            .delete_expired(now)
            .await?;
        if removed > 0 {
            tracing::debug!(map = map_id, removed, "Swept despawned ground items");
        }
        Ok(removed)
    }

    /// Flush one data kind for one player from the cache snapshot.
    ///
    /// Returns `false` when there was no cache snapshot to flush (the mark
    /// was stale); the durable store already holds the latest state then.
    async fn flush_player_kind(
        &self,
        kind: DataKind,
        player: PlayerId,
    ) -> Result<bool, StateError> {
        match kind {
            DataKind::Inventory => {
                let Some(slots) = self.router.cached_inventory(player).await? else {
                    return Ok(false);
                };
                InventoryStore::new(self.router.db().pool())
                    .replace_all(player, &slots)
                    .await?;
            }
            DataKind::Equipment => {
                let Some(slots) = self.router.cached_equipment(player).await? else {
                    return Ok(false);
                };
                EquipmentStore::new(self.router.db().pool())
                    .replace_all(player, &slots)
                    .await?;
            }
            DataKind::Skills => {
                let Some(skills) = self.router.cached_skills(player).await? else {
                    return Ok(false);
                };
                SkillStore::new(self.router.db().pool())
                    .upsert_all(player, &skills)
                    .await?;
            }
            DataKind::Player => {
                let Some(vitals) = self.router.cached_vitals(player).await? else {
                    return Ok(false);
                };
                PlayerStore::new(self.router.db().pool())
                    .upsert(player, &vitals)
                    .await?;
            }
            DataKind::Ground => {
                // Ground flushes are batch-level; see sync_ground.
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl SyncReport {
    fn bump(&mut self, kind: DataKind) {
        match kind {
            DataKind::Inventory => self.inventories = self.inventories.saturating_add(1),
            DataKind::Equipment => self.equipment = self.equipment.saturating_add(1),
            DataKind::Skills => self.skills = self.skills.saturating_add(1),
            DataKind::Player => self.players = self.players.saturating_add(1),
            DataKind::Ground => {}
        }
    }
}
