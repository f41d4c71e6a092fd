//! The state router: one entry point for all player and ground state.
//!
//! Routing rule: an online player's state lives in the cache; an offline
//! player's state lives in the durable store. Reads for online players
//! auto-load from the durable store on a cache miss and write the result
//! through. Every cache mutation marks the owning id dirty so the sync
//! coordinator knows what to flush.
//!
//! The router holds no locks across awaits. Per-player command
//! serialization is the caller's contract: each connection processes one
//! command at a time, so two mutations for the same player never
//! interleave. The only cross-player race, ground-item pickup, is handled
//! by the durable advisory lock in the item engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use ironvale_db::{
    CachePool, EquipmentStore, GroundItemStore, InventoryStore, ItemCatalogStore, PlayerStore,
    PostgresPool, SkillStore,
};
use ironvale_types::{
    DataKind, EquipSlot, GroundItemId, GroundItemRecord, PlayerId, PlayerVitals, Skill,
    SkillState, SlotRecord,
};

use crate::config::GameConfig;
use crate::error::StateError;
use crate::registry::OnlineRegistry;

/// Cache set holding ground-item ids whose durable rows await deletion.
const GROUND_DELETED_KEY: &str = "ground_items:deleted";

fn inventory_key(player: PlayerId) -> String {
    format!("inventory:{player}")
}

fn equipment_key(player: PlayerId) -> String {
    format!("equipment:{player}")
}

fn skills_key(player: PlayerId) -> String {
    format!("skills:{player}")
}

fn player_key(player: PlayerId) -> String {
    format!("player:{player}")
}

fn ground_item_key(id: GroundItemId) -> String {
    format!("ground_item:{id}")
}

fn map_index_key(map_id: &str) -> String {
    format!("ground_items:map:{map_id}")
}

fn dirty_key(kind: DataKind) -> String {
    format!("dirty:{}", kind.as_str())
}

/// Routes state reads and writes between the cache and the durable store.
#[derive(Clone)]
pub struct StateRouter {
    cache: Option<CachePool>,
    db: PostgresPool,
    config: Arc<GameConfig>,
    online: Arc<OnlineRegistry>,
}

impl StateRouter {
    /// Build a router over already-connected pools.
    ///
    /// Passing `None` for the cache runs the router in degraded mode:
    /// every read and write goes straight to the durable store and dirty
    /// tracking is a no-op.
    pub fn new(cache: Option<CachePool>, db: PostgresPool, config: GameConfig) -> Self {
        if cache.is_none() {
            tracing::warn!("State router running without a cache tier (degraded mode)");
        }
        Self {
            cache,
            db,
            config: Arc::new(config),
            online: Arc::new(OnlineRegistry::new()),
        }
    }

    /// Connect both stores from configuration and build a router.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the durable store is unreachable. A
    /// failed cache connection downgrades to degraded mode with a warning
    /// instead of failing startup.
    pub async fn connect(config: GameConfig) -> Result<Self, StateError> {
        let db = PostgresPool::connect_url(&config.infrastructure.postgres_url).await?;

        let cache = match &config.infrastructure.cache_url {
            Some(url) => match CachePool::connect(url).await {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!(error = %e, "Cache unavailable, continuing without it");
                    None
                }
            },
            None => None,
        };

        Ok(Self::new(cache, db, config))
    }

    /// Run migrations and seed the item catalog. Call once at startup,
    /// before any flush can reference the `items` table.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if migrations or seeding fail.
    pub async fn bootstrap(&self) -> Result<(), StateError> {
        self.db.run_migrations().await?;
        ItemCatalogStore::new(self.db.pool()).seed().await?;
        Ok(())
    }

    /// The game configuration this router was built with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The online-player registry.
    pub fn online(&self) -> &OnlineRegistry {
        &self.online
    }

    /// The durable store pool.
    pub const fn db(&self) -> &PostgresPool {
        &self.db
    }

    /// The cache pool, when one is configured.
    pub const fn cache(&self) -> Option<&CachePool> {
        self.cache.as_ref()
    }

    /// Cache pool to use for a player's request: present only when the
    /// cache tier exists and the player is online.
    fn cache_for(&self, player: PlayerId) -> Option<&CachePool> {
        self.cache
            .as_ref()
            .filter(|_| self.online.is_online(player))
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Register a player as online.
    ///
    /// Purges any cache keys left over from a prior session first, so the
    /// first read of each container auto-loads fresh durable state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the purge fails.
    pub async fn connect_player(&self, player: PlayerId) -> Result<(), StateError> {
        self.purge_player(player).await?;
        self.online.register(player);
        tracing::info!(player = %player, online = self.online.count(), "Player connected");
        Ok(())
    }

    /// Remove a player from the online registry.
    ///
    /// The sync coordinator's `sync_player` must run first; this method
    /// only purges and unregisters.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the purge fails.
    pub async fn disconnect_player(&self, player: PlayerId) -> Result<(), StateError> {
        self.purge_player(player).await?;
        self.online.unregister(player);
        tracing::info!(player = %player, online = self.online.count(), "Player disconnected");
        Ok(())
    }

    /// Delete a player's cache keys and dirty marks.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if a cache delete fails.
    pub async fn purge_player(&self, player: PlayerId) -> Result<(), StateError> {
        let Some(cache) = self.cache.as_ref() else {
            return Ok(());
        };
        let id = player.to_string();
        cache.delete(&inventory_key(player)).await?;
        cache.delete(&equipment_key(player)).await?;
        cache.delete(&skills_key(player)).await?;
        cache.delete(&player_key(player)).await?;
        for kind in [DataKind::Inventory, DataKind::Equipment, DataKind::Skills, DataKind::Player] {
            cache.srem(&dirty_key(kind), &id).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// A player's inventory, keyed by slot index.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if both stores fail.
    pub async fn inventory(
        &self,
        player: PlayerId,
    ) -> Result<BTreeMap<u16, SlotRecord>, StateError> {
        if let Some(cache) = self.cache_for(player) {
            match self.cached_inventory_inner(cache, player).await {
                Ok(Some(slots)) => return Ok(slots),
                Ok(None) => {
                    // Miss: auto-load from durable and write through.
                    let loaded = InventoryStore::new(self.db.pool()).load(player).await?;
                    self.write_inventory_cache(cache, player, &loaded).await?;
                    return Ok(loaded);
                }
                Err(e) => {
                    tracing::warn!(player = %player, error = %e, "Cache read failed, using durable store");
                }
            }
        }
        Ok(InventoryStore::new(self.db.pool()).load(player).await?)
    }

    /// Replace a player's inventory.
    ///
    /// Online: cache write plus dirty mark. Offline: durable replace-all.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the write fails.
    pub async fn set_inventory(
        &self,
        player: PlayerId,
        slots: &BTreeMap<u16, SlotRecord>,
    ) -> Result<(), StateError> {
        if let Some(cache) = self.cache_for(player) {
            self.write_inventory_cache(cache, player, slots).await?;
            self.mark_dirty(DataKind::Inventory, &player.to_string()).await?;
            return Ok(());
        }
        InventoryStore::new(self.db.pool())
            .replace_all(player, slots)
            .await?;
        Ok(())
    }

    /// Inventory straight from the cache, bypassing routing. `Ok(None)`
    /// when the cache is absent or holds no hash for the player. Used by
    /// the sync coordinator's flush path.
    pub async fn cached_inventory(
        &self,
        player: PlayerId,
    ) -> Result<Option<BTreeMap<u16, SlotRecord>>, StateError> {
        match self.cache.as_ref() {
            Some(cache) => self.cached_inventory_inner(cache, player).await,
            None => Ok(None),
        }
    }

    async fn cached_inventory_inner(
        &self,
        cache: &CachePool,
        player: PlayerId,
    ) -> Result<Option<BTreeMap<u16, SlotRecord>>, StateError> {
        let key = inventory_key(player);
        if !cache.exists(&key).await? {
            return Ok(None);
        }
        let raw: BTreeMap<String, SlotRecord> = cache.hgetall_json(&key).await?;
        let mut slots = BTreeMap::new();
        for (field, record) in raw {
            let slot: u16 = field
                .parse()
                .map_err(|_| StateError::Corrupt(format!("bad inventory slot field: {field}")))?;
            slots.insert(slot, record);
        }
        cache
            .expire(&key, self.config.ttl_secs(DataKind::Inventory))
            .await?;
        Ok(Some(slots))
    }

    async fn write_inventory_cache(
        &self,
        cache: &CachePool,
        player: PlayerId,
        slots: &BTreeMap<u16, SlotRecord>,
    ) -> Result<(), StateError> {
        let key = inventory_key(player);
        let fields: BTreeMap<String, SlotRecord> = slots
            .iter()
            .map(|(slot, record)| (slot.to_string(), *record))
            .collect();
        cache.hset_all_json(&key, &fields).await?;
        cache
            .expire(&key, self.config.ttl_secs(DataKind::Inventory))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Equipment
    // =========================================================================

    /// A player's equipped items.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if both stores fail.
    pub async fn equipment(
        &self,
        player: PlayerId,
    ) -> Result<BTreeMap<EquipSlot, SlotRecord>, StateError> {
        if let Some(cache) = self.cache_for(player) {
            match self.cached_equipment_inner(cache, player).await {
                Ok(Some(slots)) => return Ok(slots),
                Ok(None) => {
                    let loaded = EquipmentStore::new(self.db.pool()).load(player).await?;
                    self.write_equipment_cache(cache, player, &loaded).await?;
                    return Ok(loaded);
                }
                Err(e) => {
                    tracing::warn!(player = %player, error = %e, "Cache read failed, using durable store");
                }
            }
        }
        Ok(EquipmentStore::new(self.db.pool()).load(player).await?)
    }

    /// Replace a player's equipment.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the write fails.
    pub async fn set_equipment(
        &self,
        player: PlayerId,
        slots: &BTreeMap<EquipSlot, SlotRecord>,
    ) -> Result<(), StateError> {
        if let Some(cache) = self.cache_for(player) {
            self.write_equipment_cache(cache, player, slots).await?;
            self.mark_dirty(DataKind::Equipment, &player.to_string()).await?;
            return Ok(());
        }
        EquipmentStore::new(self.db.pool())
            .replace_all(player, slots)
            .await?;
        Ok(())
    }

    /// Equipment straight from the cache; see [`Self::cached_inventory`].
    pub async fn cached_equipment(
        &self,
        player: PlayerId,
    ) -> Result<Option<BTreeMap<EquipSlot, SlotRecord>>, StateError> {
        match self.cache.as_ref() {
            Some(cache) => self.cached_equipment_inner(cache, player).await,
            None => Ok(None),
        }
    }

    async fn cached_equipment_inner(
        &self,
        cache: &CachePool,
        player: PlayerId,
    ) -> Result<Option<BTreeMap<EquipSlot, SlotRecord>>, StateError> {
        let key = equipment_key(player);
        if !cache.exists(&key).await? {
            return Ok(None);
        }
        let raw: BTreeMap<String, SlotRecord> = cache.hgetall_json(&key).await?;
        let mut slots = BTreeMap::new();
        for (field, record) in raw {
            let slot: EquipSlot = field
                .parse()
                .map_err(|_| StateError::Corrupt(format!("bad equipment slot field: {field}")))?;
            slots.insert(slot, record);
        }
        cache
            .expire(&key, self.config.ttl_secs(DataKind::Equipment))
            .await?;
        Ok(Some(slots))
    }

    async fn write_equipment_cache(
        &self,
        cache: &CachePool,
        player: PlayerId,
        slots: &BTreeMap<EquipSlot, SlotRecord>,
    ) -> Result<(), StateError> {
        let key = equipment_key(player);
        let fields: BTreeMap<String, SlotRecord> = slots
            .iter()
            .map(|(slot, record)| (slot.as_str().to_owned(), *record))
            .collect();
        cache.hset_all_json(&key, &fields).await?;
        cache
            .expire(&key, self.config.ttl_secs(DataKind::Equipment))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Skills
    // =========================================================================

    /// A player's skills. New players get the starting table.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if both stores fail.
    pub async fn skills(
        &self,
        player: PlayerId,
    ) -> Result<BTreeMap<Skill, SkillState>, StateError> {
        if let Some(cache) = self.cache_for(player) {
            match self.cached_skills_inner(cache, player).await {
                Ok(Some(skills)) => return Ok(skills),
                Ok(None) => {
                    let loaded = self.durable_skills(player).await?;
                    self.write_skills_cache(cache, player, &loaded).await?;
                    return Ok(loaded);
                }
                Err(e) => {
                    tracing::warn!(player = %player, error = %e, "Cache read failed, using durable store");
                }
            }
        }
        self.durable_skills(player).await
    }

    /// Durable-side skills, filled out with starting levels for any skill
    /// the player has no row for yet.
    async fn durable_skills(
        &self,
        player: PlayerId,
    ) -> Result<BTreeMap<Skill, SkillState>, StateError> {
        let mut skills = SkillStore::new(self.db.pool()).load(player).await?;
        for skill in Skill::ALL {
            skills.entry(skill).or_insert(SkillState {
                level: skill.starting_level(),
                xp: 0,
            });
        }
        Ok(skills)
    }

    /// Replace a player's skill table.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the write fails.
    pub async fn set_skills(
        &self,
        player: PlayerId,
        skills: &BTreeMap<Skill, SkillState>,
    ) -> Result<(), StateError> {
        if let Some(cache) = self.cache_for(player) {
            self.write_skills_cache(cache, player, skills).await?;
            self.mark_dirty(DataKind::Skills, &player.to_string()).await?;
            return Ok(());
        }
        SkillStore::new(self.db.pool())
            .upsert_all(player, skills)
            .await?;
        Ok(())
    }

    /// Skills straight from the cache; see [`Self::cached_inventory`].
    pub async fn cached_skills(
        &self,
        player: PlayerId,
    ) -> Result<Option<BTreeMap<Skill, SkillState>>, StateError> {
        match self.cache.as_ref() {
            Some(cache) => self.cached_skills_inner(cache, player).await,
            None => Ok(None),
        }
    }

    async fn cached_skills_inner(
        &self,
        cache: &CachePool,
        player: PlayerId,
    ) -> Result<Option<BTreeMap<Skill, SkillState>>, StateError> {
        let key = skills_key(player);
        if !cache.exists(&key).await? {
            return Ok(None);
        }
        let raw: BTreeMap<String, SkillState> = cache.hgetall_json(&key).await?;
        let mut skills = BTreeMap::new();
        for (field, state) in raw {
            let skill: Skill = field
                .parse()
                .map_err(|_| StateError::Corrupt(format!("bad skill field: {field}")))?;
            skills.insert(skill, state);
        }
        cache
            .expire(&key, self.config.ttl_secs(DataKind::Skills))
            .await?;
        Ok(Some(skills))
    }

    async fn write_skills_cache(
        &self,
        cache: &CachePool,
        player: PlayerId,
        skills: &BTreeMap<Skill, SkillState>,
    ) -> Result<(), StateError> {
        let key = skills_key(player);
        let fields: BTreeMap<String, SkillState> = skills
            .iter()
            .map(|(skill, state)| (skill.as_str().to_owned(), *state))
            .collect();
        cache.hset_all_json(&key, &fields).await?;
        cache
            .expire(&key, self.config.ttl_secs(DataKind::Skills))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Vitals
    // =========================================================================

    /// A player's vitals.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::PlayerNotFound`] if no durable row exists.
    pub async fn vitals(&self, player: PlayerId) -> Result<PlayerVitals, StateError> {
        if let Some(cache) = self.cache_for(player) {
            let key = player_key(player);
            match cache.get_json::<PlayerVitals>(&key).await {
                Ok(Some(vitals)) => {
                    cache
                        .expire(&key, self.config.ttl_secs(DataKind::Player))
                        .await?;
                    return Ok(vitals);
                }
                Ok(None) => {
                    let loaded = PlayerStore::new(self.db.pool())
                        .load(player)
                        .await?
                        .ok_or(StateError::PlayerNotFound(player))?;
                    cache.set_json(&key, &loaded).await?;
                    cache
                        .expire(&key, self.config.ttl_secs(DataKind::Player))
                        .await?;
                    return Ok(loaded);
                }
                Err(e) => {
                    tracing::warn!(player = %player, error = %e, "Cache read failed, using durable store");
                }
            }
        }
        PlayerStore::new(self.db.pool())
            .load(player)
            .await?
            .ok_or(StateError::PlayerNotFound(player))
    }

    /// Replace a player's vitals.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the write fails.
    pub async fn set_vitals(
        &self,
        player: PlayerId,
        vitals: &PlayerVitals,
    ) -> Result<(), StateError> {
        if let Some(cache) = self.cache_for(player) {
            let key = player_key(player);
            cache.set_json(&key, vitals).await?;
            cache
                .expire(&key, self.config.ttl_secs(DataKind::Player))
                .await?;
            self.mark_dirty(DataKind::Player, &player.to_string()).await?;
            return Ok(());
        }
        PlayerStore::new(self.db.pool()).upsert(player, vitals).await?;
        Ok(())
    }

    /// Vitals straight from the cache; see [`Self::cached_inventory`].
    pub async fn cached_vitals(
        &self,
        player: PlayerId,
    ) -> Result<Option<PlayerVitals>, StateError> {
        match self.cache.as_ref() {
            Some(cache) => Ok(cache.get_json(&player_key(player)).await?),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Ground items
    // =========================================================================
    //
    // Ground state is world-scoped, not player-scoped, so it uses the cache
    // whenever one is configured, independent of the online registry.

    /// One ground item by id, auto-loading from the durable store on miss.
    ///
    /// Ids sitting in the pending-delete set read as gone: their durable
    /// row may outlive the cache key until the next flush, and auto-loading
    /// it would resurrect an already-taken stack.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if both stores fail.
    pub async fn ground_item(
        &self,
        id: GroundItemId,
    ) -> Result<Option<GroundItemRecord>, StateError> {
        if let Some(cache) = self.cache.as_ref() {
            match cache.get_json::<GroundItemRecord>(&ground_item_key(id)).await {
                Ok(Some(rec)) => return Ok(Some(rec)),
                Ok(None) => {
                    if cache.sismember(GROUND_DELETED_KEY, &id.to_string()).await? {
                        return Ok(None);
                    }
                    let loaded = GroundItemStore::new(self.db.pool()).get(id).await?;
                    if let Some(rec) = &loaded {
                        cache.set_json(&ground_item_key(id), rec).await?;
                        cache.sadd(&map_index_key(&rec.map_id), &id.to_string()).await?;
                    }
                    return Ok(loaded);
                }
                Err(e) => {
                    tracing::warn!(ground_item = %id, error = %e, "Cache read failed, using durable store");
                }
            }
        }
        Ok(GroundItemStore::new(self.db.pool()).get(id).await?)
    }

    /// Create or update a ground item.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the write fails.
    pub async fn put_ground_item(&self, rec: &GroundItemRecord) -> Result<(), StateError> {
        if let Some(cache) = self.cache.as_ref() {
            let id = rec.id.to_string();
            cache.set_json(&ground_item_key(rec.id), rec).await?;
            cache.sadd(&map_index_key(&rec.map_id), &id).await?;
            // The record is live again; cancel any pending durable delete.
            cache.srem(GROUND_DELETED_KEY, &id).await?;
            self.mark_dirty(DataKind::Ground, &id).await?;
            return Ok(());
        }
        GroundItemStore::new(self.db.pool())
            .upsert_batch(std::slice::from_ref(rec))
            .await?;
        Ok(())
    }

    /// Remove a ground item everywhere: cache key, map index, dirty mark,
    /// and (via the deletion set) eventually the durable row.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the write fails.
    pub async fn remove_ground_item(
        &self,
        id: GroundItemId,
        map_id: &str,
    ) -> Result<(), StateError> {
        if let Some(cache) = self.cache.as_ref() {
            let id_str = id.to_string();
            cache.delete(&ground_item_key(id)).await?;
            cache.srem(&map_index_key(map_id), &id_str).await?;
            cache.srem(&dirty_key(DataKind::Ground), &id_str).await?;
            cache.sadd(GROUND_DELETED_KEY, &id_str).await?;
            return Ok(());
        }
        GroundItemStore::new(self.db.pool()).delete_batch(&[id]).await?;
        Ok(())
    }

    /// Every ground item on a map. Index entries whose record has vanished
    /// are pruned as they are encountered.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the read fails.
    pub async fn ground_items_on_map(
        &self,
        map_id: &str,
    ) -> Result<Vec<GroundItemRecord>, StateError> {
        if let Some(cache) = self.cache.as_ref() {
            let index = map_index_key(map_id);
            let ids = cache.smembers(&index).await?;
            let mut records = Vec::with_capacity(ids.len());
            for id_str in ids {
                let Ok(id) = id_str.parse::<GroundItemId>() else {
                    cache.srem(&index, &id_str).await?;
                    continue;
                };
                match cache.get_json::<GroundItemRecord>(&ground_item_key(id)).await? {
                    Some(rec) => records.push(rec),
                    None => {
                        cache.srem(&index, &id_str).await?;
                    }
                }
            }
            return Ok(records);
        }
        Ok(GroundItemStore::new(self.db.pool()).load_map(map_id).await?)
    }

    /// Load a map's durable ground items into the cache at startup so the
    /// index set is complete before the first player walks in. Rows whose
    /// delete is still pending in the deletion set are skipped.
    ///
    /// Returns the number of records warmed.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if either store fails.
    pub async fn warm_load_map(&self, map_id: &str) -> Result<usize, StateError> {
        let Some(cache) = self.cache.as_ref() else {
            return Ok(0);
        };
        let records = GroundItemStore::new(self.db.pool()).load_map(map_id).await?;
        let index = map_index_key(map_id);
        let mut warmed = 0_usize;
        for rec in &records {
            let id = rec.id.to_string();
            if cache.sismember(GROUND_DELETED_KEY, &id).await? {
                continue;
            }
            cache.set_json(&ground_item_key(rec.id), rec).await?;
            cache.sadd(&index, &id).await?;
            warmed = warmed.saturating_add(1);
        }
        tracing::info!(map = map_id, count = warmed, "Warm-loaded ground items");
        Ok(warmed)
    }

    // =========================================================================
    // Dirty tracking (consumed by the sync coordinator)
    // =========================================================================

    /// Mark an id as pending durable flush for one data kind.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the set write fails.
    pub async fn mark_dirty(&self, kind: DataKind, id: &str) -> Result<(), StateError> {
        if let Some(cache) = self.cache.as_ref() {
            cache.sadd(&dirty_key(kind), id).await?;
        }
        Ok(())
    }

    /// All ids pending flush for one data kind.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the set read fails.
    pub async fn dirty_members(&self, kind: DataKind) -> Result<Vec<String>, StateError> {
        match self.cache.as_ref() {
            Some(cache) => Ok(cache.smembers(&dirty_key(kind)).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Clear one id's dirty mark. Only the sync coordinator calls this,
    /// and only after the durable commit succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the set write fails.
    pub async fn clear_dirty(&self, kind: DataKind, id: &str) -> Result<(), StateError> {
        if let Some(cache) = self.cache.as_ref() {
            cache.srem(&dirty_key(kind), id).await?;
        }
        Ok(())
    }

    /// Ground ids whose durable rows await deletion.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the set read fails.
    pub async fn deleted_ground_members(&self) -> Result<Vec<String>, StateError> {
        match self.cache.as_ref() {
            Some(cache) => Ok(cache.smembers(GROUND_DELETED_KEY).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Clear one id from the ground deletion set after its durable row is
    /// gone.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Db`] if the set write fails.
    pub async fn clear_deleted_ground(&self, id: &str) -> Result<(), StateError> {
        if let Some(cache) = self.cache.as_ref() {
            cache.srem(GROUND_DELETED_KEY, id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_patterns_are_stable() {
        let player = PlayerId::new();
        let ground = GroundItemId::new();
        assert_eq!(inventory_key(player), format!("inventory:{player}"));
        assert_eq!(equipment_key(player), format!("equipment:{player}"));
        assert_eq!(skills_key(player), format!("skills:{player}"));
        assert_eq!(player_key(player), format!("player:{player}"));
        assert_eq!(ground_item_key(ground), format!("ground_item:{ground}"));
        assert_eq!(map_index_key("overfield"), "ground_items:map:overfield");
        assert_eq!(dirty_key(DataKind::Inventory), "dirty:inventory");
        assert_eq!(dirty_key(DataKind::Ground), "dirty:ground");
    }
}
