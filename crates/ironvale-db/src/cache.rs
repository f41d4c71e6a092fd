//! Dragonfly (Redis-compatible) cache operations.
//!
//! The cache holds the authoritative state of every online player. All
//! values are JSON-encoded at this boundary; callers work with typed
//! records, never raw strings.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `inventory:{player}` | Hash | slot index -> `SlotRecord` JSON |
//! | `equipment:{player}` | Hash | equip slot -> `SlotRecord` JSON |
//! | `skills:{player}` | Hash | skill -> `SkillState` JSON |
//! | `player:{player}` | JSON | `PlayerVitals` |
//! | `ground_item:{id}` | JSON | `GroundItemRecord` |
//! | `ground_items:map:{map}` | Set | ground item ids on a map |
//! | `dirty:{kind}` | Set | ids pending durable flush |
//! | `ground_items:deleted` | Set | ground ids pending durable delete |

use std::collections::{BTreeMap, HashMap};

use fred::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DbError;

/// Connection handle to a Dragonfly (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`] and provides typed hash, set, and
/// JSON-value operations for the key patterns above.
#[derive(Clone)]
pub struct CachePool {
    client: Client,
}

impl CachePool {
    /// Connect to the cache at the given URL.
    ///
    /// The URL follows the Redis scheme: `redis://host:port` or
    /// `redis://host:port/db`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Cache`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config =
            Config::from_url(url).map_err(|e| DbError::Config(format!("Invalid cache URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to cache");
        Ok(Self { client })
    }

    // =========================================================================
    // Whole-key JSON values
    // =========================================================================

    /// Serialize `value` as JSON and store it at `key`.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    /// Read the value at `key` and deserialize from JSON.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        match value {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    /// Delete a key.
    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }

    /// Whether a key currently exists.
    pub async fn exists(&self, key: &str) -> Result<bool, DbError> {
        let n: u32 = self.client.exists(key).await?;
        Ok(n > 0)
    }

    /// Set or refresh a key's time-to-live.
    pub async fn expire(&self, key: &str, seconds: i64) -> Result<(), DbError> {
        let _: bool = self.client.expire(key, seconds, None).await?;
        Ok(())
    }

    // =========================================================================
    // Hash operations (per-player containers)
    // =========================================================================

    /// Read the whole hash at `key`, deserializing each field value.
    ///
    /// An absent key yields an empty map, indistinguishable from an empty
    /// container; callers that need the distinction check [`Self::exists`].
    pub async fn hgetall_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<BTreeMap<String, T>, DbError> {
        let raw: HashMap<String, String> = self.client.hgetall(key).await?;
        let mut out = BTreeMap::new();
        for (field, value) in &raw {
            let parsed: T = serde_json::from_str(value)?;
            out.insert(field.clone(), parsed);
        }
        Ok(out)
    }

    /// Read one hash field, deserializing its value.
    ///
    /// Returns `Ok(None)` when the field (or the key) does not exist.
    pub async fn hget_json<T: DeserializeOwned>(
        &self,
        key: &str,
        field: &str,
    ) -> Result<Option<T>, DbError> {
        let value: Option<String> = self.client.hget(key, field).await?;
        match value {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` as JSON and store it in one hash field.
    pub async fn hset_json<T: Serialize>(
        &self,
        key: &str,
        field: &str,
        value: &T,
    ) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let mut entry = HashMap::with_capacity(1);
        entry.insert(field.to_owned(), json);
        let _: u32 = self.client.hset(key, entry).await?;
        Ok(())
    }

    /// Replace-write a whole container into a hash key.
    ///
    /// Deletes the key first so removed fields do not linger, then writes
    /// every field in one HSET. Used by auto-load write-through and by
    /// whole-container setters.
    pub async fn hset_all_json<T: Serialize>(
        &self,
        key: &str,
        fields: &BTreeMap<String, T>,
    ) -> Result<(), DbError> {
        let _: u32 = self.client.del(key).await?;
        if fields.is_empty() {
            return Ok(());
        }
        let mut entries = HashMap::with_capacity(fields.len());
        for (field, value) in fields {
            entries.insert(field.clone(), serde_json::to_string(value)?);
        }
        let _: u32 = self.client.hset(key, entries).await?;
        Ok(())
    }

    /// Delete one hash field. Returns whether the field existed.
    pub async fn hdel(&self, key: &str, field: &str) -> Result<bool, DbError> {
        let removed: u32 = self.client.hdel(key, field).await?;
        Ok(removed > 0)
    }

    // =========================================================================
    // Set operations (dirty tracking, per-map ground indexes)
    // =========================================================================

    /// Add a member to a set.
    pub async fn sadd(&self, key: &str, member: &str) -> Result<(), DbError> {
        let _: u32 = self.client.sadd(key, member).await?;
        Ok(())
    }

    /// Remove a member from a set.
    pub async fn srem(&self, key: &str, member: &str) -> Result<(), DbError> {
        let _: u32 = self.client.srem(key, member).await?;
        Ok(())
    }

    /// Whether `member` is in the set at `key`.
    pub async fn sismember(&self, key: &str, member: &str) -> Result<bool, DbError> {
        let is_member: bool = self.client.sismember(key, member).await?;
        Ok(is_member)
    }

    /// All members of a set. Absent keys yield an empty vector.
    pub async fn smembers(&self, key: &str) -> Result<Vec<String>, DbError> {
        let members: Vec<String> = self.client.smembers(key).await?;
        Ok(members)
    }

    /// Flush all keys from the cache instance.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    pub async fn flush_all(&self) -> Result<(), DbError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}
