//! Durable operations on the `inventory` table.
//!
//! Inventories flush as a replace-all: the cache snapshot is the truth, so
//! the durable side deletes the player's rows and re-inserts the snapshot
//! inside one transaction. A single multi-row UNNEST insert keeps the
//! round-trip count at two statements regardless of slot count.

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use ironvale_types::{ItemKind, PlayerId, SlotRecord};

use crate::error::DbError;

/// Operations on the `inventory` table.
pub struct InventoryStore<'a> {
    pool: &'a PgPool,
}

impl<'a> InventoryStore<'a> {
    /// Create a new inventory store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a player's full inventory, keyed by slot index.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Corrupt`] if a stored item name is unknown.
    pub async fn load(&self, player: PlayerId) -> Result<BTreeMap<u16, SlotRecord>, DbError> {
        let rows = sqlx::query_as::<_, SlotRow>(
            r"SELECT slot, item, quantity, durability
              FROM inventory
              WHERE player_id = $1
              ORDER BY slot",
        )
        .bind(player.into_inner())
        .fetch_all(self.pool)
        .await?;

        let mut slots = BTreeMap::new();
        for row in rows {
            let (slot, record) = row.into_record()?;
            slots.insert(slot, record);
        }
        Ok(slots)
    }

    /// Replace a player's inventory rows with the given snapshot.
    ///
    /// DELETE plus one UNNEST INSERT, committed atomically. An empty
    /// snapshot simply clears the rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the transaction fails.
    pub async fn replace_all(
        &self,
        player: PlayerId,
        slots: &BTreeMap<u16, SlotRecord>,
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM inventory WHERE player_id = $1")
            .bind(player.into_inner())
            .execute(&mut *tx)
            .await?;

        if !slots.is_empty() {
            let len = slots.len();
            let mut players: Vec<Uuid> = Vec::with_capacity(len);
            let mut indices: Vec<i16> = Vec::with_capacity(len);
            let mut items: Vec<String> = Vec::with_capacity(len);
            let mut quantities: Vec<i32> = Vec::with_capacity(len);
            let mut durabilities: Vec<Option<i32>> = Vec::with_capacity(len);

            for (slot, record) in slots {
                players.push(player.into_inner());
                indices.push(i16::try_from(*slot).unwrap_or(i16::MAX));
                items.push(record.item.as_str().to_owned());
                quantities.push(i32::try_from(record.quantity).unwrap_or(i32::MAX));
                durabilities.push(record.durability.map(|d| i32::try_from(d).unwrap_or(i32::MAX)));
            }

            sqlx::query(
                r"INSERT INTO inventory (player_id, slot, item, quantity, durability)
                  SELECT * FROM UNNEST($1::UUID[], $2::SMALLINT[], $3::TEXT[], $4::INTEGER[], $5::INTEGER[])",
            )
            .bind(&players)
            .bind(&indices)
            .bind(&items)
            .bind(&quantities)
            .bind(&durabilities)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(player = %player, slots = slots.len(), "Flushed inventory (replace-all)");
        Ok(())
    }
}

/// A row from the `inventory` or `equipment` table, slot as raw integer.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SlotRow {
    slot: i16,
    item: String,
    quantity: i32,
    durability: Option<i32>,
}

impl SlotRow {
    fn into_record(self) -> Result<(u16, SlotRecord), DbError> {
        let item: ItemKind = self
            .item
            .parse()
            .map_err(|e: ironvale_types::UnknownVariant| DbError::Corrupt(e.to_string()))?;
        let slot = u16::try_from(self.slot)
            .map_err(|_| DbError::Corrupt(format!("negative inventory slot {}", self.slot)))?;
        Ok((
            slot,
            SlotRecord {
                item,
                quantity: u32::try_from(self.quantity).unwrap_or(1),
                durability: self.durability.map(|d| u32::try_from(d).unwrap_or(0)),
            },
        ))
    }
}
