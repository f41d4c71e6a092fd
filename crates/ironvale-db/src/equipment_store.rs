//! Durable operations on the `equipment` table.
//!
//! Same replace-all shape as the inventory store, with equipment slot names
//! as the row key instead of numeric indices.

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use ironvale_types::{EquipSlot, ItemKind, PlayerId, SlotRecord};

use crate::error::DbError;

/// Operations on the `equipment` table.
pub struct EquipmentStore<'a> {
    pool: &'a PgPool,
}

impl<'a> EquipmentStore<'a> {
    /// Create a new equipment store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a player's equipped items, keyed by equipment slot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Corrupt`] if a stored slot or item name is unknown.
    pub async fn load(
        &self,
        player: PlayerId,
    ) -> Result<BTreeMap<EquipSlot, SlotRecord>, DbError> {
        let rows = sqlx::query_as::<_, EquipRow>(
            r"SELECT slot, item, quantity, durability
              FROM equipment
              WHERE player_id = $1",
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

    /// Replace a player's equipment rows with the given snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the transaction fails.
    pub async fn replace_all(
        &self,
        player: PlayerId,
        slots: &BTreeMap<EquipSlot, SlotRecord>,
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM equipment WHERE player_id = $1")
            .bind(player.into_inner())
            .execute(&mut *tx)
            .await?;

        if !slots.is_empty() {
            let len = slots.len();
            let mut players: Vec<Uuid> = Vec::with_capacity(len);
            let mut names: Vec<String> = Vec::with_capacity(len);
            let mut items: Vec<String> = Vec::with_capacity(len);
            let mut quantities: Vec<i32> = Vec::with_capacity(len);
            let mut durabilities: Vec<Option<i32>> = Vec::with_capacity(len);

            for (slot, record) in slots {
                players.push(player.into_inner());
                names.push(slot.as_str().to_owned());
                items.push(record.item.as_str().to_owned());
                quantities.push(i32::try_from(record.quantity).unwrap_or(i32::MAX));
                durabilities.push(record.durability.map(|d| i32::try_from(d).unwrap_or(i32::MAX)));
            }

            sqlx::query(
                r"INSERT INTO equipment (player_id, slot, item, quantity, durability)
                  SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::TEXT[], $4::INTEGER[], $5::INTEGER[])",
            )
            .bind(&players)
            .bind(&names)
            .bind(&items)
            .bind(&quantities)
            .bind(&durabilities)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(player = %player, slots = slots.len(), "Flushed equipment (replace-all)");
        Ok(())
    }
}

/// A row from the `equipment` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct EquipRow {
    slot: String,
    item: String,
    quantity: i32,
    durability: Option<i32>,
}

impl EquipRow {
    fn into_record(self) -> Result<(EquipSlot, SlotRecord), DbError> {
        let slot: EquipSlot = self
            .slot
            .parse()
            .map_err(|e: ironvale_types::UnknownVariant| DbError::Corrupt(e.to_string()))?;
        let item: ItemKind = self
            .item
            .parse()
            .map_err(|e: ironvale_types::UnknownVariant| DbError::Corrupt(e.to_string()))?;
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
