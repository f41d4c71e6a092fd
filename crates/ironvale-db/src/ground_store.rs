//! Durable operations on the `ground_items` table.
//!
//! Ground items flush as upsert-dirty plus delete-removed, not replace-all:
//! the table is world-scoped, so wiping it per flush would race other maps.
//! Pickup exclusivity uses a `PostgreSQL` advisory transaction lock keyed on
//! the ground-item UUID, because the row may only exist in cache at the
//! moment two players grab for it.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use ironvale_types::{GroundItemId, GroundItemRecord, ItemKind, PlayerId};

use crate::error::DbError;

/// Operations on the `ground_items` table.
pub struct GroundItemStore<'a> {
    pool: &'a PgPool,
}

impl<'a> GroundItemStore<'a> {
    /// Create a new ground-item store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction for a lock-holding pickup sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a connection cannot be acquired.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        Ok(self.pool.begin().await?)
    }

    /// Take the advisory transaction lock for one ground item.
    ///
    /// The lock releases automatically at commit or rollback. Two pickups
    /// racing for the same stack serialize here; the loser re-reads and
    /// finds the stack gone or reduced.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the lock call fails.
    pub async fn lock_for_pickup(
        tx: &mut Transaction<'static, Postgres>,
        id: GroundItemId,
    ) -> Result<(), DbError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(id.to_string())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Load one ground item by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, id: GroundItemId) -> Result<Option<GroundItemRecord>, DbError> {
        let row = sqlx::query_as::<_, GroundRow>(
            r"SELECT id, map_id, x, y, item, quantity, durability, dropped_by,
                     created_at, public_at, despawn_at
              FROM ground_items
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(GroundRow::into_record).transpose()
    }

    /// Load every ground item on one map, for the startup warm-load.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn load_map(&self, map_id: &str) -> Result<Vec<GroundItemRecord>, DbError> {
        let rows = sqlx::query_as::<_, GroundRow>(
            r"SELECT id, map_id, x, y, item, quantity, durability, dropped_by,
                     created_at, public_at, despawn_at
              FROM ground_items
              WHERE map_id = $1
              ORDER BY created_at",
        )
        .bind(map_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(GroundRow::into_record).collect()
    }

    /// Upsert a batch of ground records in one UNNEST statement.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert_batch(&self, records: &[GroundItemRecord]) -> Result<(), DbError> {
        if records.is_empty() {
            return Ok(());
        }

        let len = records.len();
        let mut ids: Vec<Uuid> = Vec::with_capacity(len);
        let mut maps: Vec<String> = Vec::with_capacity(len);
        let mut xs: Vec<i32> = Vec::with_capacity(len);
        let mut ys: Vec<i32> = Vec::with_capacity(len);
        let mut items: Vec<String> = Vec::with_capacity(len);
        let mut quantities: Vec<i32> = Vec::with_capacity(len);
        let mut durabilities: Vec<Option<i32>> = Vec::with_capacity(len);
        let mut droppers: Vec<Option<Uuid>> = Vec::with_capacity(len);
        let mut created: Vec<f64> = Vec::with_capacity(len);
        let mut publics: Vec<f64> = Vec::with_capacity(len);
        let mut despawns: Vec<f64> = Vec::with_capacity(len);

        for rec in records {
            ids.push(rec.id.into_inner());
            maps.push(rec.map_id.clone());
            xs.push(rec.x);
            ys.push(rec.y);
            items.push(rec.item.as_str().to_owned());
            quantities.push(i32::try_from(rec.quantity).unwrap_or(i32::MAX));
            durabilities.push(rec.durability.map(|d| i32::try_from(d).unwrap_or(i32::MAX)));
            droppers.push(rec.dropped_by.map(PlayerId::into_inner));
            created.push(rec.created_at);
            publics.push(rec.public_at);
            despawns.push(rec.despawn_at);
        }

        sqlx::query(
            r"INSERT INTO ground_items (id, map_id, x, y, item, quantity, durability, dropped_by, created_at, public_at, despawn_at)
              SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::INTEGER[], $4::INTEGER[], $5::TEXT[], $6::INTEGER[], $7::INTEGER[], $8::UUID[], $9::DOUBLE PRECISION[], $10::DOUBLE PRECISION[], $11::DOUBLE PRECISION[])
              ON CONFLICT (id)
              DO UPDATE SET quantity = EXCLUDED.quantity,
                            durability = EXCLUDED.durability,
                            public_at = EXCLUDED.public_at,
                            despawn_at = EXCLUDED.despawn_at",
        )
        .bind(&ids)
        .bind(&maps)
        .bind(&xs)
        .bind(&ys)
        .bind(&items)
        .bind(&quantities)
        .bind(&durabilities)
        .bind(&droppers)
        .bind(&created)
        .bind(&publics)
        .bind(&despawns)
        .execute(self.pool)
        .await?;

        tracing::debug!(count = len, "Flushed ground items (upsert batch)");
        Ok(())
    }

    /// Delete a batch of ground records by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_batch(&self, ids: &[GroundItemId]) -> Result<(), DbError> {
        if ids.is_empty() {
            return Ok(());
        }

        let raw: Vec<Uuid> = ids.iter().copied().map(GroundItemId::into_inner).collect();
        sqlx::query("DELETE FROM ground_items WHERE id = ANY($1)")
            .bind(&raw)
            .execute(self.pool)
            .await?;

        tracing::debug!(count = ids.len(), "Deleted ground items");
        Ok(())
    }

    /// Delete every record whose despawn timer has elapsed.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_expired(&self, now: f64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM ground_items WHERE despawn_at <= $1")
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// A row from the `ground_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct GroundRow {
    id: Uuid,
    map_id: String,
    x: i32,
    y: i32,
    item: String,
    quantity: i32,
    durability: Option<i32>,
    dropped_by: Option<Uuid>,
    created_at: f64,
    public_at: f64,
    despawn_at: f64,
}

impl GroundRow {
    fn into_record(self) -> Result<GroundItemRecord, DbError> {
        let item: ItemKind = self
            .item
            .parse()
            .map_err(|e: ironvale_types::UnknownVariant| DbError::Corrupt(e.to_string()))?;
        Ok(GroundItemRecord {
            id: GroundItemId::from(self.id),
            map_id: self.map_id,
            x: self.x,
            y: self.y,
            item,
            quantity: u32::try_from(self.quantity).unwrap_or(1),
            durability: self.durability.map(|d| u32::try_from(d).unwrap_or(0)),
            dropped_by: self.dropped_by.map(PlayerId::from),
            created_at: self.created_at,
            public_at: self.public_at,
            despawn_at: self.despawn_at,
        })
    }
}
