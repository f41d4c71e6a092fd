//! Durable operations on the `players` table.

use sqlx::PgPool;

use ironvale_types::{PlayerId, PlayerVitals};

use crate::error::DbError;

/// Operations on the `players` table.
pub struct PlayerStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PlayerStore<'a> {
    /// Create a new player store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load one player's vitals row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn load(&self, player: PlayerId) -> Result<Option<PlayerVitals>, DbError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r"SELECT username, current_hp
              FROM players
              WHERE id = $1",
        )
        .bind(player.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| PlayerVitals {
            username: r.username,
            current_hp: u32::try_from(r.current_hp).unwrap_or(0),
        }))
    }

    /// Insert or update a player's vitals row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert(&self, player: PlayerId, vitals: &PlayerVitals) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO players (id, username, current_hp)
              VALUES ($1, $2, $3)
              ON CONFLICT (id)
              DO UPDATE SET username = EXCLUDED.username,
                            current_hp = EXCLUDED.current_hp,
                            updated_at = now()",
        )
        .bind(player.into_inner())
        .bind(&vitals.username)
        .bind(i32::try_from(vitals.current_hp).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await?;

        tracing::debug!(player = %player, hp = vitals.current_hp, "Flushed player vitals");
        Ok(())
    }
}

/// A row from the `players` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PlayerRow {
    username: String,
    current_hp: i32,
}
