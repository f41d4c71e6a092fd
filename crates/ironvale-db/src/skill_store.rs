//! Durable operations on the `skills` table.
//!
//! Skills are the one container flushed by upsert instead of replace-all:
//! rows are never removed, only leveled, so `ON CONFLICT DO UPDATE` over the
//! full snapshot is both cheaper and safe against partial snapshots.

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use ironvale_types::{PlayerId, Skill, SkillState};

use crate::error::DbError;

/// Operations on the `skills` table.
pub struct SkillStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SkillStore<'a> {
    /// Create a new skill store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a player's skills.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Corrupt`] if a stored skill name is unknown.
    pub async fn load(&self, player: PlayerId) -> Result<BTreeMap<Skill, SkillState>, DbError> {
        let rows = sqlx::query_as::<_, SkillRow>(
            r"SELECT skill, level, xp
              FROM skills
              WHERE player_id = $1",
        )
        .bind(player.into_inner())
        .fetch_all(self.pool)
        .await?;

        let mut skills = BTreeMap::new();
        for row in rows {
            let skill: Skill = row
                .skill
                .parse()
                .map_err(|e: ironvale_types::UnknownVariant| DbError::Corrupt(e.to_string()))?;
            skills.insert(
                skill,
                SkillState {
                    level: u32::try_from(row.level).unwrap_or(1),
                    xp: u64::try_from(row.xp).unwrap_or(0),
                },
            );
        }
        Ok(skills)
    }

    /// Upsert a player's skill snapshot, one UNNEST statement for all rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert_all(
        &self,
        player: PlayerId,
        skills: &BTreeMap<Skill, SkillState>,
    ) -> Result<(), DbError> {
        if skills.is_empty() {
            return Ok(());
        }

        let len = skills.len();
        let mut players: Vec<Uuid> = Vec::with_capacity(len);
        let mut names: Vec<String> = Vec::with_capacity(len);
        let mut levels: Vec<i32> = Vec::with_capacity(len);
        let mut xps: Vec<i64> = Vec::with_capacity(len);

        for (skill, state) in skills {
            players.push(player.into_inner());
            names.push(skill.as_str().to_owned());
            levels.push(i32::try_from(state.level).unwrap_or(i32::MAX));
            xps.push(i64::try_from(state.xp).unwrap_or(i64::MAX));
        }

        sqlx::query(
            r"INSERT INTO skills (player_id, skill, level, xp)
              SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::INTEGER[], $4::BIGINT[])
              ON CONFLICT (player_id, skill)
              DO UPDATE SET level = EXCLUDED.level, xp = EXCLUDED.xp",
        )
        .bind(&players)
        .bind(&names)
        .bind(&levels)
        .bind(&xps)
        .execute(self.pool)
        .await?;

        tracing::debug!(player = %player, skills = len, "Flushed skills (upsert)");
        Ok(())
    }
}

/// A row from the `skills` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SkillRow {
    skill: String,
    level: i32,
    xp: i64,
}
