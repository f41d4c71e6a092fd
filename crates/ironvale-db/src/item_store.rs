//! Seeding of the durable `items` catalog table.
//!
//! The catalog lives in code ([`ItemKind`]); the table exists so container
//! rows have a foreign key to point at and so operators can inspect item
//! properties with plain SQL. Seeding upserts every kind, letting catalog
//! changes flow through on deploy.

use sqlx::PgPool;

use ironvale_types::{EquipSlot, ItemKind};

use crate::error::DbError;

/// Operations on the `items` table.
pub struct ItemCatalogStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemCatalogStore<'a> {
    /// Create a new catalog store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert every catalog entry into the `items` table.
    ///
    /// Must run after migrations and before any container flush, since
    /// container rows reference `items(name)`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn seed(&self) -> Result<(), DbError> {
        let len = ItemKind::ALL.len();
        let mut names: Vec<String> = Vec::with_capacity(len);
        let mut displays: Vec<String> = Vec::with_capacity(len);
        let mut categories: Vec<String> = Vec::with_capacity(len);
        let mut rarities: Vec<String> = Vec::with_capacity(len);
        let mut values: Vec<i32> = Vec::with_capacity(len);
        let mut stacks: Vec<i32> = Vec::with_capacity(len);
        let mut slots: Vec<Option<String>> = Vec::with_capacity(len);
        let mut two_handed: Vec<bool> = Vec::with_capacity(len);

        for kind in ItemKind::ALL {
            let def = kind.def();
            names.push(kind.as_str().to_owned());
            displays.push(def.name.to_owned());
            categories.push(def.category.as_str().to_owned());
            rarities.push(def.rarity.as_str().to_owned());
            values.push(i32::try_from(def.value).unwrap_or(i32::MAX));
            stacks.push(i32::try_from(def.max_stack).unwrap_or(i32::MAX));
            slots.push(def.slot.map(|s| EquipSlot::as_str(s).to_owned()));
            two_handed.push(def.two_handed);
        }

        sqlx::query(
            r"INSERT INTO items (name, display_name, category, rarity, value, max_stack, equip_slot, two_handed)
              SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[], $3::TEXT[], $4::TEXT[], $5::INTEGER[], $6::INTEGER[], $7::TEXT[], $8::BOOLEAN[])
              ON CONFLICT (name)
              DO UPDATE SET display_name = EXCLUDED.display_name,
                            category = EXCLUDED.category,
                            rarity = EXCLUDED.rarity,
                            value = EXCLUDED.value,
                            max_stack = EXCLUDED.max_stack,
                            equip_slot = EXCLUDED.equip_slot,
                            two_handed = EXCLUDED.two_handed",
        )
        .bind(&names)
        .bind(&displays)
        .bind(&categories)
        .bind(&rarities)
        .bind(&values)
        .bind(&stacks)
        .bind(&slots)
        .bind(&two_handed)
        .execute(self.pool)
        .await?;

        tracing::info!(items = len, "Seeded item catalog");
        Ok(())
    }
}
