//! The item transaction engine.
//!
//! Each operation loads container snapshots through the state router,
//! validates and computes the result with the pure planners, then writes
//! the rebuilt containers back. Validation failures reject before any
//! write, so a refused operation changes nothing.

use std::collections::BTreeMap;

use ironvale_db::GroundItemStore;
use ironvale_state::{unix_now, StateRouter};
use ironvale_types::{
    AddOutcome, AmmoOutcome, DeathOutcome, DropOutcome, DurabilityOutcome, EquipOutcome,
    EquipSlot, GroundItemId, GroundItemRecord, ItemKind, ItemStats, MoveOutcome,
    PickupOutcome, PlayerId, SlotRecord, SortOrder, UnequipOutcome,
};

use crate::error::OpError;
use crate::plan::{equip, sorting, stacking};
use crate::stats;

/// Executes item transactions against a player's routed state.
#[derive(Clone)]
pub struct ItemEngine {
    router: StateRouter,
}

impl ItemEngine {
    /// Build an engine over a connected state router.
    #[must_use]
    pub const fn new(router: StateRouter) -> Self {
        Self { router }
    }

    /// The underlying state router.
    #[must_use]
    pub const fn router(&self) -> &StateRouter {
        &self.router
    }

    fn max_slots(&self) -> u16 {
        self.router.config().inventory.max_slots
    }

    /// Build a ground record for a stack dropped at a tile, with timers
    /// taken from the configured rarity windows.
    #[allow(clippy::cast_precision_loss)]
    fn ground_record(
        &self,
        stack: SlotRecord,
        map_id: &str,
        x: i32,
        y: i32,
        dropped_by: Option<PlayerId>,
    ) -> GroundItemRecord {
        let now = unix_now();
        let rarity = stack.item.rarity();
        let config = self.router.config();
        GroundItemRecord {
            id: GroundItemId::new(),
            map_id: map_id.to_owned(),
            x,
            y,
            item: stack.item,
            quantity: stack.quantity,
            durability: stack.durability,
            dropped_by,
            created_at: now,
            public_at: now + config.protection_secs(rarity) as f64,
            despawn_at: now + config.despawn_secs(rarity) as f64,
        }
    }

    // ========================================================================
    // Inventory operations
    // ========================================================================

    /// Add `quantity` units of `item`, stacking onto existing slots first.
    ///
    /// Fails with `Capacity` when not a single unit fits; a partial fit
    /// succeeds and reports the overflow.
    pub async fn add_item(
        &self,
        player: PlayerId,
        item: ItemKind,
        quantity: u32,
    ) -> Result<AddOutcome, OpError> {
        if quantity == 0 {
            return Err(OpError::Validation("cannot add zero items".to_owned()));
        }
        let mut inventory = self.router.inventory(player).await?;
        let placement = stacking::place(
            &mut inventory,
            self.max_slots(),
            item,
            quantity,
            item.def().durability,
        );
        if placement.placed == 0 {
            return Err(OpError::Capacity("inventory is full".to_owned()));
        }
        self.router.set_inventory(player, &inventory).await?;
        tracing::debug!(
            player = %player,
            item = %item,
            added = placement.placed,
            overflow = placement.overflow,
            "Added items"
        );
        Ok(AddOutcome {
            slot: placement.first_slot.unwrap_or_default(),
            added: placement.placed,
            overflow: placement.overflow,
        })
    }

    /// Remove exactly `quantity` units from `slot`. Fails if the slot is
    /// empty or holds fewer units than requested.
    pub async fn remove_item(
        &self,
        player: PlayerId,
        slot: u16,
        quantity: u32,
    ) -> Result<u32, OpError> {
        let mut inventory = self.router.inventory(player).await?;
        let held = inventory.get(&slot).map_or(0, |record| record.quantity);
        if held == 0 {
            return Err(OpError::Validation(format!("inventory slot {slot} is empty")));
        }
        if held < quantity {
            return Err(OpError::Validation(format!(
                "slot {slot} holds only {held} units"
            )));
        }
        let removed = stacking::remove(&mut inventory, slot, quantity);
        self.router.set_inventory(player, &inventory).await?;
        Ok(removed)
    }

    /// Move the stack at `from` to `to`: into an empty slot, swapping with
    /// a different item, or merging with the same stackable kind.
    pub async fn move_item(
        &self,
        player: PlayerId,
        from: u16,
        to: u16,
    ) -> Result<MoveOutcome, OpError> {
        let max_slots = self.max_slots();
        if from == to {
            return Err(OpError::Validation("source and destination are the same".to_owned()));
        }
        if from >= max_slots || to >= max_slots {
            return Err(OpError::Validation(format!(
                "slot out of range (0..{max_slots})"
            )));
        }
        let mut inventory = self.router.inventory(player).await?;
        let source = *inventory
            .get(&from)
            .ok_or_else(|| OpError::Validation(format!("inventory slot {from} is empty")))?;

        let outcome = match inventory.get(&to).copied() {
            None => {
                inventory.remove(&from);
                inventory.insert(to, source);
                MoveOutcome::Moved
            }
            Some(dest) if dest.item == source.item && dest.item.max_stack() > 1 => {
                let room = dest.item.max_stack().saturating_sub(dest.quantity);
                if room == 0 {
                    inventory.insert(from, dest);
                    inventory.insert(to, source);
                    MoveOutcome::Swapped
                } else {
                    let take = source.quantity.min(room);
                    inventory.insert(
                        to,
                        SlotRecord {
                            quantity: dest.quantity.saturating_add(take),
                            ..dest
                        },
                    );
                    let remainder = source.quantity.saturating_sub(take);
                    if remainder == 0 {
                        inventory.remove(&from);
                    } else {
                        inventory.insert(
                            from,
                            SlotRecord {
                                quantity: remainder,
                                ..source
                            },
                        );
                    }
                    MoveOutcome::Merged { remainder }
                }
            }
            Some(dest) => {
                inventory.insert(from, dest);
                inventory.insert(to, source);
                MoveOutcome::Swapped
            }
        };
        self.router.set_inventory(player, &inventory).await?;
        Ok(outcome)
    }

    /// Merge split stacks and rewrite the inventory in `order`, compacted
    /// from slot zero.
    pub async fn merge_and_sort(
        &self,
        player: PlayerId,
        order: SortOrder,
    ) -> Result<(), OpError> {
        let mut inventory = self.router.inventory(player).await?;
        sorting::sort(&mut inventory, order, self.max_slots());
        self.router.set_inventory(player, &inventory).await?;
        Ok(())
    }

    // ========================================================================
    // Equipment operations
    // ========================================================================

    /// Equip the stack at `inv_slot`, displacing whatever the target slot
    /// (and, for two-handed weapons, the shield slot) holds.
    pub async fn equip(
        &self,
        player: PlayerId,
        inv_slot: u16,
    ) -> Result<EquipOutcome, OpError> {
        let inventory = self.router.inventory(player).await?;
        let equipment = self.router.equipment(player).await?;
        let skills = self.router.skills(player).await?;
        let mut vitals = self.router.vitals(player).await?;

        let plan = equip::plan_equip(
            &inventory,
            &equipment,
            inv_slot,
            &skills,
            self.max_slots(),
        )?;

        let max_hp = stats::max_hp(&skills, &plan.equipment);
        let current_hp = shift_hp(vitals.current_hp, plan.health_delta, max_hp);

        self.router.set_inventory(player, &plan.inventory).await?;
        self.router.set_equipment(player, &plan.equipment).await?;
        if current_hp != vitals.current_hp {
            vitals.current_hp = current_hp;
            self.router.set_vitals(player, &vitals).await?;
        }
        tracing::debug!(
            player = %player,
            slot = plan.slot.as_str(),
            displaced = plan.displaced.len(),
            "Equipped item"
        );
        Ok(EquipOutcome {
            slot: plan.slot,
            displaced: plan.displaced,
            current_hp,
            max_hp,
        })
    }

    /// Unequip `slot` into the inventory, dropping any remainder at
    /// `drop_at` when given. With no drop tile, a partial fit leaves the
    /// remainder equipped and a zero fit is refused.
    pub async fn unequip(
        &self,
        player: PlayerId,
        slot: EquipSlot,
        drop_at: Option<(&str, i32, i32)>,
    ) -> Result<UnequipOutcome, OpError> {
        let inventory = self.router.inventory(player).await?;
        let equipment = self.router.equipment(player).await?;
        let skills = self.router.skills(player).await?;
        let mut vitals = self.router.vitals(player).await?;

        let mut plan = equip::plan_unequip(&inventory, &equipment, slot, self.max_slots())?;

        let mut to_ground = None;
        let mut health_lost = plan.health_lost;
        if let Some(remainder) = plan.remainder {
            match drop_at {
                Some((map_id, x, y)) => {
                    let record =
                        self.ground_record(remainder, map_id, x, y, Some(player));
                    to_ground = Some(record.id);
                    self.router.put_ground_item(&record).await?;
                }
                None if plan.moved == 0 => {
                    return Err(OpError::Capacity("inventory is full".to_owned()));
                }
                None => {
                    // Partial fit with nowhere to drop: the rest stays worn.
                    plan.equipment.insert(slot, remainder);
                    health_lost = 0;
                }
            }
        }

        let max_hp = stats::max_hp(&skills, &plan.equipment);
        let current_hp = shift_hp(vitals.current_hp, health_lost.saturating_neg(), max_hp);

        self.router.set_inventory(player, &plan.inventory).await?;
        self.router.set_equipment(player, &plan.equipment).await?;
        if current_hp != vitals.current_hp {
            vitals.current_hp = current_hp;
            self.router.set_vitals(player, &vitals).await?;
        }
        Ok(UnequipOutcome {
            to_inventory: plan.moved,
            to_ground,
            current_hp,
            max_hp,
        })
    }

    /// Consume up to `requested` units from the ammo slot, for ranged
    /// attacks. Fails only when nothing is equipped there.
    pub async fn consume_ammo(
        &self,
        player: PlayerId,
        requested: u32,
    ) -> Result<AmmoOutcome, OpError> {
        if requested == 0 {
            return Err(OpError::Validation("cannot consume zero ammunition".to_owned()));
        }
        let mut equipment = self.router.equipment(player).await?;
        let worn = equipment
            .get(&EquipSlot::Ammo)
            .copied()
            .ok_or_else(|| OpError::Validation("no ammunition equipped".to_owned()))?;
        let consumed = worn.quantity.min(requested);
        let remaining = worn.quantity.saturating_sub(consumed);
        if remaining == 0 {
            equipment.remove(&EquipSlot::Ammo);
        } else {
            equipment.insert(
                EquipSlot::Ammo,
                SlotRecord {
                    quantity: remaining,
                    ..worn
                },
            );
        }
        self.router.set_equipment(player, &equipment).await?;
        Ok(AmmoOutcome { consumed, remaining })
    }

    /// Wear down the item equipped in `slot` by `amount` durability, for
    /// combat hits. Gear without durability never degrades. Durability
    /// floors at zero; the item stays equipped but is reported broken.
    pub async fn degrade_equipment(
        &self,
        player: PlayerId,
        slot: EquipSlot,
        amount: u32,
    ) -> Result<DurabilityOutcome, OpError> {
        let mut equipment = self.router.equipment(player).await?;
        let worn = equipment
            .get(&slot)
            .copied()
            .ok_or_else(|| OpError::Validation(format!("nothing equipped in {}", slot.as_str())))?;
        let Some(durability) = worn.durability else {
            return Ok(DurabilityOutcome {
                remaining: None,
                broke: false,
            });
        };
        let remaining = durability.saturating_sub(amount);
        equipment.insert(
            slot,
            SlotRecord {
                durability: Some(remaining),
                ..worn
            },
        );
        self.router.set_equipment(player, &equipment).await?;
        let broke = remaining == 0 && durability > 0;
        if broke {
            tracing::warn!(
                player = %player,
                slot = slot.as_str(),
                item = %worn.item,
                "Equipment broke"
            );
        }
        Ok(DurabilityOutcome {
            remaining: Some(remaining),
            broke,
        })
    }

    /// Total combat bonuses from the player's current equipment set.
    pub async fn stats(&self, player: PlayerId) -> Result<ItemStats, OpError> {
        let equipment = self.router.equipment(player).await?;
        Ok(stats::equipment_stats(&equipment))
    }

    /// Maximum hit points: Hitpoints level plus equipped health bonuses.
    pub async fn max_hp(&self, player: PlayerId) -> Result<u32, OpError> {
        let skills = self.router.skills(player).await?;
        let equipment = self.router.equipment(player).await?;
        Ok(stats::max_hp(&skills, &equipment))
    }

    // ========================================================================
    // Ground operations
    // ========================================================================

    /// Drop `quantity` units from `slot` at a tile. The ground record is
    /// created first; if the inventory decrement then fails, the record is
    /// rolled back.
    pub async fn drop_item(
        &self,
        player: PlayerId,
        slot: u16,
        quantity: u32,
        map_id: &str,
        x: i32,
        y: i32,
    ) -> Result<DropOutcome, OpError> {
        let mut inventory = self.router.inventory(player).await?;
        let held = *inventory
            .get(&slot)
            .ok_or_else(|| OpError::Validation(format!("inventory slot {slot} is empty")))?;
        if quantity == 0 || quantity > held.quantity {
            return Err(OpError::Validation(format!(
                "cannot drop {quantity} of {} units",
                held.quantity
            )));
        }

        let stack = SlotRecord {
            item: held.item,
            quantity,
            durability: (quantity == held.quantity).then_some(held.durability).flatten(),
        };
        let record = self.ground_record(stack, map_id, x, y, Some(player));
        let ground_id = record.id;
        self.router.put_ground_item(&record).await?;

        stacking::remove(&mut inventory, slot, quantity);
        if let Err(e) = self.router.set_inventory(player, &inventory).await {
            if let Err(rollback) = self.router.remove_ground_item(ground_id, map_id).await {
                tracing::error!(
                    ground_item = %ground_id,
                    error = %rollback,
                    "Failed to roll back ground record after drop failure"
                );
            }
            return Err(e.into());
        }
        tracing::debug!(
            player = %player,
            item = %held.item,
            quantity,
            ground_item = %ground_id,
            "Dropped items"
        );
        Ok(DropOutcome { ground_id })
    }

    /// Pick a ground stack up from the tile the player stands on.
    ///
    /// The whole check-and-take runs under a per-item advisory transaction
    /// lock, so two players reaching for the same stack serialize and the
    /// loser sees it gone or shrunk. A despawned record found here is
    /// deleted on the spot. A full inventory takes what fits and leaves the
    /// rest on the ground.
    pub async fn pickup(
        &self,
        player: PlayerId,
        ground_id: GroundItemId,
        map_id: &str,
        x: i32,
        y: i32,
    ) -> Result<PickupOutcome, OpError> {
        let store = GroundItemStore::new(self.router.db().pool());
        let mut tx = store.begin().await?;
        GroundItemStore::lock_for_pickup(&mut tx, ground_id).await?;

        let record = self
            .router
            .ground_item(ground_id)
            .await?
            .ok_or_else(|| OpError::Conflict("item is no longer there".to_owned()))?;

        if record.map_id != map_id || record.x != x || record.y != y {
            return Err(OpError::Validation("item is not at that tile".to_owned()));
        }
        let now = unix_now();
        if record.is_despawned(now) {
            self.router
                .remove_ground_item(ground_id, &record.map_id)
                .await?;
            return Err(OpError::Conflict("item has despawned".to_owned()));
        }
        if !record.is_lootable_by(player, now) {
            return Err(OpError::Conflict("item is loot-protected".to_owned()));
        }

        let mut inventory = self.router.inventory(player).await?;
        let placement = stacking::place(
            &mut inventory,
            self.max_slots(),
            record.item,
            record.quantity,
            record.durability,
        );
        if placement.placed == 0 {
            return Err(OpError::Capacity("inventory is full".to_owned()));
        }

        if placement.overflow > 0 {
            let mut rest = record.clone();
            rest.quantity = placement.overflow;
            self.router.put_ground_item(&rest).await?;
        } else {
            self.router
                .remove_ground_item(ground_id, &record.map_id)
                .await?;
        }
        if let Err(e) = self.router.set_inventory(player, &inventory).await {
            if let Err(rollback) = self.router.put_ground_item(&record).await {
                tracing::error!(
                    ground_item = %ground_id,
                    error = %rollback,
                    "Failed to restore ground record after pickup failure"
                );
            }
            return Err(e.into());
        }
        tx.commit().await.map_err(ironvale_db::DbError::from)?;

        tracing::debug!(
            player = %player,
            item = %record.item,
            taken = placement.placed,
            remainder = placement.overflow,
            "Picked up items"
        );
        Ok(PickupOutcome {
            item: record.item,
            quantity: placement.placed,
            slot: placement.first_slot.unwrap_or_default(),
            remainder: placement.overflow,
        })
    }

    /// Drop everything on death: every inventory and equipment stack
    /// becomes its own ground record at the death tile, then both
    /// containers are cleared.
    ///
    /// The whole drop is one unit. If any ground write or container clear
    /// fails, every record created so far is removed again and the
    /// containers keep their stacks, so the items exist in exactly one
    /// place either way.
    pub async fn drop_all_on_death(
        &self,
        player: PlayerId,
        map_id: &str,
        x: i32,
        y: i32,
    ) -> Result<DeathOutcome, OpError> {
        let inventory = self.router.inventory(player).await?;
        let equipment = self.router.equipment(player).await?;

        let mut created: Vec<GroundItemId> = Vec::new();
        let stacks = inventory
            .values()
            .copied()
            .chain(equipment.values().copied());
        for stack in stacks {
            let record = self.ground_record(stack, map_id, x, y, Some(player));
            if let Err(e) = self.router.put_ground_item(&record).await {
                self.undo_ground_records(&created, map_id).await;
                return Err(e.into());
            }
            created.push(record.id);
        }

        if let Err(e) = self.router.set_inventory(player, &BTreeMap::new()).await {
            self.undo_ground_records(&created, map_id).await;
            return Err(e.into());
        }
        if let Err(e) = self.router.set_equipment(player, &BTreeMap::new()).await {
            self.undo_ground_records(&created, map_id).await;
            if let Err(restore) = self.router.set_inventory(player, &inventory).await {
                tracing::error!(
                    player = %player,
                    error = %restore,
                    "Failed to restore inventory after death-drop failure"
                );
            }
            return Err(e.into());
        }
        let dropped_stacks = u32::try_from(created.len()).unwrap_or(u32::MAX);
        tracing::info!(
            player = %player,
            map = map_id,
            stacks = dropped_stacks,
            "Dropped all items on death"
        );
        Ok(DeathOutcome { dropped_stacks })
    }

    /// Best-effort removal of ground records created by a failed
    /// multi-record operation.
    async fn undo_ground_records(&self, ids: &[GroundItemId], map_id: &str) {
        for &id in ids {
            if let Err(e) = self.router.remove_ground_item(id, map_id).await {
                tracing::error!(
                    ground_item = %id,
                    error = %e,
                    "Failed to roll back ground record"
                );
            }
        }
    }
}

/// Apply a signed health-bonus change to current HP, clamped to
/// `1..=max_hp`.
fn shift_hp(current: u32, delta: i32, max_hp: u32) -> u32 {
    let shifted = i64::from(current).saturating_add(i64::from(delta));
    let clamped = shifted.clamp(1, i64::from(max_hp.max(1)));
    u32::try_from(clamped).unwrap_or(1)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hp_shift_clamps_both_ends() {
        assert_eq!(shift_hp(10, 5, 20), 15);
        assert_eq!(shift_hp(18, 5, 20), 20);
        assert_eq!(shift_hp(3, -5, 20), 1);
        assert_eq!(shift_hp(10, 0, 20), 10);
    }
}
