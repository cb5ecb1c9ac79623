// Colony and native village payloads, and the per-variant hooks

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use super::SettlementType;
use super::features::{ABILITY_FORT, ABILITY_FORTRESS, ABILITY_STOCKADE};
use crate::agents::PlayerKind;
use crate::error::{Result, SettlementError};
use crate::game::Game;
use crate::types::{AbstractGoods, GoodsType, PlayerId, SettlementId, TilePos, UnitId};

/// Name shown for a village whose tribe the observer has not met.
pub const UNKNOWN_VILLAGE_NAME: &str = "Unknown village";

// === PAYLOADS ===

/// A colonist working a specific tile for a specific goods type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkAssignment {
    pub pos: TilePos,
    pub unit: UnitId,
    pub goods: GoodsType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColonyData {
    /// At most one worker per tile.
    work_tiles: Vec<WorkAssignment>,
    /// Units inside the colony but not on a tile.
    indoor: Vec<UnitId>,
}

impl ColonyData {
    pub fn work_tiles(&self) -> &[WorkAssignment] {
        &self.work_tiles
    }

    pub fn indoor(&self) -> &[UnitId] {
        &self.indoor
    }

    pub fn worker_on(&self, pos: TilePos) -> Option<&WorkAssignment> {
        self.work_tiles.iter().find(|w| w.pos == pos)
    }

    fn contains(&self, unit: UnitId) -> bool {
        self.indoor.contains(&unit) || self.work_tiles.iter().any(|w| w.unit == unit)
    }

    fn remove(&mut self, unit: UnitId) -> bool {
        let before = self.indoor.len() + self.work_tiles.len();
        self.indoor.retain(|u| *u != unit);
        self.work_tiles.retain(|w| w.unit != unit);
        before != self.indoor.len() + self.work_tiles.len()
    }

    /// Move whoever works `pos` back inside the colony.
    pub(crate) fn relocate_workers(&mut self, pos: TilePos) -> Vec<UnitId> {
        let (moved, kept): (Vec<_>, Vec<_>) =
            self.work_tiles.drain(..).partition(|w| w.pos == pos);
        self.work_tiles = kept;
        let units: Vec<UnitId> = moved.iter().map(|w| w.unit).collect();
        self.indoor.extend(units.iter().copied());
        units
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
pub enum VillageKind {
    Camp,
    Village,
    AztecCity,
    IncaCity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VillageData {
    pub tribe: String,
    pub kind: VillageKind,
    /// Gold handed over when the village is captured.
    pub treasure: u32,
    units: Vec<UnitId>,
    contacted: BTreeSet<PlayerId>,
}

impl VillageData {
    pub fn new(tribe: impl Into<String>, kind: VillageKind) -> Self {
        Self {
            tribe: tribe.into(),
            kind,
            treasure: 0,
            units: Vec::new(),
            contacted: BTreeSet::new(),
        }
    }

    pub fn with_treasure(mut self, treasure: u32) -> Self {
        self.treasure = treasure;
        self
    }

    pub fn has_contacted(&self, player: PlayerId) -> bool {
        self.contacted.contains(&player)
    }
}

/// Variant-specific state of a settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SettlementKind {
    Colony(ColonyData),
    NativeVillage(VillageData),
}

impl SettlementKind {
    pub fn colony() -> Self {
        Self::Colony(ColonyData::default())
    }

    pub fn unit_count(&self) -> u32 {
        match self {
            Self::Colony(colony) => (colony.indoor.len() + colony.work_tiles.len()) as u32,
            Self::NativeVillage(village) => village.units.len() as u32,
        }
    }

    pub fn units(&self) -> Vec<UnitId> {
        match self {
            Self::Colony(colony) => colony
                .work_tiles
                .iter()
                .map(|w| w.unit)
                .chain(colony.indoor.iter().copied())
                .collect(),
            Self::NativeVillage(village) => village.units.clone(),
        }
    }

    fn contains_unit(&self, unit: UnitId) -> bool {
        match self {
            Self::Colony(colony) => colony.contains(unit),
            Self::NativeVillage(village) => village.units.contains(&unit),
        }
    }
}

/// Anything that can be placed in a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locatable {
    Unit(UnitId),
    Goods(AbstractGoods),
}

// ============================================================================
// Variant hooks
// ============================================================================

impl Game {
    pub fn unit_count(&self, id: SettlementId) -> Result<u32> {
        Ok(self.settlement_or_err(id)?.unit_count())
    }

    pub fn settlement_type(&self, id: SettlementId) -> Result<SettlementType> {
        let settlement = self.settlement_or_err(id)?;
        let owner_kind = settlement
            .owner
            .and_then(|o| self.players.get(o))
            .map(|p| p.kind);
        if owner_kind == Some(PlayerKind::Undead) {
            return Ok(SettlementType::Undead);
        }
        let tag = match &settlement.kind {
            SettlementKind::NativeVillage(village) => match village.kind {
                VillageKind::Camp => SettlementType::IndianCamp,
                VillageKind::Village => SettlementType::IndianVillage,
                VillageKind::AztecCity => SettlementType::AztecCity,
                VillageKind::IncaCity => SettlementType::IncaCity,
            },
            SettlementKind::Colony(_) => {
                let features = &settlement.features;
                let fortress = features.has_ability(ABILITY_FORTRESS);
                let fort = fortress || features.has_ability(ABILITY_FORT);
                let stockade = fort || features.has_ability(ABILITY_STOCKADE);
                match settlement.unit_count() {
                    0..=3 if stockade => SettlementType::SmallStockade,
                    0..=3 => SettlementType::SmallColony,
                    4..=7 if fort => SettlementType::MediumFort,
                    4..=7 if stockade => SettlementType::MediumStockade,
                    4..=7 => SettlementType::MediumColony,
                    _ if fortress => SettlementType::LargeFortress,
                    _ if fort => SettlementType::LargeFort,
                    _ if stockade => SettlementType::LargeStockade,
                    _ => SettlementType::LargeColony,
                }
            }
        };
        Ok(tag)
    }

    /// Pick the unit that defends against `attacker`: strongest defence,
    /// lowest id on ties. Units belonging to the attacker's owner never
    /// defend.
    pub fn defending_unit(&self, id: SettlementId, attacker: UnitId) -> Result<Option<UnitId>> {
        let settlement = self.settlement_or_err(id)?;
        let attacker_owner = self
            .units
            .get(attacker)
            .ok_or(SettlementError::UnknownUnit(attacker))?
            .owner;

        let mut best: Option<(u32, UnitId)> = None;
        for unit_id in settlement.units() {
            let Some(unit) = self.units.get(unit_id) else {
                continue;
            };
            if unit.owner == attacker_owner {
                continue;
            }
            let defence = unit.role.defence();
            let better = match best {
                None => true,
                Some((d, u)) => defence > d || (defence == d && unit_id < u),
            };
            if better {
                best = Some((defence, unit_id));
            }
        }
        Ok(best.map(|(_, u)| u))
    }

    /// Gold an attacker takes on capture.
    pub fn plunder(&self, id: SettlementId) -> Result<u32> {
        let settlement = self.settlement_or_err(id)?;
        match &settlement.kind {
            SettlementKind::NativeVillage(village) => Ok(if settlement.is_capital {
                village.treasure.saturating_mul(2)
            } else {
                village.treasure
            }),
            SettlementKind::Colony(_) => {
                let owner = self.owner_of(id)?;
                let player = self.player_or_err(owner)?;
                let total: u64 = player
                    .settlements()
                    .iter()
                    .filter_map(|s| self.settlements.get(s))
                    .filter(|s| s.is_colony())
                    .map(|s| u64::from(s.unit_count()))
                    .sum();
                if total == 0 {
                    return Ok(0);
                }
                let share = u64::from(player.gold) * u64::from(settlement.unit_count()) / total;
                Ok(share as u32)
            }
        }
    }

    /// Display name as `observer` knows it.
    pub fn name_for(&self, id: SettlementId, observer: PlayerId) -> Result<String> {
        let settlement = self.settlement_or_err(id)?;
        let known = match &settlement.kind {
            SettlementKind::Colony(_) => true,
            SettlementKind::NativeVillage(village) => {
                settlement.owner == Some(observer) || village.has_contacted(observer)
            }
        };
        Ok(if known {
            settlement.name().to_string()
        } else {
            UNKNOWN_VILLAGE_NAME.to_string()
        })
    }

    /// Record that `player` has met the people of a village.
    pub fn make_contact(&mut self, id: SettlementId, player: PlayerId) -> Result<()> {
        self.player_or_err(player)?;
        match &mut self.settlement_mut_internal(id)?.kind {
            SettlementKind::NativeVillage(village) => {
                village.contacted.insert(player);
                Ok(())
            }
            SettlementKind::Colony(_) => Err(SettlementError::NotAVillage(id)),
        }
    }

    /// Per-turn production of `goods`.
    ///
    /// A colony harvests the food of its centre tile plus every worked tile
    /// assigned to `goods`. A village gathers half the yield of its owned
    /// tiles, rounded down.
    pub fn production_of(&self, id: SettlementId, goods: GoodsType) -> Result<u32> {
        let settlement = self.settlement_or_err(id)?;
        let yield_at = |pos: TilePos| {
            self.map
                .tile(pos)
                .map_or(0, |t| t.terrain.production(goods))
        };
        match &settlement.kind {
            SettlementKind::Colony(colony) => {
                let center = if self.registry.is_food(goods) {
                    yield_at(settlement.tile)
                } else {
                    0
                };
                let worked: u32 = colony
                    .work_tiles
                    .iter()
                    .filter(|w| w.goods == goods)
                    .map(|w| yield_at(w.pos))
                    .sum();
                Ok(center + worked)
            }
            SettlementKind::NativeVillage(_) => {
                let gathered: u32 = self
                    .owned_tiles(id)?
                    .into_iter()
                    .map(yield_at)
                    .sum();
                Ok(gathered / 2)
            }
        }
    }

    /// End-of-turn processing: store production, then feed the units.
    ///
    /// Production beyond capacity is wasted; hunger beyond stock is logged as
    /// starvation. Neither is an error.
    pub fn new_turn(&mut self, id: SettlementId) -> Result<()> {
        let storable: Vec<GoodsType> = self
            .registry
            .iter()
            .filter(|(_, spec)| spec.storable)
            .map(|(goods, _)| goods)
            .collect();
        let mut produced = Vec::with_capacity(storable.len());
        for goods in storable {
            produced.push((goods, self.production_of(id, goods)?));
        }

        for (goods, qty) in produced {
            if qty == 0 {
                continue;
            }
            let canonical = self.registry.stored_as(goods);
            let store = &mut self.settlement_mut_internal(id)?.goods;
            let stored = qty.min(store.space_for(canonical));
            store.add(canonical, stored)?;
            if stored < qty {
                #[cfg(feature = "instrument")]
                tracing::info!(
                    target: "goods",
                    turn = self.turn,
                    settlement = id.0,
                    goods = goods.0,
                    wasted = qty - stored,
                );
            }
        }

        let demand = self.food_consumption(id)?;
        let available = self.food_count(id)?;
        self.remove_food(id, demand.min(available))?;
        if demand > available {
            #[cfg(feature = "instrument")]
            tracing::warn!(
                target: "food",
                turn = self.turn,
                settlement = id.0,
                demand = demand,
                available = available,
                "settlement is starving"
            );
        }
        Ok(())
    }

    // === Collection surface ===

    pub fn can_add(&self, id: SettlementId, item: Locatable) -> Result<bool> {
        let settlement = self.settlement_or_err(id)?;
        match item {
            Locatable::Unit(unit_id) => {
                let unit = self
                    .units
                    .get(unit_id)
                    .ok_or(SettlementError::UnknownUnit(unit_id))?;
                Ok(settlement.owner == Some(unit.owner) && !settlement.kind.contains_unit(unit_id))
            }
            Locatable::Goods(goods) => {
                if !self.registry.is_storable(goods.goods_type) {
                    return Ok(false);
                }
                let canonical = self.registry.stored_as(goods.goods_type);
                Ok(settlement.goods.space_for(canonical) >= goods.amount)
            }
        }
    }

    pub fn add(&mut self, id: SettlementId, item: Locatable) -> Result<()> {
        match item {
            Locatable::Unit(unit) => {
                if !self.can_add(id, item)? {
                    return Err(SettlementError::CannotAdd {
                        unit,
                        settlement: id,
                    });
                }
                // A unit lives in one settlement at a time
                let holders: Vec<SettlementId> = self
                    .settlements
                    .iter()
                    .filter(|(other, s)| **other != id && s.kind.contains_unit(unit))
                    .map(|(other, _)| *other)
                    .collect();
                for holder in holders {
                    self.remove(holder, Locatable::Unit(unit))?;
                }
                match &mut self.settlement_mut_internal(id)?.kind {
                    SettlementKind::Colony(colony) => colony.indoor.push(unit),
                    SettlementKind::NativeVillage(village) => village.units.push(unit),
                }
                Ok(())
            }
            Locatable::Goods(goods) => self.add_goods(id, goods.goods_type, goods.amount),
        }
    }

    pub fn remove(&mut self, id: SettlementId, item: Locatable) -> Result<()> {
        match item {
            Locatable::Unit(unit) => {
                let removed = match &mut self.settlement_mut_internal(id)?.kind {
                    SettlementKind::Colony(colony) => colony.remove(unit),
                    SettlementKind::NativeVillage(village) => {
                        let before = village.units.len();
                        village.units.retain(|u| *u != unit);
                        before != village.units.len()
                    }
                };
                if removed {
                    Ok(())
                } else {
                    Err(SettlementError::NotPresent {
                        unit,
                        settlement: id,
                    })
                }
            }
            Locatable::Goods(goods) => self.remove_goods(id, goods.goods_type, goods.amount),
        }
    }

    pub fn contains(&self, id: SettlementId, item: Locatable) -> Result<bool> {
        match item {
            Locatable::Unit(unit) => Ok(self.settlement_or_err(id)?.kind.contains_unit(unit)),
            Locatable::Goods(goods) => {
                Ok(self.goods_count(id, goods.goods_type)? >= goods.amount)
            }
        }
    }

    // === Colony work assignments ===

    /// Put a colony's unit to work on one of the colony's tiles.
    pub fn assign_worker(
        &mut self,
        id: SettlementId,
        unit: UnitId,
        pos: TilePos,
        goods: GoodsType,
    ) -> Result<()> {
        let settlement = self.settlement_or_err(id)?;
        let workable = pos != settlement.tile
            && self.map.tile(pos).and_then(|t| t.owning_settlement()) == Some(id);
        let SettlementKind::Colony(colony) = &settlement.kind else {
            return Err(SettlementError::NotAColony(id));
        };
        if !colony.contains(unit) {
            return Err(SettlementError::NotPresent {
                unit,
                settlement: id,
            });
        }
        let occupied = colony.worker_on(pos).is_some_and(|w| w.unit != unit);
        if !workable || occupied {
            return Err(SettlementError::NotWorkable { pos, settlement: id });
        }

        if let SettlementKind::Colony(colony) = &mut self.settlement_mut_internal(id)?.kind {
            colony.remove(unit);
            colony.work_tiles.push(WorkAssignment { pos, unit, goods });
            colony.work_tiles.sort_by_key(|w| w.pos);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_relocate_moves_only_the_tile_worker_indoors() {
        let mut units: SlotMap<UnitId, ()> = SlotMap::with_key();
        let a = units.insert(());
        let b = units.insert(());
        let mut colony = ColonyData::default();
        colony.work_tiles.push(WorkAssignment {
            pos: TilePos::new(1, 1),
            unit: a,
            goods: crate::types::goods::classic::FOOD,
        });
        colony.work_tiles.push(WorkAssignment {
            pos: TilePos::new(2, 1),
            unit: b,
            goods: crate::types::goods::classic::ORE,
        });

        let moved = colony.relocate_workers(TilePos::new(1, 1));
        assert_eq!(moved, vec![a]);
        assert_eq!(colony.indoor(), &[a]);
        assert!(colony.worker_on(TilePos::new(1, 1)).is_none());
        assert!(colony.worker_on(TilePos::new(2, 1)).is_some());
        assert_eq!(SettlementKind::Colony(colony).unit_count(), 2);
    }

    #[test]
    fn test_adding_a_unit_moves_it_between_settlements() {
        use crate::agents::{NationType, Player, PlayerKind, UnitRole};
        use crate::geography::Map;

        let mut game = Game::with_map(Map::from_rows(&["......."; 3]).unwrap());
        let dutch = game.add_player(Player::new(
            "Dutch",
            PlayerKind::European,
            NationType::european(),
        ));
        let a = game.found_colony(dutch, "A", TilePos::new(1, 1)).unwrap();
        let b = game.found_colony(dutch, "B", TilePos::new(5, 1)).unwrap();
        let unit = game.add_unit(dutch, UnitRole::Colonist).unwrap();

        game.add(a, Locatable::Unit(unit)).unwrap();
        game.add(b, Locatable::Unit(unit)).unwrap();

        assert!(!game.contains(a, Locatable::Unit(unit)).unwrap());
        assert!(game.contains(b, Locatable::Unit(unit)).unwrap());
        assert_eq!(game.unit_count(a).unwrap(), 0);

        game.dispose_settlement(a).unwrap();
        assert!(game.units.get(unit).is_some());
        assert_eq!(game.unit_count(b).unwrap(), 1);
        assert_eq!(game.food_consumption(b).unwrap(), 2);
    }
}
