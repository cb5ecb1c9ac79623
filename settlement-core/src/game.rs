// Game context: the single owner of map, players, units and settlements

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use slotmap::SlotMap;

use crate::agents::{Player, Unit, UnitRole};
use crate::config::GameConfig;
use crate::error::{Result, SettlementError};
use crate::geography::Map;
use crate::settlement::{Settlement, SettlementKind, VillageData};
use crate::types::{GoodsRegistry, PlayerId, SettlementId, TilePos, UnitId};

/// Receives settlement ownership changes. Called synchronously; it gets
/// handles only and cannot reach back into the game.
pub trait GameObjectListener {
    fn owner_changed(&mut self, settlement: SettlementId, old_owner: PlayerId, new_owner: PlayerId);
}

impl<F> GameObjectListener for F
where
    F: FnMut(SettlementId, PlayerId, PlayerId),
{
    fn owner_changed(&mut self, settlement: SettlementId, old_owner: PlayerId, new_owner: PlayerId) {
        self(settlement, old_owner, new_owner)
    }
}

/// Complete state of one game
pub struct Game {
    pub turn: u32,
    pub map: Map,
    pub players: SlotMap<PlayerId, Player>,
    pub units: SlotMap<UnitId, Unit>,
    pub registry: GoodsRegistry,
    pub config: GameConfig,

    // Ordered so every sweep over settlements is deterministic
    pub(crate) settlements: BTreeMap<SettlementId, Settlement>,

    listener: Option<Box<dyn GameObjectListener>>,
    next_settlement_id: u32,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("turn", &self.turn)
            .field("players", &self.players.len())
            .field("units", &self.units.len())
            .field("settlements", &self.settlements.len())
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl Game {
    pub fn new(map: Map, registry: GoodsRegistry, config: GameConfig) -> Self {
        Self {
            turn: 0,
            map,
            players: SlotMap::with_key(),
            units: SlotMap::with_key(),
            registry,
            config,
            settlements: BTreeMap::new(),
            listener: None,
            next_settlement_id: 0,
        }
    }

    /// Classic goods and default rule constants.
    pub fn with_map(map: Map) -> Self {
        Self::new(map, GoodsRegistry::classic(), GameConfig::default())
    }

    // === Players & units ===

    pub fn add_player(&mut self, player: Player) -> PlayerId {
        self.players.insert(player)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub(crate) fn player_or_err(&self, id: PlayerId) -> Result<&Player> {
        self.players.get(id).ok_or(SettlementError::UnknownPlayer(id))
    }

    pub(crate) fn player_mut_or_err(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .get_mut(id)
            .ok_or(SettlementError::UnknownPlayer(id))
    }

    pub fn add_unit(&mut self, owner: PlayerId, role: UnitRole) -> Result<UnitId> {
        self.player_or_err(owner)?;
        Ok(self.units.insert(Unit::new(owner, role)))
    }

    // === Settlement lookup ===

    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.get(&id)
    }

    /// Mutable access for name and feature edits; ownership and placement
    /// only change through the game's settlement operations.
    pub fn settlement_mut(&mut self, id: SettlementId) -> Option<&mut Settlement> {
        self.settlements.get_mut(&id)
    }

    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.values()
    }

    pub fn settlement_ids(&self) -> Vec<SettlementId> {
        self.settlements.keys().copied().collect()
    }

    /// The settlement standing on `pos`, if any.
    pub fn settlement_at(&self, pos: TilePos) -> Option<SettlementId> {
        self.map.tile(pos).and_then(|t| t.settlement())
    }

    pub(crate) fn settlement_or_err(&self, id: SettlementId) -> Result<&Settlement> {
        self.settlements
            .get(&id)
            .ok_or(SettlementError::UnknownSettlement(id))
    }

    pub(crate) fn settlement_mut_internal(&mut self, id: SettlementId) -> Result<&mut Settlement> {
        self.settlements
            .get_mut(&id)
            .ok_or(SettlementError::UnknownSettlement(id))
    }

    pub(crate) fn owner_of(&self, id: SettlementId) -> Result<PlayerId> {
        self.settlement_or_err(id)?
            .owner
            .ok_or(SettlementError::Unowned(id))
    }

    // === Listener ===

    pub fn set_listener(&mut self, listener: impl GameObjectListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub(crate) fn notify_owner_changed(
        &mut self,
        settlement: SettlementId,
        old_owner: PlayerId,
        new_owner: PlayerId,
    ) {
        if let Some(listener) = self.listener.as_mut() {
            listener.owner_changed(settlement, old_owner, new_owner);
        }
    }

    // === Exploration & visibility ===

    /// Mark `pos` explored by `player` and start tracking their memory of it.
    pub fn set_explored(&mut self, player: PlayerId, pos: TilePos) -> Result<()> {
        let tile = self.map.tile_mut(pos).ok_or(SettlementError::OffMap(pos))?;
        tile.remember_for(player);
        self.player_mut_or_err(player)?.set_explored(pos);
        Ok(())
    }

    /// Refresh every player's remembered view of `pos`.
    pub fn update_player_explored_tiles(&mut self, pos: TilePos) {
        if let Some(tile) = self.map.tile_mut(pos) {
            tile.update_player_explored_tiles();
        }
    }

    /// Whether `player` currently sees `pos` from one of its settlements.
    /// Rebuilds the player's memo if it was invalidated.
    pub fn can_see(&mut self, player: PlayerId, pos: TilePos) -> Result<bool> {
        if let Some(cache) = self.player_or_err(player)?.can_see_cache() {
            return Ok(cache.contains(&pos));
        }
        let mut visible = HashSet::new();
        for id in self.player_or_err(player)?.settlements().to_vec() {
            let Some(settlement) = self.settlements.get(&id) else {
                continue;
            };
            let center = settlement.tile;
            visible.insert(center);
            let sight = self.line_of_sight(id)?;
            visible.extend(self.map.surrounding_tiles(center, sight));
        }
        let seen = visible.contains(&pos);
        self.player_mut_or_err(player)?.set_can_see_cache(visible);
        Ok(seen)
    }

    // === Settlement lifecycle ===

    /// Establish a settlement on `pos` without placing it on the map.
    ///
    /// A colony worker already on the tile is moved indoors; a village
    /// already owning it is only reported.
    pub fn new_settlement(
        &mut self,
        owner: PlayerId,
        name: impl Into<String>,
        pos: TilePos,
        kind: SettlementKind,
    ) -> Result<SettlementId> {
        self.player_or_err(owner)?;
        let tile = self.map.tile(pos).ok_or(SettlementError::OffMap(pos))?;
        if let Some(existing) = tile.settlement() {
            return Err(SettlementError::TileOccupied { pos, existing });
        }

        if let Some(previous) = tile.owning_settlement() {
            match self.settlements.get_mut(&previous).map(|s| &mut s.kind) {
                Some(SettlementKind::Colony(colony)) => {
                    colony.relocate_workers(pos);
                }
                Some(SettlementKind::NativeVillage(_)) => {
                    #[cfg(feature = "instrument")]
                    tracing::warn!(
                        target: "diagnostic",
                        x = pos.x,
                        y = pos.y,
                        owning_settlement = previous.0,
                        "a native settlement already owns the tile"
                    );
                }
                None => {
                    #[cfg(feature = "instrument")]
                    tracing::warn!(
                        target: "diagnostic",
                        x = pos.x,
                        y = pos.y,
                        owning_settlement = previous.0,
                        "tile is owned by an unknown settlement"
                    );
                }
            }
        }

        let id = self.allocate_settlement_id();
        let capacity = match kind {
            SettlementKind::Colony(_) => self.config.colony_capacity,
            SettlementKind::NativeVillage(_) => self.config.village_capacity,
        };
        let settlement = Settlement::new(id, owner, name, pos, capacity, kind);
        self.settlements.insert(id, settlement);
        self.player_mut_or_err(owner)?.add_settlement(id);
        Ok(id)
    }

    /// Create and place a colony.
    pub fn found_colony(
        &mut self,
        owner: PlayerId,
        name: impl Into<String>,
        pos: TilePos,
    ) -> Result<SettlementId> {
        let id = self.new_settlement(owner, name, pos, SettlementKind::colony())?;
        self.place_settlement(id)?;
        Ok(id)
    }

    /// Create and place a native village.
    pub fn found_village(
        &mut self,
        owner: PlayerId,
        name: impl Into<String>,
        pos: TilePos,
        village: VillageData,
    ) -> Result<SettlementId> {
        let id = self.new_settlement(owner, name, pos, SettlementKind::NativeVillage(village))?;
        self.place_settlement(id)?;
        Ok(id)
    }

    /// Grant or revoke capital status. A new capital demotes any other
    /// capital of the same owner.
    pub fn set_capital(&mut self, id: SettlementId, is_capital: bool) -> Result<()> {
        let owner = self.owner_of(id)?;
        if is_capital {
            let others: Vec<SettlementId> = self.player_or_err(owner)?.settlements().to_vec();
            for other in others {
                if let Some(s) = self.settlements.get_mut(&other) {
                    s.is_capital = false;
                }
            }
        }
        self.settlement_mut_internal(id)?.is_capital = is_capital;
        Ok(())
    }

    /// Run end-of-turn processing for every settlement, in id order.
    pub fn advance_turn(&mut self) -> Result<()> {
        for id in self.settlement_ids() {
            self.new_turn(id)?;
        }
        self.turn += 1;
        Ok(())
    }

    pub(crate) fn allocate_settlement_id(&mut self) -> SettlementId {
        let id = SettlementId::new(self.next_settlement_id);
        self.next_settlement_id += 1;
        id
    }

    /// Keep freshly allocated ids clear of one supplied from outside.
    pub(crate) fn reserve_settlement_id(&mut self, id: SettlementId) {
        self.next_settlement_id = self.next_settlement_id.max(id.0 + 1);
    }
}
