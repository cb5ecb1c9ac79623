// A single map cell and the ownership pointers settlements maintain on it

use std::collections::HashMap;

use super::terrain::TerrainType;
use crate::types::{PlayerId, SettlementId, TilePos};

/// What a player last saw of a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileMemory {
    pub owner: Option<PlayerId>,
    pub owning_settlement: Option<SettlementId>,
    pub settlement: Option<SettlementId>,
}

/// A map cell.
///
/// `owner` is the player that politically holds the land; `owning_settlement`
/// is the settlement working it. When `owning_settlement` is set, `owner`
/// equals that settlement's owner. The pointers are only written through the
/// settlement claim protocol, hence crate-private setters.
#[derive(Debug, Clone)]
pub struct Tile {
    pub pos: TilePos,
    pub terrain: TerrainType,
    owner: Option<PlayerId>,
    owning_settlement: Option<SettlementId>,
    settlement: Option<SettlementId>,
    memories: HashMap<PlayerId, TileMemory>,
}

impl Tile {
    pub fn new(pos: TilePos, terrain: TerrainType) -> Self {
        Self {
            pos,
            terrain,
            owner: None,
            owning_settlement: None,
            settlement: None,
            memories: HashMap::new(),
        }
    }

    pub fn is_land(&self) -> bool {
        self.terrain.is_land()
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    pub fn owning_settlement(&self) -> Option<SettlementId> {
        self.owning_settlement
    }

    /// The settlement standing on this tile, if any.
    pub fn settlement(&self) -> Option<SettlementId> {
        self.settlement
    }

    pub(crate) fn set_owner(&mut self, owner: Option<PlayerId>) {
        self.owner = owner;
    }

    pub(crate) fn set_owning_settlement(&mut self, settlement: Option<SettlementId>) {
        self.owning_settlement = settlement;
    }

    pub(crate) fn set_settlement(&mut self, settlement: Option<SettlementId>) {
        self.settlement = settlement;
    }

    /// Drop both ownership pointers.
    pub(crate) fn release(&mut self) {
        self.owner = None;
        self.owning_settlement = None;
    }

    fn snapshot(&self) -> TileMemory {
        TileMemory {
            owner: self.owner,
            owning_settlement: self.owning_settlement,
            settlement: self.settlement,
        }
    }

    /// Start tracking this tile in `player`'s fog-of-war memory.
    pub(crate) fn remember_for(&mut self, player: PlayerId) {
        let memory = self.snapshot();
        self.memories.insert(player, memory);
    }

    /// Refresh every player's memory of this tile to its current state.
    pub fn update_player_explored_tiles(&mut self) {
        let memory = self.snapshot();
        for remembered in self.memories.values_mut() {
            *remembered = memory;
        }
    }

    pub fn memory_of(&self, player: PlayerId) -> Option<&TileMemory> {
        self.memories.get(&player)
    }
}
