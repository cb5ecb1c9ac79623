use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::{SettlementId, TilePos};

// === NATION ===

/// Claim radii granted by a nation's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationType {
    pub settlement_radius: u32,
    pub capital_radius: u32,
}

impl NationType {
    pub fn new(settlement_radius: u32, capital_radius: u32) -> Self {
        Self {
            settlement_radius,
            capital_radius,
        }
    }

    pub fn european() -> Self {
        Self::new(1, 1)
    }

    /// Camp-dwelling tribes
    pub fn nomadic() -> Self {
        Self::new(1, 2)
    }

    /// Village-dwelling tribes
    pub fn agricultural() -> Self {
        Self::new(1, 2)
    }

    /// City-building empires
    pub fn advanced() -> Self {
        Self::new(2, 3)
    }
}

impl Default for NationType {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum PlayerKind {
    European,
    Indian,
    Undead,
    /// The crown's expeditionary force
    Royal,
}

// === PLAYER ===

/// A party owning settlements.
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub kind: PlayerKind,
    pub nation: NationType,
    pub gold: u32,
    settlements: Vec<SettlementId>,
    explored: HashSet<TilePos>,
    /// Memoized visible tiles; `None` until rebuilt by `Game::can_see`.
    can_see: Option<HashSet<TilePos>>,
    visibility_invalidations: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, kind: PlayerKind, nation: NationType) -> Self {
        Self {
            name: name.into(),
            kind,
            nation,
            gold: 0,
            settlements: Vec::new(),
            explored: HashSet::new(),
            can_see: None,
            visibility_invalidations: 0,
        }
    }

    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    pub fn is_european(&self) -> bool {
        matches!(self.kind, PlayerKind::European | PlayerKind::Royal)
    }

    pub fn is_indian(&self) -> bool {
        self.kind == PlayerKind::Indian
    }

    // === Settlement list ===

    pub fn settlements(&self) -> &[SettlementId] {
        &self.settlements
    }

    pub fn has_settlement(&self, id: SettlementId) -> bool {
        self.settlements.contains(&id)
    }

    pub fn add_settlement(&mut self, id: SettlementId) {
        if !self.has_settlement(id) {
            self.settlements.push(id);
        }
    }

    pub fn remove_settlement(&mut self, id: SettlementId) {
        self.settlements.retain(|s| *s != id);
    }

    // === Exploration & visibility ===

    pub fn set_explored(&mut self, pos: TilePos) {
        self.explored.insert(pos);
    }

    pub fn has_explored(&self, pos: TilePos) -> bool {
        self.explored.contains(&pos)
    }

    pub fn explored_count(&self) -> usize {
        self.explored.len()
    }

    /// Throw away the can-see memo; the next visibility query rebuilds it.
    pub fn invalidate_can_see_tiles(&mut self) {
        self.can_see = None;
        self.visibility_invalidations += 1;
    }

    pub fn can_see_cache(&self) -> Option<&HashSet<TilePos>> {
        self.can_see.as_ref()
    }

    pub(crate) fn set_can_see_cache(&mut self, tiles: HashSet<TilePos>) {
        self.can_see = Some(tiles);
    }

    /// How many times the visibility memo has been invalidated.
    pub fn visibility_invalidations(&self) -> u32 {
        self.visibility_invalidations
    }
}
