use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::agents::PlayerKind;
use crate::error::Result;
use crate::game::Game;
use crate::settlement::SettlementType;
use crate::types::{KeyToU64, TilePos};

// ============================================================================
// Serializable State Snapshot for JS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct StateSnapshot {
    pub turn: u32,
    pub players: Vec<PlayerSnapshot>,
    pub settlements: Vec<SettlementSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct PlayerSnapshot {
    pub id: u64,
    pub name: String,
    pub kind: PlayerKind,
    pub gold: u32,
    pub settlements: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct GoodsSnapshot {
    pub goods: String,
    pub amount: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct SettlementSnapshot {
    pub id: u32,
    pub name: String,
    pub owner: u64,
    pub tile: TilePos,
    pub settlement_type: SettlementType,
    pub is_capital: bool,
    pub units: u32,
    // Land & stores
    pub owned_tiles: Vec<TilePos>,
    pub goods: Vec<GoodsSnapshot>,
    pub food: u32,
    pub food_consumption: u32,
}

impl Game {
    /// Everything a renderer needs for one frame. Unread shells are left out.
    pub fn snapshot(&self) -> Result<StateSnapshot> {
        let players = self
            .players
            .iter()
            .map(|(id, p)| PlayerSnapshot {
                id: id.to_u64(),
                name: p.name.clone(),
                kind: p.kind,
                gold: p.gold,
                settlements: p.settlements().iter().map(|s| s.0).collect(),
            })
            .collect();

        let mut settlements = Vec::new();
        for settlement in self.settlements() {
            let Some(owner) = settlement.owner() else {
                continue;
            };
            let id = settlement.id();
            let goods = settlement
                .goods()
                .iter_goods()
                .map(|lot| GoodsSnapshot {
                    goods: self.registry.name(lot.goods_type).to_string(),
                    amount: lot.amount,
                })
                .collect();
            settlements.push(SettlementSnapshot {
                id: id.0,
                name: settlement.name().to_string(),
                owner: owner.to_u64(),
                tile: settlement.tile(),
                settlement_type: self.settlement_type(id)?,
                is_capital: settlement.is_capital(),
                units: settlement.unit_count(),
                owned_tiles: self.owned_tiles(id)?,
                goods,
                food: self.food_count(id)?,
                food_consumption: self.food_consumption(id)?,
            });
        }

        Ok(StateSnapshot {
            turn: self.turn,
            players,
            settlements,
        })
    }
}
