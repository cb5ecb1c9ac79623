use wasm_bindgen::prelude::*;

pub mod agents;
pub mod config;
pub mod error;
pub mod game;
pub mod geography;
pub mod invariants;
pub mod scenario;
pub mod settlement;
pub mod state;
pub mod types;

pub use agents::*;
pub use config::*;
pub use error::*;
pub use game::*;
pub use geography::*;
pub use invariants::*;
pub use settlement::variant::UNKNOWN_VILLAGE_NAME;
pub use settlement::{
    ColonyData, Disposed, FeatureSet, GoodsStore, Locatable, Modifier, ModifierKind, Settlement,
    SettlementKind, SettlementRecord, SettlementType, VillageData, VillageKind, WorkAssignment,
};
pub use state::*;
pub use types::*;

#[cfg(feature = "instrument")]
pub use instrument;

// ============================================================================
// WASM API - Simulation
// ============================================================================

#[wasm_bindgen]
pub struct Simulation {
    game: Game,
}

fn settlement_id(raw: u32) -> SettlementId {
    SettlementId::new(raw)
}

#[wasm_bindgen]
impl Simulation {
    /// A seeded demo world.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<Simulation, JsError> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        Ok(Self {
            game: scenario::demo_game(seed)?,
        })
    }

    /// An empty world of plains, for editors and tests.
    #[wasm_bindgen]
    pub fn blank(width: i32, height: i32) -> Simulation {
        console_error_panic_hook::set_once();
        Self {
            game: Game::with_map(Map::new(width, height, TerrainType::Plains)),
        }
    }

    #[wasm_bindgen]
    pub fn add_player(&mut self, name: &str, kind: PlayerKind) -> u64 {
        let nation = match kind {
            PlayerKind::Indian => NationType::agricultural(),
            _ => NationType::european(),
        };
        self.game.add_player(Player::new(name, kind, nation)).to_u64()
    }

    #[wasm_bindgen]
    pub fn found_colony(&mut self, owner: u64, name: &str, x: i32, y: i32) -> Result<u32, JsError> {
        let id = self
            .game
            .found_colony(PlayerId::from_u64(owner), name, TilePos::new(x, y))?;
        Ok(id.0)
    }

    #[wasm_bindgen]
    pub fn found_village(
        &mut self,
        owner: u64,
        name: &str,
        tribe: &str,
        x: i32,
        y: i32,
    ) -> Result<u32, JsError> {
        let village = VillageData::new(tribe, VillageKind::Village);
        let id = self.game.found_village(
            PlayerId::from_u64(owner),
            name,
            TilePos::new(x, y),
            village,
        )?;
        Ok(id.0)
    }

    /// Hand a settlement to another player.
    #[wasm_bindgen]
    pub fn capture(&mut self, settlement: u32, new_owner: u64) -> Result<(), JsError> {
        self.game
            .change_owner(settlement_id(settlement), PlayerId::from_u64(new_owner))?;
        Ok(())
    }

    /// Destroy a settlement, returning how many objects went with it.
    #[wasm_bindgen]
    pub fn destroy(&mut self, settlement: u32) -> Result<u32, JsError> {
        let disposed = self.game.dispose_settlement(settlement_id(settlement))?;
        Ok(disposed.len() as u32)
    }

    /// Run end-of-turn processing for every settlement
    #[wasm_bindgen]
    pub fn advance_turn(&mut self) -> Result<(), JsError> {
        self.game.advance_turn()?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn get_turn(&self) -> u32 {
        self.game.turn
    }

    /// Get a snapshot of the current state for rendering
    #[wasm_bindgen]
    pub fn get_state_snapshot(&self) -> Result<StateSnapshot, JsError> {
        Ok(self.game.snapshot()?)
    }

    /// Settlement names as `observer` knows them, in id order.
    #[wasm_bindgen]
    pub fn settlement_names(&self, observer: u64) -> Result<js_sys::Array, JsError> {
        let names = js_sys::Array::new();
        for name in self.names_for(PlayerId::from_u64(observer))? {
            names.push(&JsValue::from_str(&name));
        }
        Ok(names)
    }

    /// Build a settlement from a saved record object.
    #[wasm_bindgen]
    pub fn load_settlement(&mut self, record: JsValue) -> Result<u32, JsError> {
        let record: SettlementRecord = serde_wasm_bindgen::from_value(record)
            .map_err(|e| JsError::new(&e.to_string()))?;
        let id = self.game.settlement_from_record(&record)?;
        Ok(id.0)
    }

    /// Save record of one settlement, as JSON.
    #[wasm_bindgen]
    pub fn save_settlement(&self, settlement: u32) -> Result<String, JsError> {
        Ok(self.game.settlement_to_json(settlement_id(settlement))?)
    }
}

impl Simulation {
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    fn names_for(&self, observer: PlayerId) -> Result<Vec<String>> {
        self.game
            .settlement_ids()
            .into_iter()
            .filter(|id| self.game.settlement(*id).is_some_and(|s| s.owner().is_some()))
            .map(|id| self.game.name_for(id, observer))
            .collect()
    }
}
