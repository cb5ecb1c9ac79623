// Save records: reading settlements from and writing them to external input

use serde::{Deserialize, Serialize};

use super::{FeatureSet, GoodsStore, Settlement, SettlementKind};
use crate::error::{Result, SettlementError};
use crate::game::Game;
use crate::types::{AbstractGoods, PlayerId, SettlementId, TilePos};

/// Serialized form of a settlement.
///
/// Tile ownership beyond the home tile is saved with the map, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: SettlementId,
    pub owner: PlayerId,
    pub name: String,
    pub tile: TilePos,
    #[serde(default)]
    pub is_capital: bool,
    pub capacity: u32,
    #[serde(default)]
    pub goods: Vec<AbstractGoods>,
    #[serde(default)]
    pub features: FeatureSet,
    pub kind: SettlementKind,
}

impl Settlement {
    /// Fill this settlement from `record`. Nothing changes on failure.
    pub fn read_from(&mut self, record: &SettlementRecord) -> Result<()> {
        if record.id != self.id {
            return Err(SettlementError::IdMismatch {
                record: record.id,
                shell: self.id,
            });
        }
        let mut goods = GoodsStore::new(record.capacity);
        for lot in &record.goods {
            goods.add(lot.goods_type, lot.amount)?;
        }

        self.owner = Some(record.owner);
        self.set_name(record.name.clone());
        self.tile = record.tile;
        self.is_capital = record.is_capital;
        self.goods = goods;
        self.features = record.features.clone();
        self.kind = record.kind.clone();
        Ok(())
    }

    pub fn to_record(&self) -> Result<SettlementRecord> {
        Ok(SettlementRecord {
            id: self.id,
            owner: self.owner.ok_or(SettlementError::Unowned(self.id))?,
            name: self.name().to_string(),
            tile: self.tile,
            is_capital: self.is_capital,
            capacity: self.goods.capacity(),
            goods: self.goods.list_compact(),
            features: self.features.clone(),
            kind: self.kind.clone(),
        })
    }
}

impl Game {
    /// Register an empty settlement under a known id, to be filled by
    /// [`Game::read_settlement`].
    pub fn settlement_shell(&mut self, id: SettlementId) -> Result<()> {
        if self.settlements.contains_key(&id) {
            return Err(SettlementError::DuplicateSettlement(id));
        }
        self.settlements.insert(id, Settlement::shell(id));
        self.reserve_settlement_id(id);
        Ok(())
    }

    /// Fill a shell from `record`, register it with its owner and restore
    /// its home tile's pointers. No claim sweep runs.
    pub fn read_settlement(&mut self, id: SettlementId, record: &SettlementRecord) -> Result<()> {
        self.player_or_err(record.owner)?;
        let tile = self
            .map
            .tile(record.tile)
            .ok_or(SettlementError::OffMap(record.tile))?;
        if let Some(existing) = tile.settlement().filter(|s| *s != id) {
            return Err(SettlementError::TileOccupied {
                pos: record.tile,
                existing,
            });
        }
        if let Some(unit) = record
            .kind
            .units()
            .into_iter()
            .find(|u| !self.units.contains_key(*u))
        {
            return Err(SettlementError::UnknownUnit(unit));
        }

        self.settlement_mut_internal(id)?.read_from(record)?;
        self.player_mut_or_err(record.owner)?.add_settlement(id);
        if record.is_capital {
            self.set_capital(id, true)?;
        }
        if let Some(tile) = self.map.tile_mut(record.tile) {
            tile.set_settlement(Some(id));
            tile.set_owning_settlement(Some(id));
            tile.set_owner(Some(record.owner));
            tile.update_player_explored_tiles();
        }
        self.player_mut_or_err(record.owner)?.invalidate_can_see_tiles();
        Ok(())
    }

    /// Build a settlement straight from a parsed element tree.
    pub fn settlement_from_value(&mut self, value: serde_json::Value) -> Result<SettlementId> {
        let record: SettlementRecord = serde_json::from_value(value)?;
        self.settlement_from_record(&record)
    }

    /// Build a settlement straight from a JSON stream.
    pub fn settlement_from_json(&mut self, json: &str) -> Result<SettlementId> {
        let record: SettlementRecord = serde_json::from_str(json)?;
        self.settlement_from_record(&record)
    }

    pub fn settlement_from_record(&mut self, record: &SettlementRecord) -> Result<SettlementId> {
        self.settlement_shell(record.id)?;
        if let Err(err) = self.read_settlement(record.id, record) {
            self.settlements.remove(&record.id);
            return Err(err);
        }
        Ok(record.id)
    }

    pub fn write_settlement(&self, id: SettlementId) -> Result<SettlementRecord> {
        self.settlement_or_err(id)?.to_record()
    }

    pub fn settlement_to_json(&self, id: SettlementId) -> Result<String> {
        Ok(serde_json::to_string(&self.write_settlement(id)?)?)
    }
}
