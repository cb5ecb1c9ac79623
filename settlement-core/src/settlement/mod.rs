// Settlements: colonies and native villages sitting on map tiles
//
// Module structure:
// - goods      Per-settlement goods store and the goods API
// - features   Abilities and modifiers attached by game rules
// - variant    Colony / native village payloads and the hooks that dispatch on them
// - claims     Placement, tile claims, capture
// - food       Food consumption accounting and equipment checks
// - arbiter    Disposal and redistribution of vacated tiles
// - record     Save records and the stream construction entry points

pub mod arbiter;
pub mod claims;
pub mod features;
pub mod food;
pub mod goods;
pub mod record;
pub mod variant;

pub use features::{FeatureSet, Modifier, ModifierKind};
pub use goods::{GoodsIter, GoodsStore};
pub use record::SettlementRecord;
pub use variant::{ColonyData, Locatable, SettlementKind, VillageData, VillageKind, WorkAssignment};

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::{AbstractGoods, PlayerId, SettlementId, TilePos, UnitId};

/// Tag used by renderers and rules to pick a settlement's look and strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
pub enum SettlementType {
    SmallColony,
    MediumColony,
    LargeColony,
    SmallStockade,
    MediumStockade,
    MediumFort,
    LargeStockade,
    LargeFort,
    LargeFortress,
    Undead,
    IndianCamp,
    IndianVillage,
    AztecCity,
    IncaCity,
}

/// Something released by a disposal that the owning game world must collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposed {
    Goods(AbstractGoods),
    Unit(UnitId),
    Settlement(SettlementId),
}

/// A colony or native village.
///
/// Cross-entity fields are handles: the owner lives in the game's player
/// arena and the home tile in the map.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub(crate) id: SettlementId,
    /// `None` only for a shell that has not been read yet.
    pub(crate) owner: Option<PlayerId>,
    name: String,
    pub(crate) tile: TilePos,
    pub(crate) is_capital: bool,
    pub(crate) goods: GoodsStore,
    pub(crate) features: FeatureSet,
    pub(crate) kind: SettlementKind,
}

impl Settlement {
    pub(crate) fn new(
        id: SettlementId,
        owner: PlayerId,
        name: impl Into<String>,
        tile: TilePos,
        capacity: u32,
        kind: SettlementKind,
    ) -> Self {
        Self {
            id,
            owner: Some(owner),
            name: name.into(),
            tile,
            is_capital: false,
            goods: GoodsStore::new(capacity),
            features: FeatureSet::new(),
            kind,
        }
    }

    /// An empty settlement awaiting [`Settlement::read_from`].
    pub fn shell(id: SettlementId) -> Self {
        Self {
            id,
            owner: None,
            name: String::new(),
            tile: TilePos::default(),
            is_capital: false,
            goods: GoodsStore::default(),
            features: FeatureSet::new(),
            kind: SettlementKind::Colony(ColonyData::default()),
        }
    }

    pub fn id(&self) -> SettlementId {
        self.id
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn tile(&self) -> TilePos {
        self.tile
    }

    pub fn is_capital(&self) -> bool {
        self.is_capital
    }

    pub fn goods(&self) -> &GoodsStore {
        &self.goods
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut FeatureSet {
        &mut self.features
    }

    pub fn kind(&self) -> &SettlementKind {
        &self.kind
    }

    pub fn is_colony(&self) -> bool {
        matches!(self.kind, SettlementKind::Colony(_))
    }

    pub fn is_native(&self) -> bool {
        matches!(self.kind, SettlementKind::NativeVillage(_))
    }

    pub fn unit_count(&self) -> u32 {
        self.kind.unit_count()
    }

    pub fn units(&self) -> Vec<UnitId> {
        self.kind.units()
    }
}
