use thiserror::Error;

use crate::types::{GoodsType, PlayerId, SettlementId, TilePos, UnitId};

/// Failures of the settlement core.
///
/// Goods and food shortfalls are bookkeeping faults: the calling game rule is
/// expected to have checked before asking.
#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("{0} does not exist")]
    UnknownSettlement(SettlementId),
    #[error("player {0:?} does not exist")]
    UnknownPlayer(PlayerId),
    #[error("unit {0:?} does not exist")]
    UnknownUnit(UnitId),
    #[error("{0} has no owner")]
    Unowned(SettlementId),
    #[error("tile {0} is off the map")]
    OffMap(TilePos),
    #[error("tile {pos} already holds {existing}")]
    TileOccupied { pos: TilePos, existing: SettlementId },
    #[error("cannot remove {requested} of goods {goods:?}: only {available} present")]
    InsufficientGoods {
        goods: GoodsType,
        requested: u32,
        available: u32,
    },
    #[error("adding {requested} of goods {goods:?} to {held} exceeds capacity {capacity}")]
    CapacityExceeded {
        goods: GoodsType,
        requested: u32,
        held: u32,
        capacity: u32,
    },
    #[error("attempted to remove {requested} food but only {available} is present")]
    InsufficientFood { requested: u32, available: u32 },
    #[error("goods {0:?} cannot be stored")]
    NotStorable(GoodsType),
    #[error("unit {unit:?} cannot be added to {settlement}")]
    CannotAdd { unit: UnitId, settlement: SettlementId },
    #[error("unit {unit:?} is not in {settlement}")]
    NotPresent { unit: UnitId, settlement: SettlementId },
    #[error("tile {pos} cannot be worked by {settlement}")]
    NotWorkable { pos: TilePos, settlement: SettlementId },
    #[error("{0} is not a colony")]
    NotAColony(SettlementId),
    #[error("{0} is not a native village")]
    NotAVillage(SettlementId),
    #[error("record describes {record} but was read into {shell}")]
    IdMismatch {
        record: SettlementId,
        shell: SettlementId,
    },
    #[error("{0} is already registered")]
    DuplicateSettlement(SettlementId),
    #[error("malformed settlement record: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T, E = SettlementError> = std::result::Result<T, E>;
