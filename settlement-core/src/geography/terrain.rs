// Terrain types and their per-turn yields

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::GoodsType;
use crate::types::goods::classic;

/// Broad terrain categories of a map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
pub enum TerrainType {
    Plains,
    Grassland,
    Prairie,
    Savannah,
    Marsh,
    Swamp,
    Desert,
    Tundra,
    Forest,
    Hills,
    Mountains,
    Ocean,
    Lake,
}

impl TerrainType {
    pub fn is_land(self) -> bool {
        !matches!(self, Self::Ocean | Self::Lake)
    }

    /// Units of `goods` one worker harvests here per turn.
    ///
    /// Yields are keyed by the classic goods handles; any other registry
    /// gets nothing from terrain.
    pub fn production(self, goods: GoodsType) -> u32 {
        let table: &[(GoodsType, u32)] = match self {
            Self::Plains => &[(classic::FOOD, 5), (classic::COTTON, 2)],
            Self::Grassland => &[(classic::FOOD, 3), (classic::TOBACCO, 3)],
            Self::Prairie => &[(classic::FOOD, 3), (classic::COTTON, 3)],
            Self::Savannah => &[(classic::FOOD, 4), (classic::SUGAR, 3)],
            Self::Marsh => &[(classic::FOOD, 3), (classic::TOBACCO, 2), (classic::ORE, 2)],
            Self::Swamp => &[(classic::FOOD, 3), (classic::SUGAR, 2), (classic::ORE, 2)],
            Self::Desert => &[(classic::FOOD, 2), (classic::ORE, 2)],
            Self::Tundra => &[(classic::FOOD, 3), (classic::ORE, 2)],
            Self::Forest => &[(classic::FOOD, 2), (classic::FURS, 3), (classic::LUMBER, 6)],
            Self::Hills => &[(classic::FOOD, 4), (classic::ORE, 4)],
            Self::Mountains => &[(classic::ORE, 4), (classic::SILVER, 1)],
            Self::Ocean => &[(classic::FISH, 4)],
            Self::Lake => &[(classic::FISH, 2)],
        };
        table
            .iter()
            .find(|(g, _)| *g == goods)
            .map_or(0, |(_, qty)| *qty)
    }

    /// Map-sketch character used by [`crate::geography::Map::from_rows`].
    pub fn from_char(c: char) -> Option<Self> {
        let terrain = match c {
            '.' => Self::Plains,
            'g' => Self::Grassland,
            'p' => Self::Prairie,
            's' => Self::Savannah,
            'm' => Self::Marsh,
            'w' => Self::Swamp,
            'd' => Self::Desert,
            't' => Self::Tundra,
            'f' => Self::Forest,
            'h' => Self::Hills,
            '^' => Self::Mountains,
            '~' => Self::Ocean,
            'l' => Self::Lake,
            _ => return None,
        };
        Some(terrain)
    }
}
