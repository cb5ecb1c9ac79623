use serde::{Deserialize, Serialize};

/// Rule constants shared by every settlement in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Claim radius for nations that don't specify one.
    pub base_radius: u32,
    /// Food eaten per unit per turn.
    pub food_consumption_per_unit: u32,
    /// Tiles within this distance of a settlement are explored by its owner.
    pub default_line_of_sight: u32,
    /// Per-type warehouse cap of a colony.
    pub colony_capacity: u32,
    /// Per-type storage cap of a native village.
    pub village_capacity: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_radius: 1,
            food_consumption_per_unit: 2,
            default_line_of_sight: 2,
            colony_capacity: 100,
            village_capacity: 200,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
