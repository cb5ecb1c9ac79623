use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::PlayerId;

/// What a unit is currently equipped or trained as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
pub enum UnitRole {
    Colonist,
    Pioneer,
    Missionary,
    Soldier,
    Dragoon,
    Artillery,
    Brave,
}

impl UnitRole {
    /// Base defence strength.
    pub fn defence(self) -> u32 {
        match self {
            Self::Colonist | Self::Pioneer | Self::Missionary | Self::Brave => 1,
            Self::Soldier => 2,
            Self::Dragoon => 3,
            Self::Artillery => 5,
        }
    }

    pub fn offence(self) -> u32 {
        match self {
            Self::Colonist | Self::Pioneer | Self::Missionary => 0,
            Self::Brave => 1,
            Self::Soldier => 2,
            Self::Dragoon => 3,
            Self::Artillery => 7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Unit {
    pub owner: PlayerId,
    pub role: UnitRole,
}

impl Unit {
    pub fn new(owner: PlayerId, role: UnitRole) -> Self {
        Self { owner, role }
    }
}
