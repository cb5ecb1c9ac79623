use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

// ============================================================================
// Goods - The commodities settlements store and consume
// ============================================================================

/// Handle into a [`GoodsRegistry`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Tsify,
)]
pub struct GoodsType(pub u16);

/// Static description of one goods type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodsSpec {
    pub id: String,
    pub is_food: bool,
    /// Bells, crosses and the like are produced but never warehoused.
    pub storable: bool,
    /// Canonical type this one is warehoused as, if not itself.
    pub stored_as: Option<GoodsType>,
}

/// An amount of one goods type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
pub struct AbstractGoods {
    pub goods_type: GoodsType,
    pub amount: u32,
}

impl AbstractGoods {
    pub fn new(goods_type: GoodsType, amount: u32) -> Self {
        Self { goods_type, amount }
    }
}

/// Something a unit can be equipped with, paid for in goods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentType {
    pub id: String,
    pub goods_required: Vec<AbstractGoods>,
}

/// Goods types known to a game, loaded once at game start.
///
/// Declaration order matters: it is the order food types are drawn from when
/// a settlement eats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoodsRegistry {
    specs: Vec<GoodsSpec>,
    food: Vec<GoodsType>,
    primary_food: Option<GoodsType>,
    equipment: Vec<EquipmentType>,
}

impl GoodsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, spec: GoodsSpec) -> GoodsType {
        let goods_type = GoodsType(self.specs.len() as u16);
        if spec.is_food {
            self.food.push(goods_type);
        }
        self.specs.push(spec);
        goods_type
    }

    /// Register an ordinary storable goods type.
    pub fn register(&mut self, id: &str) -> GoodsType {
        self.push(GoodsSpec {
            id: id.to_string(),
            is_food: false,
            storable: true,
            stored_as: None,
        })
    }

    pub fn register_food(&mut self, id: &str) -> GoodsType {
        self.push(GoodsSpec {
            id: id.to_string(),
            is_food: true,
            storable: true,
            stored_as: None,
        })
    }

    /// Register goods that are produced but never warehoused.
    pub fn register_unstorable(&mut self, id: &str) -> GoodsType {
        self.push(GoodsSpec {
            id: id.to_string(),
            is_food: false,
            storable: false,
            stored_as: None,
        })
    }

    /// Register a goods type that is warehoused as `base`. It inherits the
    /// food classification of its base.
    pub fn register_stored_as(&mut self, id: &str, base: GoodsType) -> GoodsType {
        let is_food = self.is_food(base);
        self.push(GoodsSpec {
            id: id.to_string(),
            is_food,
            storable: true,
            stored_as: Some(base),
        })
    }

    /// Mark the food that absorbs whatever demand the other foods leave over.
    pub fn set_primary_food(&mut self, goods_type: GoodsType) {
        self.primary_food = Some(goods_type);
    }

    pub fn add_equipment(&mut self, equipment: EquipmentType) {
        self.equipment.push(equipment);
    }

    pub fn spec(&self, goods_type: GoodsType) -> Option<&GoodsSpec> {
        self.specs.get(goods_type.0 as usize)
    }

    pub fn by_id(&self, id: &str) -> Option<GoodsType> {
        self.specs
            .iter()
            .position(|s| s.id == id)
            .map(|i| GoodsType(i as u16))
    }

    pub fn name(&self, goods_type: GoodsType) -> &str {
        self.spec(goods_type).map_or("unknown", |s| s.id.as_str())
    }

    pub fn is_food(&self, goods_type: GoodsType) -> bool {
        self.spec(goods_type).is_some_and(|s| s.is_food)
    }

    pub fn is_storable(&self, goods_type: GoodsType) -> bool {
        self.spec(goods_type).is_some_and(|s| s.storable)
    }

    /// True if this type is warehoused under another type.
    pub fn is_stored_as(&self, goods_type: GoodsType) -> bool {
        self.spec(goods_type).is_some_and(|s| s.stored_as.is_some())
    }

    /// The canonical storage type for `goods_type`.
    pub fn stored_as(&self, goods_type: GoodsType) -> GoodsType {
        self.spec(goods_type)
            .and_then(|s| s.stored_as)
            .unwrap_or(goods_type)
    }

    /// Food types in declaration order.
    pub fn food_types(&self) -> &[GoodsType] {
        &self.food
    }

    pub fn primary_food(&self) -> Option<GoodsType> {
        self.primary_food
    }

    pub fn equipment(&self, id: &str) -> Option<&EquipmentType> {
        self.equipment.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GoodsType, &GoodsSpec)> {
        self.specs
            .iter()
            .enumerate()
            .map(|(i, s)| (GoodsType(i as u16), s))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The standard colonial goods set. Handles match [`classic`].
    pub fn classic() -> Self {
        let mut registry = Self::new();
        registry.register_food("fish");
        let food = registry.register_food("food");
        registry.set_primary_food(food);
        for id in [
            "sugar",
            "tobacco",
            "cotton",
            "furs",
            "lumber",
            "ore",
            "silver",
            "horses",
            "rum",
            "cigars",
            "cloth",
            "coats",
            "trade_goods",
            "tools",
            "muskets",
        ] {
            registry.register(id);
        }
        registry.register_unstorable("hammers");
        registry.register_unstorable("bells");
        registry.register_unstorable("crosses");

        registry.add_equipment(EquipmentType {
            id: "soldier".to_string(),
            goods_required: vec![AbstractGoods::new(classic::MUSKETS, 50)],
        });
        registry.add_equipment(EquipmentType {
            id: "dragoon".to_string(),
            goods_required: vec![
                AbstractGoods::new(classic::MUSKETS, 50),
                AbstractGoods::new(classic::HORSES, 50),
            ],
        });
        registry.add_equipment(EquipmentType {
            id: "pioneer".to_string(),
            goods_required: vec![AbstractGoods::new(classic::TOOLS, 20)],
        });
        registry.add_equipment(EquipmentType {
            id: "missionary".to_string(),
            goods_required: Vec::new(),
        });
        registry
    }
}

/// Handles into [`GoodsRegistry::classic`].
pub mod classic {
    use super::GoodsType;

    pub const FISH: GoodsType = GoodsType(0);
    pub const FOOD: GoodsType = GoodsType(1);
    pub const SUGAR: GoodsType = GoodsType(2);
    pub const TOBACCO: GoodsType = GoodsType(3);
    pub const COTTON: GoodsType = GoodsType(4);
    pub const FURS: GoodsType = GoodsType(5);
    pub const LUMBER: GoodsType = GoodsType(6);
    pub const ORE: GoodsType = GoodsType(7);
    pub const SILVER: GoodsType = GoodsType(8);
    pub const HORSES: GoodsType = GoodsType(9);
    pub const RUM: GoodsType = GoodsType(10);
    pub const CIGARS: GoodsType = GoodsType(11);
    pub const CLOTH: GoodsType = GoodsType(12);
    pub const COATS: GoodsType = GoodsType(13);
    pub const TRADE_GOODS: GoodsType = GoodsType(14);
    pub const TOOLS: GoodsType = GoodsType(15);
    pub const MUSKETS: GoodsType = GoodsType(16);
    pub const HAMMERS: GoodsType = GoodsType(17);
    pub const BELLS: GoodsType = GoodsType(18);
    pub const CROSSES: GoodsType = GoodsType(19);
}
