// Food accounting and equipment feasibility

use crate::error::{Result, SettlementError};
use crate::game::Game;
use crate::types::{EquipmentType, GoodsType, SettlementId};

impl Game {
    /// Food eaten per turn: a fixed ration per resident unit.
    pub fn food_consumption(&self, id: SettlementId) -> Result<u32> {
        let units = self.settlement_or_err(id)?.unit_count();
        Ok(self.config.food_consumption_per_unit * units)
    }

    /// Food on hand across every food type.
    pub fn food_count(&self, id: SettlementId) -> Result<u32> {
        let mut total = 0;
        for &goods in self.registry.food_types() {
            total += self.goods_count(id, goods)?;
        }
        Ok(total)
    }

    /// The share of this turn's demand met by `goods`.
    ///
    /// Secondary foods are eaten first, in declared order, each up to what
    /// the settlement produces of it this turn. The primary food covers the
    /// rest, again capped by its production.
    pub fn food_consumption_by_type(&self, id: SettlementId, goods: GoodsType) -> Result<u32> {
        if !self.registry.is_food(goods) {
            #[cfg(feature = "instrument")]
            tracing::warn!(
                target: "diagnostic",
                settlement = id.0,
                goods = goods.0,
                "food consumption asked for a non-food type"
            );
            return Ok(0);
        }

        let mut required = self.food_consumption(id)?;
        let primary = self.registry.primary_food();
        for &food in self.registry.food_types() {
            if Some(food) == primary {
                continue;
            }
            let consumed = self.production_of(id, food)?.min(required);
            if food == goods {
                return Ok(consumed);
            }
            required -= consumed;
        }

        match primary {
            Some(primary) if primary == goods => Ok(self.production_of(id, primary)?.min(required)),
            _ => Ok(0),
        }
    }

    /// Eat exactly `amount` food.
    ///
    /// Food types are walked in declared order. A type is only drained if
    /// the types before it, plus it, still fall short; the first type that
    /// covers the remainder pays it and the walk stops. Asking for more than
    /// [`Game::food_count`] fails and changes nothing.
    pub fn remove_food(&mut self, id: SettlementId, amount: u32) -> Result<()> {
        let mut rest = amount;
        let mut drains: Vec<(GoodsType, u32)> = Vec::new();
        for &food in self.registry.food_types() {
            if rest == 0 {
                break;
            }
            if self.registry.is_stored_as(food) {
                continue;
            }
            let available = self.goods_count(id, food)?;
            if available >= rest {
                drains.push((food, rest));
                rest = 0;
            } else if available > 0 {
                drains.push((food, available));
                rest -= available;
            }
        }

        if rest > 0 {
            return Err(SettlementError::InsufficientFood {
                requested: amount,
                available: amount - rest,
            });
        }

        let store = &mut self.settlement_mut_internal(id)?.goods;
        for (food, qty) in drains {
            store.remove(food, qty)?;
        }

        #[cfg(feature = "instrument")]
        {
            if amount > 0 {
                tracing::info!(
                    target: "food",
                    turn = self.turn,
                    settlement = id.0,
                    eaten = amount
                );
            }
        }
        Ok(())
    }

    /// Whether the settlement holds every good `equipment` needs. Pure check.
    pub fn can_build_equipment(&self, id: SettlementId, equipment: &EquipmentType) -> Result<bool> {
        for required in &equipment.goods_required {
            if self.goods_count(id, required.goods_type)? < required.amount {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::agents::{NationType, Player, PlayerKind, UnitRole};
    use crate::error::SettlementError;
    use crate::game::Game;
    use crate::geography::{Map, TerrainType};
    use crate::settlement::Locatable;
    use crate::types::goods::classic;
    use crate::types::{SettlementId, TilePos};

    fn colony_with_units(units: usize) -> (Game, SettlementId) {
        let mut game = Game::with_map(Map::new(5, 5, TerrainType::Grassland));
        let dutch = game.add_player(Player::new(
            "Dutch",
            PlayerKind::European,
            NationType::european(),
        ));
        let id = game.found_colony(dutch, "A", TilePos::new(2, 2)).unwrap();
        for _ in 0..units {
            let unit = game.add_unit(dutch, UnitRole::Colonist).unwrap();
            game.add(id, Locatable::Unit(unit)).unwrap();
        }
        (game, id)
    }

    #[test]
    fn test_consumption_is_two_per_unit() {
        let (game, id) = colony_with_units(6);
        assert_eq!(game.food_consumption(id).unwrap(), 12);
    }

    #[test]
    fn test_remove_food_spares_types_that_are_not_needed() {
        let (mut game, id) = colony_with_units(0);
        game.add_goods(id, classic::FISH, 20).unwrap();
        game.add_goods(id, classic::FOOD, 10).unwrap();

        game.remove_food(id, 12).unwrap();
        assert_eq!(game.goods_count(id, classic::FISH).unwrap(), 8);
        assert_eq!(game.goods_count(id, classic::FOOD).unwrap(), 10);
    }

    #[test]
    fn test_remove_food_failure_leaves_stock_untouched() {
        let (mut game, id) = colony_with_units(0);
        game.add_goods(id, classic::FISH, 4).unwrap();
        game.add_goods(id, classic::FOOD, 3).unwrap();

        let err = game.remove_food(id, 12).unwrap_err();
        assert!(matches!(
            err,
            SettlementError::InsufficientFood {
                requested: 12,
                available: 7
            }
        ));
        assert_eq!(game.food_count(id).unwrap(), 7);
    }

    #[test]
    fn test_non_food_type_consumes_nothing() {
        let (game, id) = colony_with_units(3);
        assert_eq!(game.food_consumption_by_type(id, classic::ORE).unwrap(), 0);
    }

    #[test]
    fn test_equipment_check_reads_without_consuming() {
        let (mut game, id) = colony_with_units(0);
        let dragoon = game.registry.equipment("dragoon").unwrap().clone();
        game.add_goods(id, classic::MUSKETS, 50).unwrap();
        assert!(!game.can_build_equipment(id, &dragoon).unwrap());

        game.add_goods(id, classic::HORSES, 60).unwrap();
        assert!(game.can_build_equipment(id, &dragoon).unwrap());
        assert_eq!(game.goods_count(id, classic::HORSES).unwrap(), 60);
        assert_eq!(game.goods_count(id, classic::MUSKETS).unwrap(), 50);
    }
}
