// Tile claims: placement sweep, capture and the owned-tiles query

use super::SettlementKind;
use super::features::MODIFIER_LINE_OF_SIGHT;
use crate::error::{Result, SettlementError};
use crate::game::Game;
use crate::types::{Direction, PlayerId, SettlementId, TilePos};

impl Game {
    // ========================================================================
    // Radii
    // ========================================================================

    /// Claim radius: the owner's capital radius for a capital, its settlement
    /// radius otherwise. Ownerless shells use the configured base radius.
    pub fn radius(&self, id: SettlementId) -> Result<u32> {
        let settlement = self.settlement_or_err(id)?;
        let nation = settlement
            .owner
            .and_then(|o| self.players.get(o))
            .map(|p| p.nation);
        Ok(match nation {
            Some(nation) if settlement.is_capital => nation.capital_radius,
            Some(nation) => nation.settlement_radius,
            None => self.config.base_radius,
        })
    }

    /// Exploration radius, widened or narrowed by line-of-sight modifiers.
    pub fn line_of_sight(&self, id: SettlementId) -> Result<u32> {
        let settlement = self.settlement_or_err(id)?;
        let base = self.config.default_line_of_sight as f32;
        let sight = settlement.features.apply(MODIFIER_LINE_OF_SIGHT, base);
        Ok(sight.max(0.0).round() as u32)
    }

    fn owned_by_natives(&self, owner: Option<PlayerId>) -> bool {
        owner
            .and_then(|o| self.players.get(o))
            .is_some_and(|p| p.is_indian())
    }

    // ========================================================================
    // Claim protocol
    // ========================================================================

    /// Whether `id` may take `pos`: natives never claim water, the tile must
    /// lie within the claim radius, and no other settlement may hold it.
    pub fn can_claim_tile(&self, id: SettlementId, pos: TilePos) -> Result<bool> {
        let settlement = self.settlement_or_err(id)?;
        let Some(tile) = self.map.tile(pos) else {
            return Ok(false);
        };
        if self.owned_by_natives(settlement.owner) && !tile.is_land() {
            return Ok(false);
        }
        if settlement.tile.distance_to(pos) > self.radius(id)? {
            return Ok(false);
        }
        Ok(tile.owner().is_none()
            || tile.owning_settlement().is_none()
            || tile.owning_settlement() == Some(id))
    }

    /// Take `pos` for `id` and its owner. Does not check distance.
    pub fn claim_tile(&mut self, id: SettlementId, pos: TilePos) -> Result<()> {
        let owner = self.owner_of(id)?;
        let tile = self.map.tile_mut(pos).ok_or(SettlementError::OffMap(pos))?;
        let previous = tile.owning_settlement();
        tile.set_owning_settlement(Some(id));
        tile.set_owner(Some(owner));
        tile.update_player_explored_tiles();

        // A colony losing the tile loses its worker there too
        if let Some(previous) = previous.filter(|p| *p != id) {
            if let Some(SettlementKind::Colony(colony)) =
                self.settlements.get_mut(&previous).map(|s| &mut s.kind)
            {
                colony.relocate_workers(pos);
            }
        }

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "claim",
            turn = self.turn,
            settlement = id.0,
            x = pos.x,
            y = pos.y,
            previous = previous.map_or(-1, |p| i64::from(p.0))
        );
        Ok(())
    }

    /// Drop both ownership pointers of a tile held by `id`.
    pub(crate) fn release_tile(&mut self, id: SettlementId, pos: TilePos) -> Result<()> {
        let tile = self.map.tile_mut(pos).ok_or(SettlementError::OffMap(pos))?;
        tile.release();
        tile.update_player_explored_tiles();

        if let Some(SettlementKind::Colony(colony)) =
            self.settlements.get_mut(&id).map(|s| &mut s.kind)
        {
            colony.relocate_workers(pos);
        }

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "release",
            turn = self.turn,
            settlement = id.0,
            x = pos.x,
            y = pos.y
        );
        Ok(())
    }

    /// Re-evaluate every tile within `extent` of the settlement under the
    /// current owner's rules. Tiles already held are re-tagged with the owner,
    /// or released if a native owner may not keep them.
    fn claim_sweep(&mut self, id: SettlementId, extent: u32) -> Result<()> {
        let settlement = self.settlement_or_err(id)?;
        let center = settlement.tile;
        let owner = settlement.owner.ok_or(SettlementError::Unowned(id))?;
        let native = self.owned_by_natives(Some(owner));

        for pos in self.map.surrounding_tiles(center, extent) {
            let Some(tile) = self.map.tile(pos) else {
                continue;
            };
            if tile.owning_settlement() == Some(id) {
                if native && !tile.is_land() {
                    self.release_tile(id, pos)?;
                } else if tile.owner() != Some(owner) {
                    self.claim_tile(id, pos)?;
                }
            } else if self.can_claim_tile(id, pos)? {
                self.claim_tile(id, pos)?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Placement & capture
    // ========================================================================

    /// Put a prepared settlement onto the map: claim its tile and every
    /// claimable tile in radius, explore its line of sight, then tell the
    /// owner its view is stale.
    pub fn place_settlement(&mut self, id: SettlementId) -> Result<()> {
        let owner = self.owner_of(id)?;
        let center = self.settlement_or_err(id)?.tile;
        let tile = self.map.tile(center).ok_or(SettlementError::OffMap(center))?;
        if let Some(existing) = tile.settlement().filter(|s| *s != id) {
            return Err(SettlementError::TileOccupied {
                pos: center,
                existing,
            });
        }

        self.claim_tile(id, center)?;
        self.set_explored(owner, center)?;
        self.update_player_explored_tiles(center);

        let radius = self.radius(id)?;
        self.claim_sweep(id, radius)?;

        let sight = self.line_of_sight(id)?;
        for pos in self.map.surrounding_tiles(center, sight) {
            self.set_explored(owner, pos)?;
        }

        if let Some(tile) = self.map.tile_mut(center) {
            tile.set_settlement(Some(id));
            tile.update_player_explored_tiles();
        }
        self.player_mut_or_err(owner)?.invalidate_can_see_tiles();
        Ok(())
    }

    /// Hand the settlement to `new_owner` and re-run the claim sweep under
    /// the new owner's rules. Capital status does not survive capture.
    ///
    /// Tiles held beyond the new radius are kept and re-tagged; they are
    /// cleaned up when the settlement is disposed.
    pub fn change_owner(&mut self, id: SettlementId, new_owner: PlayerId) -> Result<()> {
        self.player_or_err(new_owner)?;
        let old_owner = self.owner_of(id)?;
        if old_owner == new_owner {
            return Ok(());
        }
        let old_radius = self.radius(id)?;

        {
            let settlement = self.settlement_mut_internal(id)?;
            settlement.owner = Some(new_owner);
            settlement.is_capital = false;
        }
        if let Some(old) = self.players.get_mut(old_owner) {
            old.remove_settlement(id);
        }
        self.player_mut_or_err(new_owner)?.add_settlement(id);

        let center = self.settlement_or_err(id)?.tile;
        self.claim_tile(id, center)?;
        let extent = old_radius.max(self.radius(id)?);
        self.claim_sweep(id, extent)?;

        if let Some(old) = self.players.get_mut(old_owner) {
            old.invalidate_can_see_tiles();
        }
        self.player_mut_or_err(new_owner)?.invalidate_can_see_tiles();

        self.notify_owner_changed(id, old_owner, new_owner);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "owner_changed",
            turn = self.turn,
            settlement = id.0,
            old_owner = crate::types::KeyToU64::to_u64(old_owner),
            new_owner = crate::types::KeyToU64::to_u64(new_owner)
        );
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The settlement tile followed by every tile in radius that the
    /// settlement holds, or that its owner holds with no settlement working it.
    pub fn owned_tiles(&self, id: SettlementId) -> Result<Vec<TilePos>> {
        let settlement = self.settlement_or_err(id)?;
        let center = settlement.tile;
        let mut tiles = vec![center];
        for pos in self.map.surrounding_tiles(center, self.radius(id)?) {
            let Some(tile) = self.map.tile(pos) else {
                continue;
            };
            let held = tile.owning_settlement() == Some(id);
            let loose = tile.owning_settlement().is_none()
                && tile.owner().is_some()
                && tile.owner() == settlement.owner;
            if held || loose {
                tiles.push(pos);
            }
        }
        Ok(tiles)
    }

    /// Neighbourhood cell in the 3x3 diamond layout used by colony panels.
    /// `(1, 1)` is the settlement tile; `None` outside the grid or the map.
    pub fn tile_at(&self, id: SettlementId, x: u32, y: u32) -> Result<Option<TilePos>> {
        let center = self.settlement_or_err(id)?.tile;
        let direction = match (x, y) {
            (1, 1) => return Ok(Some(center)),
            (0, 0) => Direction::N,
            (0, 1) => Direction::NE,
            (0, 2) => Direction::E,
            (1, 0) => Direction::NW,
            (1, 2) => Direction::SE,
            (2, 0) => Direction::W,
            (2, 1) => Direction::SW,
            (2, 2) => Direction::S,
            _ => return Ok(None),
        };
        Ok(self.map.neighbor_or_null(center, direction))
    }
}

#[cfg(test)]
mod tests {
    use crate::agents::{NationType, Player, PlayerKind};
    use crate::game::Game;
    use crate::geography::Map;
    use crate::settlement::{Modifier, VillageData, VillageKind};
    use crate::settlement::features::MODIFIER_LINE_OF_SIGHT;
    use crate::types::TilePos;

    fn game_with(rows: &[&str]) -> Game {
        Game::with_map(Map::from_rows(rows).unwrap())
    }

    #[test]
    fn test_capital_uses_capital_radius() {
        let mut game = game_with(&[".......", ".......", ".......", ".......", ".......", ".......", "......."]);
        let tribe = game.add_player(Player::new(
            "Inca",
            PlayerKind::Indian,
            NationType::advanced(),
        ));
        let id = game
            .found_village(tribe, "Cuzco", TilePos::new(3, 3), VillageData::new("Inca", VillageKind::IncaCity))
            .unwrap();
        assert_eq!(game.radius(id).unwrap(), 2);

        game.set_capital(id, true).unwrap();
        assert_eq!(game.radius(id).unwrap(), 3);
    }

    #[test]
    fn test_line_of_sight_modifier() {
        let mut game = game_with(&["....."; 5]);
        let dutch = game.add_player(Player::new(
            "Dutch",
            PlayerKind::European,
            NationType::european(),
        ));
        let id = game.found_colony(dutch, "A", TilePos::new(2, 2)).unwrap();
        assert_eq!(game.line_of_sight(id).unwrap(), 2);

        game.settlement_mut(id)
            .unwrap()
            .features_mut()
            .add_modifier(Modifier::additive(MODIFIER_LINE_OF_SIGHT, 1.0));
        assert_eq!(game.line_of_sight(id).unwrap(), 3);
    }

    #[test]
    fn test_claim_does_not_steal_from_neighbours() {
        let mut game = game_with(&["......"; 3]);
        let dutch = game.add_player(Player::new(
            "Dutch",
            PlayerKind::European,
            NationType::european(),
        ));
        let a = game.found_colony(dutch, "A", TilePos::new(1, 1)).unwrap();
        let b = game.found_colony(dutch, "B", TilePos::new(3, 1)).unwrap();

        // Column 2 went to whoever was placed first
        for y in 0..3 {
            let tile = game.map.tile(TilePos::new(2, y)).unwrap();
            assert_eq!(tile.owning_settlement(), Some(a));
        }
        assert!(!game.can_claim_tile(b, TilePos::new(2, 0)).unwrap());
        assert!(game.can_claim_tile(b, TilePos::new(4, 0)).unwrap());
        assert!(!game.can_claim_tile(b, TilePos::new(5, 0)).unwrap());
    }

    #[test]
    fn test_tile_at_follows_diamond_layout() {
        let mut game = game_with(&["....."; 5]);
        let dutch = game.add_player(Player::new(
            "Dutch",
            PlayerKind::European,
            NationType::european(),
        ));
        let id = game.found_colony(dutch, "A", TilePos::new(2, 2)).unwrap();

        assert_eq!(game.tile_at(id, 1, 1).unwrap(), Some(TilePos::new(2, 2)));
        assert_eq!(game.tile_at(id, 0, 0).unwrap(), Some(TilePos::new(2, 1)));
        assert_eq!(game.tile_at(id, 0, 2).unwrap(), Some(TilePos::new(3, 2)));
        assert_eq!(game.tile_at(id, 2, 2).unwrap(), Some(TilePos::new(2, 3)));
        assert_eq!(game.tile_at(id, 3, 0).unwrap(), None);
    }

    #[test]
    fn test_native_capture_of_coastal_colony_releases_water() {
        let mut game = game_with(&["...", ".~.", "..."]);
        let dutch = game.add_player(Player::new(
            "Dutch",
            PlayerKind::European,
            NationType::european(),
        ));
        let tribe = game.add_player(Player::new(
            "Arawak",
            PlayerKind::Indian,
            NationType::agricultural(),
        ));
        let id = game.found_colony(dutch, "A", TilePos::new(1, 0)).unwrap();
        let water = TilePos::new(1, 1);
        assert_eq!(game.map.tile(water).unwrap().owning_settlement(), Some(id));

        game.change_owner(id, tribe).unwrap();
        let tile = game.map.tile(water).unwrap();
        assert_eq!(tile.owning_settlement(), None);
        assert_eq!(tile.owner(), None);
        assert_eq!(
            game.map.tile(TilePos::new(0, 0)).unwrap().owner(),
            Some(tribe)
        );
    }
}
