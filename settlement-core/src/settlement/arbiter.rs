// Disposal: take a settlement off the map and re-auction its land
//
// Each vacated tile is offered to the settlements working the tiles around
// it. Every adjacent tile a claimant holds is one vote, weighted by how
// close the claimant stands to the old owner:
//   same player                3
//   same european-ness         2
//   anyone else                1
// The highest tally wins. Equal tallies go to the lowest settlement id.

use std::collections::BTreeMap;

use super::Disposed;
use crate::error::{Result, SettlementError};
use crate::game::Game;
use crate::types::{PlayerId, SettlementId, TilePos};

pub const WEIGHT_SAME_OWNER: u32 = 3;
pub const WEIGHT_SAME_KIND: u32 = 2;
pub const WEIGHT_OTHER: u32 = 1;

impl Game {
    /// Destroy a settlement.
    ///
    /// Releases its land, detaches it from its tile and owner, hands each
    /// vacated tile to the best neighbouring claimant, and only then tells
    /// the old owner its view is stale. Goods, resident units and the
    /// settlement itself are removed from the game and reported back.
    pub fn dispose_settlement(&mut self, id: SettlementId) -> Result<Vec<Disposed>> {
        let Some(old_owner) = self.settlement_or_err(id)?.owner else {
            // An unread shell holds nothing on the map
            self.settlements.remove(&id);
            return Ok(vec![Disposed::Settlement(id)]);
        };
        let old_european = self.player_or_err(old_owner)?.is_european();

        // An unplaced settlement has no land around its tile
        let center = self.settlement_or_err(id)?.tile;
        let placed = self.map.tile(center).and_then(|t| t.settlement()) == Some(id);
        let mut lost = if placed { self.owned_tiles(id)? } else { Vec::new() };
        // Tiles kept beyond the radius, e.g. through a capture
        let strays: Vec<TilePos> = self
            .map
            .iter()
            .filter(|t| t.owning_settlement() == Some(id) && !lost.contains(&t.pos))
            .map(|t| t.pos)
            .collect();
        lost.extend(strays);
        for &pos in &lost {
            self.release_tile(id, pos)?;
        }

        let settlement = self
            .settlements
            .remove(&id)
            .ok_or(SettlementError::UnknownSettlement(id))?;
        if placed {
            if let Some(tile) = self.map.tile_mut(settlement.tile) {
                tile.set_settlement(None);
                tile.update_player_explored_tiles();
            }
        }
        if let Some(player) = self.players.get_mut(old_owner) {
            player.remove_settlement(id);
        }

        for &pos in &lost {
            self.redistribute(pos, old_owner, old_european)?;
        }

        if let Some(player) = self.players.get_mut(old_owner) {
            player.invalidate_can_see_tiles();
        }

        let units = settlement.units();
        for &unit in &units {
            self.units.remove(unit);
        }
        let mut disposed = settlement.goods.dispose();
        disposed.extend(units.into_iter().map(Disposed::Unit));
        disposed.push(Disposed::Settlement(id));
        Ok(disposed)
    }

    /// Run the vote for one vacated tile.
    fn redistribute(
        &mut self,
        lost: TilePos,
        old_owner: PlayerId,
        old_european: bool,
    ) -> Result<()> {
        if self
            .map
            .tile(lost)
            .is_some_and(|t| t.owning_settlement().is_some())
        {
            return Ok(());
        }

        let mut votes: BTreeMap<SettlementId, u32> = BTreeMap::new();
        for pos in self.map.surrounding_tiles(lost, 1) {
            let Some(claimant) = self.map.tile(pos).and_then(|t| t.owning_settlement()) else {
                continue;
            };
            if !self.settlements.contains_key(&claimant) {
                #[cfg(feature = "instrument")]
                tracing::warn!(
                    target: "diagnostic",
                    x = pos.x,
                    y = pos.y,
                    owning_settlement = claimant.0,
                    "tile is owned by an unknown settlement"
                );
                continue;
            }
            if !self.can_claim_tile(claimant, lost)? {
                continue;
            }
            let weight = self.vote_weight(claimant, old_owner, old_european)?;
            *votes.entry(claimant).or_insert(0) += weight;

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "vote",
                turn = self.turn,
                x = lost.x,
                y = lost.y,
                claimant = claimant.0,
                weight = weight,
                kind = "cast"
            );
        }

        // Ascending ids, strictly greater replaces: ties stay with the lowest id
        let mut best: Option<(SettlementId, u32)> = None;
        for (claimant, tally) in votes {
            if best.is_none_or(|(_, top)| tally > top) {
                best = Some((claimant, tally));
            }
        }

        if let Some((winner, _tally)) = best {
            self.claim_tile(winner, lost)?;

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "vote",
                turn = self.turn,
                x = lost.x,
                y = lost.y,
                claimant = winner.0,
                weight = _tally,
                kind = "award"
            );
        }
        Ok(())
    }

    fn vote_weight(
        &self,
        claimant: SettlementId,
        old_owner: PlayerId,
        old_european: bool,
    ) -> Result<u32> {
        let owner = self.owner_of(claimant)?;
        if owner == old_owner {
            return Ok(WEIGHT_SAME_OWNER);
        }
        if self.player_or_err(owner)?.is_european() == old_european {
            Ok(WEIGHT_SAME_KIND)
        } else {
            Ok(WEIGHT_OTHER)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::agents::{NationType, Player, PlayerKind, UnitRole};
    use crate::game::Game;
    use crate::geography::Map;
    use crate::invariants::check_invariants;
    use crate::settlement::{Disposed, Locatable, SettlementKind, VillageData, VillageKind};
    use crate::types::goods::classic;
    use crate::types::{AbstractGoods, TilePos};

    fn european(game: &mut Game, name: &str) -> crate::types::PlayerId {
        game.add_player(Player::new(name, PlayerKind::European, NationType::european()))
    }

    #[test]
    fn test_lone_settlement_leaves_land_unowned() {
        let mut game = Game::with_map(Map::from_rows(&["....."; 5]).unwrap());
        let dutch = european(&mut game, "Dutch");
        let id = game.found_colony(dutch, "A", TilePos::new(2, 2)).unwrap();

        game.dispose_settlement(id).unwrap();

        assert!(game.map.iter().all(|t| t.owner().is_none()
            && t.owning_settlement().is_none()
            && t.settlement().is_none()));
        assert!(game.settlement(id).is_none());
        assert!(!game.player(dutch).unwrap().has_settlement(id));
    }

    #[test]
    fn test_disposal_reports_goods_units_and_self() {
        let mut game = Game::with_map(Map::from_rows(&["....."; 5]).unwrap());
        let dutch = european(&mut game, "Dutch");
        let id = game.found_colony(dutch, "A", TilePos::new(2, 2)).unwrap();
        let unit = game.add_unit(dutch, UnitRole::Soldier).unwrap();
        game.add(id, Locatable::Unit(unit)).unwrap();
        game.add_goods(id, classic::TOOLS, 30).unwrap();

        let disposed = game.dispose_settlement(id).unwrap();
        assert_eq!(
            disposed,
            vec![
                Disposed::Goods(AbstractGoods::new(classic::TOOLS, 30)),
                Disposed::Unit(unit),
                Disposed::Settlement(id),
            ]
        );
        assert!(game.units.get(unit).is_none());
    }

    #[test]
    fn test_tie_goes_to_lowest_id() {
        // The doomed colony sits between two native camps across a strait;
        // each camp touches the centre with exactly one tile.
        let mut game = Game::with_map(Map::from_rows(&[".~.", "...", ".~."]).unwrap());
        let dutch = european(&mut game, "Dutch");
        let sioux = game.add_player(Player::new("Sioux", PlayerKind::Indian, NationType::nomadic()));
        let cree = game.add_player(Player::new("Cree", PlayerKind::Indian, NationType::nomadic()));

        let doomed = game.found_colony(dutch, "Middle", TilePos::new(1, 1)).unwrap();
        let east = game
            .found_village(cree, "East", TilePos::new(2, 1), VillageData::new("Cree", VillageKind::Camp))
            .unwrap();
        let west = game
            .found_village(sioux, "West", TilePos::new(0, 1), VillageData::new("Sioux", VillageKind::Camp))
            .unwrap();
        assert!(east < west);

        game.dispose_settlement(doomed).unwrap();

        let center = game.map.tile(TilePos::new(1, 1)).unwrap();
        assert_eq!(center.owning_settlement(), Some(east));
        assert_eq!(center.owner(), Some(cree));
    }

    #[test]
    fn test_captured_capital_releases_land_beyond_new_radius() {
        let mut game = Game::with_map(Map::from_rows(&["......."; 7]).unwrap());
        let dutch = european(&mut game, "Dutch");
        let inca = game.add_player(Player::new("Inca", PlayerKind::Indian, NationType::advanced()));
        let city = game
            .new_settlement(
                inca,
                "Cuzco",
                TilePos::new(3, 3),
                SettlementKind::NativeVillage(VillageData::new("Inca", VillageKind::IncaCity)),
            )
            .unwrap();
        game.set_capital(city, true).unwrap();
        game.place_settlement(city).unwrap();
        assert_eq!(game.map.tile(TilePos::new(0, 0)).unwrap().owning_settlement(), Some(city));

        game.change_owner(city, dutch).unwrap();
        assert_eq!(game.radius(city).unwrap(), 1);
        game.dispose_settlement(city).unwrap();

        assert!(game.map.iter().all(|t| t.owning_settlement().is_none()));
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_unplaced_settlement_leaves_the_map_alone() {
        let mut game = Game::with_map(Map::from_rows(&["....."; 5]).unwrap());
        let dutch = european(&mut game, "Dutch");
        let placed = game.found_colony(dutch, "A", TilePos::new(2, 2)).unwrap();
        let pending = game
            .new_settlement(dutch, "B", TilePos::new(3, 2), SettlementKind::colony())
            .unwrap();

        game.dispose_settlement(pending).unwrap();

        let tile = game.map.tile(TilePos::new(3, 2)).unwrap();
        assert_eq!(tile.owning_settlement(), Some(placed));
        assert_eq!(tile.owner(), Some(dutch));
        assert!(!game.player(dutch).unwrap().has_settlement(pending));
        assert_eq!(game.owned_tiles(placed).unwrap().len(), 9);
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_out_of_radius_neighbours_cannot_claim() {
        let mut game = Game::with_map(Map::from_rows(&["......"; 3]).unwrap());
        let dutch = european(&mut game, "Dutch");
        let tribe = game.add_player(Player::new(
            "Sioux",
            PlayerKind::Indian,
            NationType::nomadic(),
        ));
        game.found_village(tribe, "Camp", TilePos::new(1, 1), VillageData::new("Sioux", VillageKind::Camp))
            .unwrap();
        let colony = game.found_colony(dutch, "Fort", TilePos::new(3, 1)).unwrap();

        game.dispose_settlement(colony).unwrap();
        // (3,1) borders three camp tiles but lies two steps from the camp
        assert_eq!(
            game.map.tile(TilePos::new(3, 1)).unwrap().owning_settlement(),
            None
        );
    }
}
