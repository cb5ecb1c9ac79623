//! End-to-end settlement scenarios: placement, the native water rule,
//! capture, the disposal vote and food drain.

use settlement_core::goods::classic;
use settlement_core::{
    ColonyData, Game, Locatable, Map, NationType, Player, PlayerId, PlayerKind, SettlementError,
    SettlementId, SettlementKind, TilePos, UnitId, UnitRole, VillageData, VillageKind,
    check_invariants,
};

// === TEST FIXTURES ===

fn european(game: &mut Game, name: &str) -> PlayerId {
    game.add_player(Player::new(name, PlayerKind::European, NationType::european()))
}

fn native(game: &mut Game, name: &str) -> PlayerId {
    game.add_player(Player::new(name, PlayerKind::Indian, NationType::agricultural()))
}

fn camp(tribe: &str) -> VillageData {
    VillageData::new(tribe, VillageKind::Camp)
}

fn square(center: TilePos, radius: i32) -> Vec<TilePos> {
    let mut tiles = Vec::new();
    for y in center.y - radius..=center.y + radius {
        for x in center.x - radius..=center.x + radius {
            tiles.push(TilePos::new(x, y));
        }
    }
    tiles
}

/// A 5x5 all-land map with one Dutch colony in the middle.
fn isolated_colony() -> (Game, PlayerId, SettlementId) {
    let mut game = Game::with_map(Map::from_rows(&["....."; 5]).unwrap());
    let dutch = european(&mut game, "Dutch");
    let colony = game.found_colony(dutch, "Nieuw Amsterdam", TilePos::new(2, 2)).unwrap();
    (game, dutch, colony)
}

fn colony_data(game: &Game, id: SettlementId) -> &ColonyData {
    match game.settlement(id).unwrap().kind() {
        SettlementKind::Colony(colony) => colony,
        SettlementKind::NativeVillage(_) => panic!("{id} is not a colony"),
    }
}

fn colony_with_residents(units: usize) -> (Game, SettlementId) {
    let (mut game, dutch, colony) = isolated_colony();
    for _ in 0..units {
        let unit = game.add_unit(dutch, UnitRole::Colonist).unwrap();
        game.add(colony, Locatable::Unit(unit)).unwrap();
    }
    (game, colony)
}

// === S1: ISOLATED PLACEMENT ===

#[test]
fn isolated_placement_claims_full_radius() {
    let (game, dutch, colony) = isolated_colony();

    for pos in square(TilePos::new(2, 2), 1) {
        let tile = game.map.tile(pos).unwrap();
        assert_eq!(tile.owning_settlement(), Some(colony), "tile {pos}");
        assert_eq!(tile.owner(), Some(dutch), "tile {pos}");
    }
    // Ring outside the radius stays free
    assert_eq!(game.map.tile(TilePos::new(0, 0)).unwrap().owner(), None);
    assert_eq!(game.map.tile(TilePos::new(4, 2)).unwrap().owner(), None);

    assert_eq!(game.settlement_at(TilePos::new(2, 2)), Some(colony));
    assert_eq!(game.owned_tiles(colony).unwrap().len(), 9);
    assert_eq!(game.owned_tiles(colony).unwrap()[0], TilePos::new(2, 2));

    let player = game.player(dutch).unwrap();
    assert!(player.has_settlement(colony));
    assert!(player.has_explored(TilePos::new(0, 0)), "line of sight 2 covers the map");
    assert_eq!(player.visibility_invalidations(), 1);
    assert!(check_invariants(&game).is_empty());
}

// === S2: NATIVE WATER RULE ===

#[test]
fn native_village_never_claims_water() {
    let mut game = Game::with_map(
        Map::from_rows(&[".....", ".....", ".....", "..~..", "....."]).unwrap(),
    );
    let arawak = native(&mut game, "Arawak");
    let village = game
        .found_village(arawak, "Yaguana", TilePos::new(2, 2), camp("Arawak"))
        .unwrap();

    let water = TilePos::new(2, 3);
    assert_eq!(game.map.tile(water).unwrap().owning_settlement(), None);
    assert_eq!(game.map.tile(water).unwrap().owner(), None);
    assert!(!game.can_claim_tile(village, water).unwrap());

    let owned: Vec<TilePos> = square(TilePos::new(2, 2), 1)
        .into_iter()
        .filter(|p| game.map.tile(*p).unwrap().owning_settlement() == Some(village))
        .collect();
    assert_eq!(owned.len(), 8);
    assert!(!owned.contains(&water));
}

#[test]
fn european_colony_claims_water() {
    let mut game = Game::with_map(
        Map::from_rows(&[".....", ".....", ".....", "..~..", "....."]).unwrap(),
    );
    let dutch = european(&mut game, "Dutch");
    let colony = game.found_colony(dutch, "Haven", TilePos::new(2, 2)).unwrap();

    assert_eq!(
        game.map.tile(TilePos::new(2, 3)).unwrap().owning_settlement(),
        Some(colony)
    );
}

// === S3: CAPTURE ===

#[test]
fn capture_moves_settlement_between_players() {
    let (mut game, dutch, colony) = isolated_colony();
    let sioux = native(&mut game, "Sioux");
    let dutch_before = game.player(dutch).unwrap().visibility_invalidations();
    let sioux_before = game.player(sioux).unwrap().visibility_invalidations();

    game.change_owner(colony, sioux).unwrap();

    assert!(!game.player(dutch).unwrap().has_settlement(colony));
    assert!(game.player(sioux).unwrap().has_settlement(colony));
    assert_eq!(game.settlement(colony).unwrap().owner(), Some(sioux));
    assert!(game.player(dutch).unwrap().visibility_invalidations() > dutch_before);
    assert!(game.player(sioux).unwrap().visibility_invalidations() > sioux_before);
    assert!(game.player(dutch).unwrap().can_see_cache().is_none());

    for pos in square(TilePos::new(2, 2), 1) {
        let tile = game.map.tile(pos).unwrap();
        assert_eq!(tile.owning_settlement(), Some(colony));
        assert_eq!(tile.owner(), Some(sioux));
    }
    assert!(check_invariants(&game).is_empty());
}

#[test]
fn native_capture_releases_claimed_water() {
    let mut game = Game::with_map(
        Map::from_rows(&[".....", ".....", ".....", ".~~..", "....."]).unwrap(),
    );
    let dutch = european(&mut game, "Dutch");
    let sioux = native(&mut game, "Sioux");
    let colony = game.found_colony(dutch, "Haven", TilePos::new(2, 2)).unwrap();
    assert_eq!(game.owned_tiles(colony).unwrap().len(), 9);

    game.change_owner(colony, sioux).unwrap();

    for water in [TilePos::new(1, 3), TilePos::new(2, 3)] {
        let tile = game.map.tile(water).unwrap();
        assert_eq!(tile.owning_settlement(), None, "tile {water}");
        assert_eq!(tile.owner(), None, "tile {water}");
    }
    assert_eq!(game.owned_tiles(colony).unwrap().len(), 7);
    assert!(check_invariants(&game).is_empty());
}

#[test]
fn capture_notifies_listener_once() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let (mut game, dutch, colony) = isolated_colony();
    let english = european(&mut game, "English");
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    game.set_listener(move |s, old, new| sink.borrow_mut().push((s, old, new)));

    game.change_owner(colony, english).unwrap();
    game.change_owner(colony, english).unwrap();

    assert_eq!(events.borrow().as_slice(), &[(colony, dutch, english)]);
}

// === S4: DISPOSAL VOTE ===

/// Colony A (Dutch) at (3,3); Dutch colony Z at (1,1) and English colony B
/// at (3,1) were founded after it, so they hold only the rim A left free.
fn contested_border() -> (Game, [SettlementId; 3], [PlayerId; 2]) {
    let mut game = Game::with_map(Map::from_rows(&["......."; 7]).unwrap());
    let dutch = european(&mut game, "Dutch");
    let english = european(&mut game, "English");
    let a = game.found_colony(dutch, "A", TilePos::new(3, 3)).unwrap();
    let z = game.found_colony(dutch, "Z", TilePos::new(1, 1)).unwrap();
    let b = game.found_colony(english, "B", TilePos::new(3, 1)).unwrap();
    (game, [a, z, b], [dutch, english])
}

#[test]
fn disposal_prefers_same_owner_neighbour() {
    let (mut game, [a, z, b], [dutch, english]) = contested_border();

    // Both neighbours border (2,2); only B borders (3,2)
    game.dispose_settlement(a).unwrap();

    let corner = game.map.tile(TilePos::new(2, 2)).unwrap();
    assert_eq!(corner.owning_settlement(), Some(z));
    assert_eq!(corner.owner(), Some(dutch));

    let edge = game.map.tile(TilePos::new(3, 2)).unwrap();
    assert_eq!(edge.owning_settlement(), Some(b));
    assert_eq!(edge.owner(), Some(english));

    // Out of everyone's reach
    let center = game.map.tile(TilePos::new(3, 3)).unwrap();
    assert_eq!(center.owning_settlement(), None);
    assert_eq!(center.settlement(), None);
    assert!(check_invariants(&game).is_empty());
}

#[test]
fn disposal_is_deterministic() {
    let ownership = |game: &Game| {
        game.map
            .iter()
            .map(|t| (t.pos, t.owner(), t.owning_settlement()))
            .collect::<Vec<_>>()
    };

    let (mut first, [a, ..], _) = contested_border();
    let (mut second, [a2, ..], _) = contested_border();
    first.dispose_settlement(a).unwrap();
    second.dispose_settlement(a2).unwrap();

    assert_eq!(ownership(&first), ownership(&second));
}

#[test]
fn disposed_settlement_cannot_be_used() {
    let (mut game, [a, ..], [dutch, _]) = contested_border();
    game.dispose_settlement(a).unwrap();

    assert!(!game.player(dutch).unwrap().has_settlement(a));
    assert!(matches!(
        game.dispose_settlement(a),
        Err(SettlementError::UnknownSettlement(_))
    ));
    assert!(matches!(
        game.add_goods(a, classic::FURS, 1),
        Err(SettlementError::UnknownSettlement(_))
    ));
}

// === S5 / S6: FOOD DRAIN ===

#[test]
fn food_drain_takes_fish_before_corn() {
    let (mut game, colony) = colony_with_residents(6);
    game.add_goods(colony, classic::FOOD, 10).unwrap();
    game.add_goods(colony, classic::FISH, 5).unwrap();
    assert_eq!(game.food_consumption(colony).unwrap(), 12);

    game.remove_food(colony, 12).unwrap();

    assert_eq!(game.goods_count(colony, classic::FISH).unwrap(), 0);
    assert_eq!(game.goods_count(colony, classic::FOOD).unwrap(), 3);
}

#[test]
fn under_provisioned_food_drain_faults_without_change() {
    let (mut game, colony) = colony_with_residents(6);
    game.add_goods(colony, classic::FOOD, 3).unwrap();
    game.add_goods(colony, classic::FISH, 4).unwrap();

    let err = game.remove_food(colony, 12).unwrap_err();
    assert!(matches!(err, SettlementError::InsufficientFood { .. }));

    assert_eq!(game.goods_count(colony, classic::FOOD).unwrap(), 3);
    assert_eq!(game.goods_count(colony, classic::FISH).unwrap(), 4);
}

#[test]
fn starving_turn_eats_what_there_is() {
    let (mut game, colony) = colony_with_residents(6);
    game.add_goods(colony, classic::FISH, 1).unwrap();

    game.new_turn(colony).unwrap();

    // Plains centre grows 5 food; 12 are wanted, 6 are on hand
    assert_eq!(game.food_count(colony).unwrap(), 0);
}

// === WORKED TILES CHANGING HANDS ===

/// Dutch colony at (1,2) with one colonist farming (2,2) and one mining (2,1).
fn worked_colony() -> (Game, PlayerId, SettlementId, [UnitId; 2]) {
    let mut game = Game::with_map(Map::from_rows(&["......."; 5]).unwrap());
    let dutch = european(&mut game, "Dutch");
    let colony = game.found_colony(dutch, "Pavonia", TilePos::new(1, 2)).unwrap();
    let farmer = game.add_unit(dutch, UnitRole::Colonist).unwrap();
    let miner = game.add_unit(dutch, UnitRole::Colonist).unwrap();
    game.add(colony, Locatable::Unit(farmer)).unwrap();
    game.add(colony, Locatable::Unit(miner)).unwrap();
    game.assign_worker(colony, farmer, TilePos::new(2, 2), classic::FOOD).unwrap();
    game.assign_worker(colony, miner, TilePos::new(2, 1), classic::ORE).unwrap();
    (game, dutch, colony, [farmer, miner])
}

#[test]
fn founding_on_a_worked_tile_sends_the_worker_indoors() {
    let (mut game, dutch, colony, [farmer, miner]) = worked_colony();
    assert!(colony_data(&game, colony).indoor().is_empty());

    let newcomer = game.found_colony(dutch, "Bergen", TilePos::new(2, 2)).unwrap();

    let data = colony_data(&game, colony);
    assert!(data.worker_on(TilePos::new(2, 2)).is_none());
    assert_eq!(data.indoor(), &[farmer]);
    assert_eq!(data.worker_on(TilePos::new(2, 1)).map(|w| w.unit), Some(miner));
    assert_eq!(game.unit_count(colony).unwrap(), 2);
    assert_eq!(
        game.map.tile(TilePos::new(2, 2)).unwrap().owning_settlement(),
        Some(newcomer)
    );
    assert!(check_invariants(&game).is_empty());
}

#[test]
fn claiming_a_worked_tile_sends_the_worker_indoors() {
    let (mut game, dutch, colony, [_, miner]) = worked_colony();
    let neighbour = game.found_colony(dutch, "Bergen", TilePos::new(4, 2)).unwrap();

    game.claim_tile(neighbour, TilePos::new(2, 1)).unwrap();

    let data = colony_data(&game, colony);
    assert!(data.worker_on(TilePos::new(2, 1)).is_none());
    assert_eq!(data.indoor(), &[miner]);
    let tile = game.map.tile(TilePos::new(2, 1)).unwrap();
    assert_eq!(tile.owning_settlement(), Some(neighbour));
    assert_eq!(tile.owner(), Some(dutch));
}
