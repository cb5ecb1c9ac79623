// Seeded demo worlds for the browser front-end and for property tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agents::{NationType, Player, PlayerKind, UnitRole};
use crate::error::Result;
use crate::game::Game;
use crate::geography::Map;
use crate::settlement::{Locatable, VillageData, VillageKind};
use crate::types::goods::classic;
use crate::types::{PlayerId, SettlementId, TilePos};

/// Shape of a generated demo world.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioConfig {
    pub width: i32,
    pub height: i32,
    pub water_ratio: f64,
    pub settlements_per_player: u32,
    /// Minimum chessboard gap between settlement sites.
    pub spacing: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            width: 24,
            height: 16,
            water_ratio: 0.1,
            settlements_per_player: 3,
            spacing: 2,
        }
    }
}

/// Two colonial powers and two tribes sharing a random continent.
pub fn demo_game(seed: u64) -> Result<Game> {
    generate(seed, &ScenarioConfig::default())
}

pub fn generate(seed: u64, config: &ScenarioConfig) -> Result<Game> {
    let map = Map::random(config.width, config.height, seed, config.water_ratio);
    let mut game = Game::with_map(map);
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));

    let roster = [
        Player::new("Dutch", PlayerKind::European, NationType::european()).with_gold(1000),
        Player::new("English", PlayerKind::European, NationType::european()).with_gold(800),
        Player::new("Arawak", PlayerKind::Indian, NationType::agricultural()),
        Player::new("Aztec", PlayerKind::Indian, NationType::advanced()),
    ];
    let players: Vec<PlayerId> = roster.into_iter().map(|p| game.add_player(p)).collect();

    for round in 0..config.settlements_per_player {
        for &player in &players {
            let Some(site) = pick_site(&game, &mut rng, config.spacing) else {
                continue;
            };
            let id = found(&mut game, player, site, round)?;
            if round == 0 && !game.player_or_err(player)?.is_european() {
                game.set_capital(id, true)?;
            }
            stock(&mut game, &mut rng, player, id)?;
        }
    }
    Ok(game)
}

fn found(game: &mut Game, player: PlayerId, site: TilePos, round: u32) -> Result<SettlementId> {
    let owner = game.player_or_err(player)?;
    let name = format!("{} {}", owner.name, round + 1);
    if owner.is_european() {
        return game.found_colony(player, name, site);
    }
    let (kind, treasure) = if owner.nation == NationType::advanced() {
        (VillageKind::AztecCity, 500)
    } else {
        (VillageKind::Village, 100)
    };
    let village = VillageData::new(owner.name.clone(), kind).with_treasure(treasure);
    game.found_village(player, name, site, village)
}

/// A random land tile with no settlement within `spacing`.
fn pick_site(game: &Game, rng: &mut StdRng, spacing: u32) -> Option<TilePos> {
    const ATTEMPTS: u32 = 200;
    let (width, height) = (game.map.width(), game.map.height());
    if width < 3 || height < 3 {
        return None;
    }
    for _ in 0..ATTEMPTS {
        let pos = TilePos::new(rng.random_range(1..width - 1), rng.random_range(1..height - 1));
        let land = game.map.tile(pos).is_some_and(|t| t.is_land());
        let crowded = game
            .settlements()
            .any(|s| s.tile().distance_to(pos) <= spacing);
        if land && !crowded {
            return Some(pos);
        }
    }
    None
}

/// Give a fresh settlement a few residents and some stores.
fn stock(game: &mut Game, rng: &mut StdRng, player: PlayerId, id: SettlementId) -> Result<()> {
    let role = if game.player_or_err(player)?.is_european() {
        UnitRole::Colonist
    } else {
        UnitRole::Brave
    };
    for _ in 0..rng.random_range(1..=4) {
        let unit = game.add_unit(player, role)?;
        game.add(id, Locatable::Unit(unit))?;
    }
    game.add_goods(id, classic::FOOD, rng.random_range(10..=60))?;
    game.add_goods(id, classic::FISH, rng.random_range(0..=20))?;
    game.add_goods(id, classic::FURS, rng.random_range(0..=40))?;
    Ok(())
}
