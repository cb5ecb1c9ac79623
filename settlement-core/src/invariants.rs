//! Settlement invariants - consistency checks between settlements, tiles
//! and players.
//!
//! These should NEVER trigger after any public operation of [`Game`]
//! returns. If they do, the claim protocol has a bug.
//!
//! Tiles a captured settlement holds beyond its current radius are not
//! reported; they are tolerated until the settlement is disposed.

use std::collections::BTreeMap;

use crate::game::Game;
use crate::types::{KeyToU64, PlayerId, SettlementId};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(violations: &mut Vec<InvariantViolation>, message: String) {
    violations.push(InvariantViolation { message });
}

/// Check all settlement invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
/// Unread shells are skipped.
#[must_use]
pub fn check_invariants(game: &Game) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut capitals: BTreeMap<PlayerId, Vec<SettlementId>> = BTreeMap::new();

    for settlement in game.settlements() {
        let id = settlement.id();
        let Some(owner) = settlement.owner() else {
            continue;
        };

        // Home tile back-pointers
        match game.map.tile(settlement.tile()) {
            None => violation(
                &mut violations,
                format!("{id} sits on off-map tile {}", settlement.tile()),
            ),
            Some(tile) => {
                if tile.settlement() != Some(id) {
                    violation(
                        &mut violations,
                        format!(
                            "{id} at {} but the tile holds {:?}",
                            settlement.tile(),
                            tile.settlement()
                        ),
                    );
                }
                if tile.owning_settlement() != Some(id) {
                    violation(
                        &mut violations,
                        format!(
                            "{id} does not own its own tile {} (owned by {:?})",
                            settlement.tile(),
                            tile.owning_settlement()
                        ),
                    );
                }
            }
        }

        // Owner registration
        match game.player(owner) {
            None => violation(
                &mut violations,
                format!("{id} is owned by missing player {}", owner.to_u64()),
            ),
            Some(player) => {
                if !player.has_settlement(id) {
                    violation(
                        &mut violations,
                        format!("{id} is missing from its owner's settlement list"),
                    );
                }
            }
        }

        if settlement.is_capital() {
            capitals.entry(owner).or_default().push(id);
        }

        // Storage bounds
        let capacity = settlement.goods().capacity();
        for lot in settlement.goods().iter_goods() {
            if lot.amount > capacity {
                violation(
                    &mut violations,
                    format!(
                        "{id} holds {} of goods {:?}, above capacity {capacity}",
                        lot.amount, lot.goods_type
                    ),
                );
            }
        }
    }

    for (owner, ids) in capitals {
        if ids.len() > 1 {
            violation(
                &mut violations,
                format!("player {} has {} capitals: {ids:?}", owner.to_u64(), ids.len()),
            );
        }
    }

    // Player lists only name live settlements they own
    for (player_id, player) in &game.players {
        for &id in player.settlements() {
            match game.settlement(id) {
                None => violation(
                    &mut violations,
                    format!("player {} lists disposed {id}", player_id.to_u64()),
                ),
                Some(s) if s.owner() != Some(player_id) => violation(
                    &mut violations,
                    format!("player {} lists {id} owned by someone else", player_id.to_u64()),
                ),
                Some(_) => {}
            }
        }
    }

    // Tile ownership pointers
    for tile in game.map.iter() {
        let Some(owning) = tile.owning_settlement() else {
            continue;
        };
        let Some(settlement) = game.settlement(owning) else {
            violation(
                &mut violations,
                format!("tile {} is owned by disposed {owning}", tile.pos),
            );
            continue;
        };
        if tile.owner() != settlement.owner() {
            violation(
                &mut violations,
                format!(
                    "tile {} belongs to {owning} but names a different owner",
                    tile.pos
                ),
            );
        }
        let native = settlement
            .owner()
            .and_then(|o| game.player(o))
            .is_some_and(|p| p.is_indian());
        if native && !tile.is_land() {
            violation(
                &mut violations,
                format!("native {owning} owns water tile {}", tile.pos),
            );
        }
    }

    violations
}

/// Panic with every violation if any invariant is broken.
pub fn assert_invariants(game: &Game) {
    let violations = check_invariants(game);
    if !violations.is_empty() {
        let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
        panic!("{}", messages.join("\n"));
    }
}
