// Abilities and modifiers attached to a settlement by game rules

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ABILITY_STOCKADE: &str = "stockade";
pub const ABILITY_FORT: &str = "fort";
pub const ABILITY_FORTRESS: &str = "fortress";
pub const MODIFIER_LINE_OF_SIGHT: &str = "line_of_sight_bonus";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    Additive,
    Percentage,
    Multiplicative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: String,
    pub kind: ModifierKind,
    pub value: f32,
}

impl Modifier {
    pub fn additive(id: &str, value: f32) -> Self {
        Self {
            id: id.to_string(),
            kind: ModifierKind::Additive,
            value,
        }
    }

    pub fn percentage(id: &str, value: f32) -> Self {
        Self {
            id: id.to_string(),
            kind: ModifierKind::Percentage,
            value,
        }
    }

    pub fn multiplicative(id: &str, value: f32) -> Self {
        Self {
            id: id.to_string(),
            kind: ModifierKind::Multiplicative,
            value,
        }
    }
}

/// Bag of abilities and modifiers. The settlement core only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    abilities: BTreeMap<String, bool>,
    modifiers: Vec<Modifier>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// An ability set to `false` explicitly denies it.
    pub fn set_ability(&mut self, id: &str, value: bool) {
        self.abilities.insert(id.to_string(), value);
    }

    pub fn remove_ability(&mut self, id: &str) {
        self.abilities.remove(id);
    }

    pub fn has_ability(&self, id: &str) -> bool {
        self.abilities.get(id).copied().unwrap_or(false)
    }

    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    pub fn remove_modifiers(&mut self, id: &str) {
        self.modifiers.retain(|m| m.id != id);
    }

    pub fn modifiers<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Modifier> + 'a {
        self.modifiers.iter().filter(move |m| m.id == id)
    }

    /// Apply every modifier named `id` to `base`: additive first, then
    /// percentages (summed), then multipliers.
    pub fn apply(&self, id: &str, base: f32) -> f32 {
        let mut additive = 0.0;
        let mut percentage = 0.0;
        let mut multiplier = 1.0;
        for modifier in self.modifiers(id) {
            match modifier.kind {
                ModifierKind::Additive => additive += modifier.value,
                ModifierKind::Percentage => percentage += modifier.value,
                ModifierKind::Multiplicative => multiplier *= modifier.value,
            }
        }
        (base + additive) * (1.0 + percentage / 100.0) * multiplier
    }
}
