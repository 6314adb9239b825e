//! Pure combat formulas.
//!
//! These functions calculate damage magnitudes without side effects. They
//! return unrounded values; flooring happens once, when the damage is applied
//! to a combatant, so multi-stage multipliers never compound truncation.

use rand::Rng;

use crate::character::sanitize;
use crate::core::config::{clamp_probability, CombatConfig};
use crate::core::constants::*;

/// Result of a stage-battle strike roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeRoll {
    pub damage: f64,
    /// Ambush and standard strikes are mutually exclusive.
    pub is_ambush: bool,
}

/// Result of a dungeon-mode player roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DungeonRoll {
    pub damage: f64,
    pub is_crit: bool,
}

/// Deterministic strike formula for a given variance multiplier.
pub fn strike_damage(attack_power: f64, variance: f64, ambush: Option<f64>) -> f64 {
    let base = sanitize(attack_power) * variance;
    match ambush {
        Some(multiplier) => base * multiplier,
        None => base,
    }
}

/// `attack_power * U(0.7, 1.3)`, times the ambush multiplier when the
/// independent ambush roll succeeds.
pub fn roll_strike_damage(
    attack_power: f64,
    config: &CombatConfig,
    rng: &mut impl Rng,
) -> StrikeRoll {
    let variance = rng.gen_range(STRIKE_VARIANCE_MIN..STRIKE_VARIANCE_MAX);
    let is_ambush = rng.gen_bool(clamp_probability(config.ambush_chance));
    let ambush = is_ambush.then_some(config.ambush_multiplier);
    StrikeRoll {
        damage: strike_damage(attack_power, variance, ambush),
        is_ambush,
    }
}

/// Dungeon crit chance: `base + per_rank * rank`, capped at 1.0.
pub fn dungeon_crit_chance(rank: u32, config: &CombatConfig) -> f64 {
    clamp_probability(config.dungeon_base_crit_chance + config.dungeon_crit_per_rank * rank as f64)
}

/// `attack_power * U(0.9, 1.1)`, doubled on a crit.
pub fn roll_dungeon_damage(
    attack_power: f64,
    rank: u32,
    config: &CombatConfig,
    rng: &mut impl Rng,
) -> DungeonRoll {
    let variance = rng.gen_range(DUNGEON_VARIANCE_MIN..DUNGEON_VARIANCE_MAX);
    let is_crit = rng.gen_bool(dungeon_crit_chance(rank, config));
    let mut damage = sanitize(attack_power) * variance;
    if is_crit {
        damage *= DUNGEON_CRIT_MULTIPLIER;
    }
    DungeonRoll { damage, is_crit }
}

/// The boss side of a contact exchange. Same variance band, no crit.
pub fn roll_boss_damage(attack_power: f64, rng: &mut impl Rng) -> f64 {
    sanitize(attack_power) * rng.gen_range(DUNGEON_VARIANCE_MIN..DUNGEON_VARIANCE_MAX)
}

/// `floor(power * 6 * (1 + soul_level * 0.1))`
pub fn special_damage(power: f64, soul_level: f64) -> f64 {
    (sanitize(power) * SPECIAL_POWER_MULTIPLIER * (1.0 + sanitize(soul_level) * SPECIAL_SOUL_BONUS))
        .floor()
}
