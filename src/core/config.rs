//! Tunable combat configuration.
//!
//! Every balance knob lives here so it can be overridden from JSON without
//! touching the engine. Missing fields fall back to the defaults in
//! [`crate::core::constants`].

use serde::{Deserialize, Serialize};

use crate::core::constants::*;
use crate::core::error::CombatError;

/// Configuration for a combat runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Chance (0.0-1.0) that a standard strike becomes an ambush
    pub ambush_chance: f64,
    pub ambush_multiplier: f64,

    /// Dungeon crit chance = base + per_rank * rank
    pub dungeon_base_crit_chance: f64,
    pub dungeon_crit_per_rank: f64,

    pub player_strike_interval_ms: u64,
    pub enemy_strike_interval_ms: u64,
    pub ready_announce_ms: u64,
    pub fight_announce_ms: u64,
    pub special_windup_ms: u64,
    pub special_recover_ms: u64,
    pub defeat_animation_ms: u64,

    /// Seconds before a won stage rolls over to the next encounter
    pub auto_advance_seconds: u32,
    /// Seconds before a lost stage restarts the world
    pub auto_restart_seconds: u32,

    pub stages_per_world: u32,
    pub max_world: u32,
    pub win_coins: u64,

    pub dungeon_time_limit_seconds: u32,
    pub dungeon_skill_tick_ms: u64,
    pub dungeon_result_delay_ms: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            ambush_chance: AMBUSH_CHANCE,
            ambush_multiplier: AMBUSH_MULTIPLIER,
            dungeon_base_crit_chance: DUNGEON_BASE_CRIT_CHANCE,
            dungeon_crit_per_rank: DUNGEON_CRIT_PER_RANK,
            player_strike_interval_ms: PLAYER_STRIKE_INTERVAL_MS,
            enemy_strike_interval_ms: ENEMY_STRIKE_INTERVAL_MS,
            ready_announce_ms: READY_ANNOUNCE_MS,
            fight_announce_ms: FIGHT_ANNOUNCE_MS,
            special_windup_ms: SPECIAL_WINDUP_MS,
            special_recover_ms: SPECIAL_RECOVER_MS,
            defeat_animation_ms: DEFEAT_ANIMATION_MS,
            auto_advance_seconds: AUTO_ADVANCE_SECONDS,
            auto_restart_seconds: AUTO_RESTART_SECONDS,
            stages_per_world: STAGES_PER_WORLD,
            max_world: MAX_WORLD,
            win_coins: WIN_COINS,
            dungeon_time_limit_seconds: DUNGEON_TIME_LIMIT_SECONDS,
            dungeon_skill_tick_ms: DUNGEON_SKILL_TICK_MS,
            dungeon_result_delay_ms: DUNGEON_RESULT_DELAY_MS,
        }
    }
}

impl CombatConfig {
    /// Parse a config from JSON. Unknown fields are ignored, missing ones default.
    pub fn from_json(json: &str) -> Result<Self, CombatError> {
        let config: CombatConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Clamp values that would otherwise stall or break the scheduler.
    ///
    /// Every millisecond timing is capped at [`MAX_CONFIG_DELAY_MS`] and every
    /// countdown at [`MAX_CONFIG_SECONDS`].
    pub fn normalized(mut self) -> Self {
        self.ambush_chance = clamp_probability(self.ambush_chance);
        self.dungeon_base_crit_chance = clamp_probability(self.dungeon_base_crit_chance);
        self.dungeon_crit_per_rank = clamp_probability(self.dungeon_crit_per_rank);
        if !self.ambush_multiplier.is_finite() || self.ambush_multiplier < 0.0 {
            self.ambush_multiplier = AMBUSH_MULTIPLIER;
        }

        // Repeating intervals must also be non-zero
        for interval in [
            &mut self.player_strike_interval_ms,
            &mut self.enemy_strike_interval_ms,
            &mut self.dungeon_skill_tick_ms,
        ] {
            *interval = (*interval).clamp(1, MAX_CONFIG_DELAY_MS);
        }
        for delay in [
            &mut self.ready_announce_ms,
            &mut self.fight_announce_ms,
            &mut self.special_windup_ms,
            &mut self.special_recover_ms,
            &mut self.defeat_animation_ms,
            &mut self.dungeon_result_delay_ms,
        ] {
            *delay = (*delay).min(MAX_CONFIG_DELAY_MS);
        }
        for seconds in [
            &mut self.auto_advance_seconds,
            &mut self.auto_restart_seconds,
            &mut self.dungeon_time_limit_seconds,
        ] {
            *seconds = (*seconds).min(MAX_CONFIG_SECONDS);
        }

        self.stages_per_world = self.stages_per_world.max(1);
        self.max_world = self.max_world.max(1);
        self
    }
}

/// Map a configured chance into `0.0..=1.0`. NaN counts as never.
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
