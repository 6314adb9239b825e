use serde::{Deserialize, Serialize};

/// Read access to the external progression system.
///
/// The core reads stats through this trait on every use and only ever writes
/// current hp back. Soul and advance levels are owned and persisted elsewhere.
pub trait StatProvider {
    fn attack_power(&self) -> f64;
    fn max_hp(&self) -> f64;
    fn current_hp(&self) -> f64;
    fn set_current_hp(&mut self, hp: f64);
    fn level(&self) -> u32;
    fn rank(&self) -> u32;
    fn soul_level(&self) -> f64;
    fn advance_level(&self) -> f64;
}

/// Clamp a stat read from outside the core to a finite, non-negative value.
///
/// NaN, infinities and negatives become 0 so they cannot propagate through
/// damage formulas.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// In-memory stat provider. Used by the simulator and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicStats {
    pub attack_power: f64,
    pub max_hp: f64,
    pub current_hp: f64,
    pub level: u32,
    pub rank: u32,
    pub soul_level: f64,
    pub advance_level: f64,
}

impl Default for BasicStats {
    fn default() -> Self {
        Self {
            attack_power: 100.0,
            max_hp: 1000.0,
            current_hp: 1000.0,
            level: 1,
            rank: 0,
            soul_level: 0.0,
            advance_level: 0.0,
        }
    }
}

impl BasicStats {
    pub fn new(attack_power: f64, max_hp: f64, level: u32) -> Self {
        Self {
            attack_power,
            max_hp,
            current_hp: max_hp,
            level,
            ..Default::default()
        }
    }
}

impl StatProvider for BasicStats {
    fn attack_power(&self) -> f64 {
        self.attack_power
    }

    fn max_hp(&self) -> f64 {
        self.max_hp
    }

    fn current_hp(&self) -> f64 {
        self.current_hp
    }

    fn set_current_hp(&mut self, hp: f64) {
        self.current_hp = hp;
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn rank(&self) -> u32 {
        self.rank
    }

    fn soul_level(&self) -> f64 {
        self.soul_level
    }

    fn advance_level(&self) -> f64 {
        self.advance_level
    }
}
