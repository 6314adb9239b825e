//! The player combatant as seen by the combat core.
//!
//! Stats come from the external [`StatProvider`]; the core owns only the
//! special-move charge. Every read is sanitized and hp is clamped to
//! `[0, max_hp]` before anyone sees it.

use super::stats::{sanitize, StatProvider};
use crate::core::constants::{CHARGE_MAX, CHARGE_PER_SOUL_LEVEL, CHARGE_PER_STRIKE};

pub struct Player {
    stats: Box<dyn StatProvider>,
    charge: u32,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("hp", &self.hp())
            .field("max_hp", &self.max_hp())
            .field("attack_power", &self.attack_power())
            .field("level", &self.level())
            .field("charge", &self.charge)
            .finish()
    }
}

impl Player {
    pub fn new(stats: Box<dyn StatProvider>) -> Self {
        Self { stats, charge: 0 }
    }

    pub fn stats(&self) -> &dyn StatProvider {
        self.stats.as_ref()
    }

    pub fn stats_mut(&mut self) -> &mut dyn StatProvider {
        self.stats.as_mut()
    }

    pub fn attack_power(&self) -> f64 {
        sanitize(self.stats.attack_power())
    }

    pub fn max_hp(&self) -> f64 {
        sanitize(self.stats.max_hp())
    }

    pub fn hp(&self) -> f64 {
        sanitize(self.stats.current_hp()).min(self.max_hp())
    }

    /// Write hp back to the provider, clamped to `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: f64) {
        let clamped = sanitize(hp).min(self.max_hp());
        self.stats.set_current_hp(clamped);
    }

    /// Subtract floored damage. Returns the amount actually removed.
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        let before = self.hp();
        self.set_hp(before - sanitize(amount).floor());
        before - self.hp()
    }

    /// Add floored healing. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        let before = self.hp();
        self.set_hp(before + sanitize(amount).floor());
        self.hp() - before
    }

    pub fn restore_full_hp(&mut self) {
        let max = self.max_hp();
        self.set_hp(max);
    }

    pub fn is_alive(&self) -> bool {
        self.hp() > 0.0
    }

    /// Current hp as a fraction of max (0.0 when max is 0).
    pub fn hp_fraction(&self) -> f64 {
        let max = self.max_hp();
        if max > 0.0 {
            self.hp() / max
        } else {
            0.0
        }
    }

    pub fn level(&self) -> u32 {
        self.stats.level()
    }

    pub fn rank(&self) -> u32 {
        self.stats.rank()
    }

    pub fn soul_level(&self) -> f64 {
        sanitize(self.stats.soul_level())
    }

    pub fn advance_level(&self) -> f64 {
        sanitize(self.stats.advance_level())
    }

    pub fn charge(&self) -> u32 {
        self.charge
    }

    /// Charge gained per strike: `12 + floor(soul_level * 0.5)`.
    pub fn charge_per_strike(&self) -> u32 {
        CHARGE_PER_STRIKE + (self.soul_level() * CHARGE_PER_SOUL_LEVEL).floor() as u32
    }

    /// Add charge, saturating at 100. Returns the new charge.
    pub fn add_charge(&mut self, amount: u32) -> u32 {
        self.charge = self.charge.saturating_add(amount).min(CHARGE_MAX);
        self.charge
    }

    pub fn is_charge_full(&self) -> bool {
        self.charge >= CHARGE_MAX
    }

    pub fn reset_charge(&mut self) {
        self.charge = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::stats::BasicStats;

    fn make_player(attack: f64, max_hp: f64) -> Player {
        Player::new(Box::new(BasicStats::new(attack, max_hp, 1)))
    }

    #[test]
    fn test_hp_clamped_to_max() {
        let mut player = make_player(10.0, 100.0);
        player.set_hp(250.0);
        assert_eq!(player.hp(), 100.0);
        player.set_hp(-5.0);
        assert_eq!(player.hp(), 0.0);
        assert!(!player.is_alive());
    }

    #[test]
    fn test_take_damage_floors_amount() {
        let mut player = make_player(10.0, 100.0);
        let dealt = player.take_damage(10.9);
        assert_eq!(dealt, 10.0);
        assert_eq!(player.hp(), 90.0);
    }

    #[test]
    fn test_heal_does_not_exceed_max() {
        let mut player = make_player(10.0, 100.0);
        player.set_hp(95.0);
        assert_eq!(player.heal(40.0), 5.0);
        assert_eq!(player.hp(), 100.0);
    }

    #[test]
    fn test_malformed_stats_read_as_zero() {
        let stats = BasicStats {
            attack_power: f64::NAN,
            max_hp: -10.0,
            current_hp: f64::INFINITY,
            soul_level: -4.0,
            ..Default::default()
        };
        let player = Player::new(Box::new(stats));
        assert_eq!(player.attack_power(), 0.0);
        assert_eq!(player.max_hp(), 0.0);
        assert_eq!(player.hp(), 0.0);
        assert_eq!(player.soul_level(), 0.0);
        assert_eq!(player.hp_fraction(), 0.0);
    }

    #[test]
    fn test_charge_saturates_at_max() {
        let mut player = make_player(10.0, 100.0);
        for _ in 0..20 {
            let charge = player.add_charge(player.charge_per_strike());
            assert!(charge <= CHARGE_MAX);
        }
        assert!(player.is_charge_full());
        player.reset_charge();
        assert_eq!(player.charge(), 0);
    }

    #[test]
    fn test_charge_per_strike_uses_soul_level() {
        let stats = BasicStats {
            soul_level: 7.0,
            ..Default::default()
        };
        let player = Player::new(Box::new(stats));
        assert_eq!(player.charge_per_strike(), 12 + 3);
    }
}
