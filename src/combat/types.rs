use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::character::sanitize;
use crate::core::constants::*;

/// Shared combatant shape. Hp is always read clamped to `[0, max_hp]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    hp: f64,
    pub max_hp: f64,
    pub attack_power: f64,
    pub level: u32,
}

impl Combatant {
    pub fn new(max_hp: f64, attack_power: f64, level: u32) -> Self {
        let max_hp = sanitize(max_hp).floor();
        Self {
            hp: max_hp,
            max_hp,
            attack_power: sanitize(attack_power),
            level,
        }
    }

    pub fn hp(&self) -> f64 {
        sanitize(self.hp).min(sanitize(self.max_hp))
    }

    pub fn set_hp(&mut self, hp: f64) {
        self.hp = sanitize(hp).min(sanitize(self.max_hp));
    }

    pub fn is_alive(&self) -> bool {
        self.hp() > 0.0
    }

    /// Subtract floored damage. Returns the amount actually removed.
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        let before = self.hp();
        self.set_hp(before - sanitize(amount).floor());
        before - self.hp()
    }

}

/// A stage-battle opponent. Built fresh per encounter and dropped with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub stats: Combatant,
    pub is_boss: bool,
}

impl Enemy {
    pub fn new(name: String, max_hp: f64, attack_power: f64) -> Self {
        Self {
            name,
            stats: Combatant::new(max_hp, attack_power, 1),
            is_boss: false,
        }
    }
}

/// A dungeon boss. Owned by exactly one dungeon session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub name: String,
    pub stats: Combatant,
}

impl Boss {
    pub fn new(name: String, max_hp: f64, attack_power: f64, level: u32) -> Self {
        Self {
            name,
            stats: Combatant::new(max_hp, attack_power, level),
        }
    }

    pub fn level(&self) -> u32 {
        self.stats.level
    }
}

/// Gets world-specific enemy name prefixes
fn world_prefixes(world: u32) -> &'static [&'static str] {
    match world {
        1 => &["Meadow", "Field", "Thistle", "Sunny"],
        2 => &["Forest", "Shadow", "Thorn", "Wild"],
        3 => &["Mountain", "Stone", "Cliff", "Peak"],
        4 => &["Ancient", "Ruin", "Cursed", "Forgotten"],
        5 => &["Volcanic", "Ash", "Molten", "Ember"],
        6 => &["Frozen", "Frost", "Glacial", "Snow"],
        _ => &["Abyssal", "Storm", "Eternal", "Void"],
    }
}

const ENEMY_SUFFIXES: &[&str] = &["Slime", "Goblin", "Wolf", "Golem", "Wraith", "Drake"];
const BOSS_TITLES: &[&str] = &["Warlord", "Tyrant", "Overlord", "Colossus"];

pub fn generate_enemy_name(world: u32, is_boss: bool, rng: &mut impl Rng) -> String {
    let prefixes = world_prefixes(world);
    let prefix = prefixes[rng.gen_range(0..prefixes.len())];
    if is_boss {
        let title = BOSS_TITLES[rng.gen_range(0..BOSS_TITLES.len())];
        format!("{} {}", prefix, title)
    } else {
        let suffix = ENEMY_SUFFIXES[rng.gen_range(0..ENEMY_SUFFIXES.len())];
        format!("{} {}", prefix, suffix)
    }
}

/// Base (hp, attack) for a stage before boss multipliers.
pub fn stage_enemy_stats(stage: u32, world: u32) -> (f64, f64) {
    let world_mult = ENEMY_WORLD_GROWTH.powi(world.saturating_sub(1) as i32);
    let stage_mult = 1.0 + ENEMY_STAGE_GROWTH * stage.saturating_sub(1) as f64;
    (
        ENEMY_BASE_HP * world_mult * stage_mult,
        ENEMY_BASE_ATTACK * world_mult * stage_mult,
    )
}

/// Generates the enemy for a stage. The last stage of a world is a boss.
pub fn generate_stage_enemy(
    stage: u32,
    world: u32,
    stages_per_world: u32,
    rng: &mut impl Rng,
) -> Enemy {
    let is_boss = stage >= stages_per_world;
    let (mut hp, mut attack) = stage_enemy_stats(stage, world);
    if is_boss {
        let (hp_mult, atk_mult) = STAGE_BOSS_MULTIPLIERS;
        hp *= hp_mult;
        attack *= atk_mult;
    }
    let name = generate_enemy_name(world, is_boss, rng);
    let level = stage + world.saturating_sub(1).saturating_mul(stages_per_world);
    Enemy {
        name,
        stats: Combatant::new(hp, attack, level),
        is_boss,
    }
}

/// Builds a dungeon boss for the given level.
pub fn generate_dungeon_boss(level: u32, rng: &mut impl Rng) -> Boss {
    let level = level.max(1);
    let steps = (level - 1) as f64;
    let hp = DUNGEON_BOSS_BASE_HP * (1.0 + DUNGEON_BOSS_HP_GROWTH * steps);
    let attack = DUNGEON_BOSS_BASE_ATTACK * (1.0 + DUNGEON_BOSS_ATTACK_GROWTH * steps);
    let prefixes = world_prefixes(1 + (level - 1) / 10);
    let prefix = prefixes[rng.gen_range(0..prefixes.len())];
    let title = BOSS_TITLES[rng.gen_range(0..BOSS_TITLES.len())];
    Boss::new(format!("{} {}", prefix, title), hp, attack, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_combatant_creation() {
        let c = Combatant::new(250.0, 20.0, 3);
        assert_eq!(c.hp(), 250.0);
        assert_eq!(c.max_hp, 250.0);
        assert!(c.is_alive());
    }

    #[test]
    fn test_take_damage_no_underflow() {
        let mut c = Combatant::new(50.0, 10.0, 1);
        assert_eq!(c.take_damage(100.0), 50.0);
        assert_eq!(c.hp(), 0.0);
        assert!(!c.is_alive());
    }

    #[test]
    fn test_take_damage_floors_fractional() {
        let mut c = Combatant::new(50.0, 10.0, 1);
        c.take_damage(10.99);
        assert_eq!(c.hp(), 40.0);
    }

    #[test]
    fn test_set_hp_clamps() {
        let mut c = Combatant::new(50.0, 10.0, 1);
        c.set_hp(80.0);
        assert_eq!(c.hp(), 50.0);
        c.set_hp(f64::NAN);
        assert_eq!(c.hp(), 0.0);
        c.set_hp(-5.0);
        assert_eq!(c.hp(), 0.0);
    }

    #[test]
    fn test_stage_one_world_one_baseline() {
        let (hp, attack) = stage_enemy_stats(1, 1);
        assert_eq!(hp, ENEMY_BASE_HP);
        assert_eq!(attack, ENEMY_BASE_ATTACK);
    }

    #[test]
    fn test_stage_scaling_is_monotonic() {
        for world in 1..=3 {
            let mut last = 0.0;
            for stage in 1..=20 {
                let (hp, _) = stage_enemy_stats(stage, world);
                assert!(hp > last, "hp should grow at stage {} world {}", stage, world);
                last = hp;
            }
        }
        assert!(stage_enemy_stats(1, 2).0 > stage_enemy_stats(1, 1).0);
    }

    #[test]
    fn test_last_stage_is_boss() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let normal = generate_stage_enemy(19, 1, 20, &mut rng);
        let boss = generate_stage_enemy(20, 1, 20, &mut rng);
        assert!(!normal.is_boss);
        assert!(boss.is_boss);
        assert!(boss.stats.max_hp > normal.stats.max_hp * 2.0);
        assert!(boss.name.contains(' '));
    }

    #[test]
    fn test_dungeon_boss_scales_with_level() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let low = generate_dungeon_boss(1, &mut rng);
        let high = generate_dungeon_boss(25, &mut rng);
        assert_eq!(low.stats.max_hp, DUNGEON_BOSS_BASE_HP);
        assert_eq!(low.level(), 1);
        assert_eq!(high.level(), 25);
        assert!(high.stats.max_hp > low.stats.max_hp);
        assert!(high.stats.attack_power > low.stats.attack_power);
        assert_eq!(generate_dungeon_boss(0, &mut rng).level(), 1);
    }
}
