//! Skill book and the automatic skill tick shared by both combat modes.

use tracing::{debug, info};

use super::types::{Skill, SkillId, SkillKind};
use crate::character::Player;
use crate::combat::Combatant;
use crate::core::constants::{MEND_HP_THRESHOLD, SKILL_XP_PER_CAST};
use crate::core::events::{CombatEvent, Side, StrikeKind};

// Magnitude scaling: (base multiplier, growth per skill level above 1)
const CLEAVE_POWER: (f64, f64) = (3.0, 0.15);
const MEND_FRACTION: (f64, f64) = (0.25, 0.08);
const CATACLYSM_POWER: (f64, f64) = (10.0, 0.15);
const CATACLYSM_ADVANCE_BONUS: f64 = 0.1;

/// What a session exposes to the skill tick. Implemented by both the stage
/// battle session and the dungeon session.
pub trait CombatTarget {
    /// False while the session is frozen, resolving or in a cinematic.
    fn is_active(&self) -> bool;
    /// The opponent whose hp skills may reduce.
    fn enemy_mut(&mut self) -> Option<&mut Combatant>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillCast {
    pub skill: SkillId,
    /// Damage dealt or hp restored, already floored.
    pub magnitude: u64,
    /// New (level, cooldown) if this cast levelled the skill up.
    pub level_up: Option<(u32, u64)>,
}

/// Everything one auto-battle tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillTickReport {
    pub unlocked: Vec<SkillId>,
    pub casts: Vec<SkillCast>,
}

impl SkillTickReport {
    pub fn dealt_damage(&self) -> bool {
        self.casts
            .iter()
            .any(|c| c.skill.kind() != SkillKind::Heal && c.magnitude > 0)
    }

    pub fn into_events(self) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        for skill in self.unlocked {
            events.push(CombatEvent::SkillUnlocked { skill });
        }
        for cast in self.casts {
            events.push(CombatEvent::SkillCast {
                skill: cast.skill,
                magnitude: cast.magnitude,
            });
            if cast.skill.kind() != SkillKind::Heal {
                events.push(CombatEvent::StrikeResolved {
                    amount: cast.magnitude,
                    target: Side::Enemy,
                    is_crit: false,
                    kind: StrikeKind::Skill,
                });
            }
            if let Some((level, cooldown_ms)) = cast.level_up {
                events.push(CombatEvent::SkillLeveledUp {
                    skill: cast.skill,
                    level,
                    cooldown_ms,
                });
            }
        }
        events
    }
}

/// Owns exactly one [`Skill`] per id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillBook {
    skills: Vec<Skill>,
}

impl Default for SkillBook {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillBook {
    pub fn new() -> Self {
        Self {
            skills: SkillId::PRIORITY.iter().map(|id| Skill::new(*id)).collect(),
        }
    }

    /// Restore previously persisted skill progress. Unknown or duplicate
    /// entries are ignored so the one-per-id invariant holds.
    pub fn from_saved(saved: Vec<Skill>) -> Self {
        let mut book = Self::new();
        for skill in saved {
            if let Some(slot) = book.skills.iter_mut().find(|s| s.id == skill.id) {
                *slot = skill;
            }
        }
        book
    }

    pub fn get(&self, id: SkillId) -> &Skill {
        // PRIORITY covers every id
        &self.skills[Self::index(id)]
    }

    pub fn get_mut(&mut self, id: SkillId) -> &mut Skill {
        &mut self.skills[Self::index(id)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    fn index(id: SkillId) -> usize {
        match id {
            SkillId::Cleave => 0,
            SkillId::Mend => 1,
            SkillId::Cataclysm => 2,
        }
    }

    /// Unlock every skill whose threshold the player has reached.
    pub fn refresh_unlocks(&mut self, player_level: u32) -> Vec<SkillId> {
        let mut newly = Vec::new();
        for skill in &mut self.skills {
            if skill.try_unlock(player_level) {
                info!(skill = skill.id.name(), player_level, "skill unlocked");
                newly.push(skill.id);
            }
        }
        newly
    }

    /// Cast one skill against the target. Locked, cooling down, or no valid
    /// target: no-op returning `None`.
    pub fn try_cast(
        &mut self,
        id: SkillId,
        player: &mut Player,
        target: &mut dyn CombatTarget,
        now_ms: u64,
    ) -> Option<SkillCast> {
        if !self.get(id).can_use(now_ms) || !target.is_active() {
            return None;
        }

        let skill = self.get(id);
        let magnitude = match id.kind() {
            SkillKind::Offense | SkillKind::Ultimate => {
                let enemy = target.enemy_mut().filter(|e| e.is_alive())?;
                let power = match id {
                    SkillId::Cataclysm => {
                        player.attack_power()
                            * CATACLYSM_POWER.0
                            * skill.level_scale(CATACLYSM_POWER.1)
                            * (1.0 + player.advance_level() * CATACLYSM_ADVANCE_BONUS)
                    }
                    _ => player.attack_power() * CLEAVE_POWER.0 * skill.level_scale(CLEAVE_POWER.1),
                };
                enemy.take_damage(power)
            }
            SkillKind::Heal => {
                let fraction = (MEND_FRACTION.0 * skill.level_scale(MEND_FRACTION.1)).min(1.0);
                player.heal(player.max_hp() * fraction)
            }
        };

        let skill = self.get_mut(id);
        skill.mark_used(now_ms);
        let level_up = (skill.gain_xp(SKILL_XP_PER_CAST) > 0).then(|| {
            info!(
                skill = id.name(),
                level = skill.level,
                cooldown_ms = skill.cooldown_ms,
                "skill levelled up"
            );
            (skill.level, skill.cooldown_ms)
        });

        debug!(skill = id.name(), magnitude, "skill cast");
        Some(SkillCast {
            skill: id,
            magnitude: magnitude as u64,
            level_up,
        })
    }

    /// One automatic skill pass. Re-checks unlocks, then tries each skill in
    /// priority order. Mend only fires below 60% hp. Several different skills
    /// may fire in the same tick; each at most once. The caller checks for
    /// lethal results afterwards.
    pub fn auto_battle_tick(
        &mut self,
        player: &mut Player,
        target: &mut dyn CombatTarget,
        now_ms: u64,
    ) -> SkillTickReport {
        let mut report = SkillTickReport {
            unlocked: self.refresh_unlocks(player.level()),
            casts: Vec::new(),
        };

        for id in SkillId::PRIORITY {
            if !target.is_active() {
                break;
            }
            if id.kind() == SkillKind::Heal && player.hp_fraction() >= MEND_HP_THRESHOLD {
                continue;
            }
            if let Some(cast) = self.try_cast(id, player, target, now_ms) {
                report.casts.push(cast);
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::BasicStats;

    struct Dummy {
        active: bool,
        enemy: Combatant,
    }

    impl CombatTarget for Dummy {
        fn is_active(&self) -> bool {
            self.active
        }

        fn enemy_mut(&mut self) -> Option<&mut Combatant> {
            Some(&mut self.enemy)
        }
    }

    fn make_player(level: u32) -> Player {
        Player::new(Box::new(BasicStats::new(100.0, 1000.0, level)))
    }

    fn dummy(hp: f64) -> Dummy {
        Dummy {
            active: true,
            enemy: Combatant::new(hp, 10.0, 1),
        }
    }

    #[test]
    fn test_book_has_one_skill_per_id() {
        let book = SkillBook::new();
        assert_eq!(book.iter().count(), 3);
        for id in SkillId::PRIORITY {
            assert_eq!(book.get(id).id, id);
        }
    }

    #[test]
    fn test_low_level_player_casts_nothing() {
        let mut book = SkillBook::new();
        let mut player = make_player(10);
        let mut target = dummy(10_000.0);
        let report = book.auto_battle_tick(&mut player, &mut target, 0);
        assert!(report.unlocked.is_empty());
        assert!(report.casts.is_empty());
        assert_eq!(target.enemy.hp(), 10_000.0);
    }

    #[test]
    fn test_locked_cast_is_noop() {
        let mut book = SkillBook::new();
        let mut player = make_player(1);
        let mut target = dummy(500.0);
        assert!(book.try_cast(SkillId::Cleave, &mut player, &mut target, 0).is_none());
        assert_eq!(target.enemy.hp(), 500.0);
    }

    #[test]
    fn test_unlock_happens_during_tick_and_casts_same_tick() {
        let mut book = SkillBook::new();
        let mut player = make_player(30);
        let mut target = dummy(10_000.0);
        let report = book.auto_battle_tick(&mut player, &mut target, 0);
        assert_eq!(report.unlocked, vec![SkillId::Cleave]);
        assert_eq!(report.casts.len(), 1);
        assert_eq!(report.casts[0].magnitude, 300);
        assert_eq!(target.enemy.hp(), 9_700.0);

        // Second tick: on cooldown, no re-unlock
        let report = book.auto_battle_tick(&mut player, &mut target, 1_000);
        assert!(report.unlocked.is_empty());
        assert!(report.casts.is_empty());
    }

    #[test]
    fn test_multiple_skills_fire_in_one_tick() {
        let mut book = SkillBook::new();
        let mut player = make_player(80);
        player.set_hp(100.0);
        let mut target = dummy(100_000.0);
        let report = book.auto_battle_tick(&mut player, &mut target, 0);
        let fired: Vec<SkillId> = report.casts.iter().map(|c| c.skill).collect();
        assert_eq!(fired, vec![SkillId::Cleave, SkillId::Mend, SkillId::Cataclysm]);
        assert_eq!(player.hp(), 350.0);
        assert_eq!(target.enemy.hp(), 100_000.0 - 300.0 - 1_000.0);
        // unlocks, casts, and a strike for each damaging cast
        assert_eq!(report.clone().into_events().len(), 3 + 3 + 2);
    }

    #[test]
    fn test_mend_skipped_above_threshold() {
        let mut book = SkillBook::new();
        let mut player = make_player(50);
        player.set_hp(600.0);
        let mut target = dummy(100_000.0);
        let report = book.auto_battle_tick(&mut player, &mut target, 0);
        assert!(report.casts.iter().all(|c| c.skill != SkillId::Mend));
    }

    #[test]
    fn test_inactive_target_blocks_casts_but_not_unlocks() {
        let mut book = SkillBook::new();
        let mut player = make_player(70);
        let mut target = dummy(1_000.0);
        target.active = false;
        let report = book.auto_battle_tick(&mut player, &mut target, 0);
        assert_eq!(report.unlocked.len(), 3);
        assert!(report.casts.is_empty());
        assert!(book.get(SkillId::Cleave).can_use(0));
    }

    #[test]
    fn test_dead_enemy_not_targeted_by_followup_skill() {
        let mut book = SkillBook::new();
        let mut player = make_player(70);
        let mut target = dummy(200.0);
        let report = book.auto_battle_tick(&mut player, &mut target, 0);
        assert_eq!(report.casts.len(), 1);
        assert_eq!(report.casts[0].magnitude, 200);
        assert!(!target.enemy.is_alive());
        assert!(book.get(SkillId::Cataclysm).can_use(0), "ultimate stays ready");
        assert!(report.dealt_damage());
    }

    #[test]
    fn test_cast_grants_xp_and_levels_after_ten_casts() {
        let mut book = SkillBook::new();
        let mut player = make_player(30);
        let mut target = dummy(1_000_000.0);
        book.refresh_unlocks(30);
        let mut now = 0;
        let mut level_ups = 0;
        for _ in 0..10 {
            let cast = book
                .try_cast(SkillId::Cleave, &mut player, &mut target, now)
                .expect("ready");
            if cast.level_up.is_some() {
                level_ups += 1;
            }
            now += book.get(SkillId::Cleave).cooldown_ms;
        }
        assert_eq!(level_ups, 1);
        assert_eq!(book.get(SkillId::Cleave).level, 2);
        assert_eq!(book.get(SkillId::Cleave).cooldown_ms, 11_500);
    }

    #[test]
    fn test_from_saved_keeps_one_per_id() {
        let mut saved = Skill::new(SkillId::Mend);
        saved.level = 4;
        let book = SkillBook::from_saved(vec![saved.clone(), Skill::new(SkillId::Mend)]);
        assert_eq!(book.iter().count(), 3);
        assert_eq!(book.get(SkillId::Mend).level, 1, "last entry wins");
        let book = SkillBook::from_saved(vec![saved]);
        assert_eq!(book.get(SkillId::Mend).level, 4);
    }
}
