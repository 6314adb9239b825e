use serde::{Deserialize, Serialize};

use crate::core::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillId {
    Cleave,
    Mend,
    Cataclysm,
}

impl SkillId {
    /// Auto-battle priority order: offense, conditional heal, ultimate.
    pub const PRIORITY: [SkillId; 3] = [SkillId::Cleave, SkillId::Mend, SkillId::Cataclysm];

    pub fn name(&self) -> &'static str {
        match self {
            SkillId::Cleave => "Cleave",
            SkillId::Mend => "Mend",
            SkillId::Cataclysm => "Cataclysm",
        }
    }

    pub fn kind(&self) -> SkillKind {
        match self {
            SkillId::Cleave => SkillKind::Offense,
            SkillId::Mend => SkillKind::Heal,
            SkillId::Cataclysm => SkillKind::Ultimate,
        }
    }

    /// Player level at which the skill unlocks.
    pub fn unlock_level(&self) -> u32 {
        match self {
            SkillId::Cleave => CLEAVE_UNLOCK_LEVEL,
            SkillId::Mend => MEND_UNLOCK_LEVEL,
            SkillId::Cataclysm => CATACLYSM_UNLOCK_LEVEL,
        }
    }

    /// (base cooldown, reduction per level, floor), all in ms.
    pub fn cooldown_profile(&self) -> (u64, u64, u64) {
        match self {
            SkillId::Cleave => CLEAVE_COOLDOWN,
            SkillId::Mend => MEND_COOLDOWN,
            SkillId::Cataclysm => CATACLYSM_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillKind {
    Offense,
    Heal,
    Ultimate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillState {
    Locked,
    Ready,
    OnCooldown { remaining_ms: u64 },
}

/// Mutable per-skill progress. One instance per [`SkillId`], owned by the
/// skill book for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next: u64,
    pub cooldown_ms: u64,
    pub last_used_at: Option<u64>,
    pub unlocked: bool,
}

impl Skill {
    pub fn new(id: SkillId) -> Self {
        let (base_cooldown, _, _) = id.cooldown_profile();
        Self {
            id,
            level: 1,
            xp: 0,
            xp_to_next: SKILL_BASE_XP_TO_NEXT,
            cooldown_ms: base_cooldown,
            last_used_at: None,
            unlocked: false,
        }
    }

    /// One-way unlock. Returns true only on the transition.
    pub fn try_unlock(&mut self, player_level: u32) -> bool {
        if self.unlocked || player_level < self.id.unlock_level() {
            return false;
        }
        self.unlocked = true;
        true
    }

    pub fn state(&self, now_ms: u64) -> SkillState {
        if !self.unlocked {
            return SkillState::Locked;
        }
        match self.last_used_at {
            Some(used) if now_ms.saturating_sub(used) < self.cooldown_ms => {
                SkillState::OnCooldown {
                    remaining_ms: self.cooldown_ms - now_ms.saturating_sub(used),
                }
            }
            _ => SkillState::Ready,
        }
    }

    /// `now - last_used_at >= cooldown_ms` on an unlocked skill.
    pub fn can_use(&self, now_ms: u64) -> bool {
        self.state(now_ms) == SkillState::Ready
    }

    pub fn mark_used(&mut self, now_ms: u64) {
        self.last_used_at = Some(now_ms);
    }

    /// Grant experience. Each threshold crossed raises the level, carries the
    /// excess over, grows the threshold by 25% and shortens the cooldown by
    /// one step down to the skill's floor. Returns the number of levels gained.
    pub fn gain_xp(&mut self, amount: u64) -> u32 {
        let (_, step, floor) = self.id.cooldown_profile();
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            let grown = (self.xp_to_next as f64 * SKILL_XP_GROWTH).ceil() as u64;
            self.xp_to_next = grown.max(self.xp_to_next + 1);
            self.cooldown_ms = self.cooldown_ms.saturating_sub(step).max(floor);
            gained += 1;
        }
        gained
    }

    /// Multiplier applied to the skill's base magnitude at the current level.
    pub fn level_scale(&self, per_level: f64) -> f64 {
        1.0 + per_level * self.level.saturating_sub(1) as f64
    }
}
