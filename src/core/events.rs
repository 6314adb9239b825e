//! Events emitted by the combat core.
//!
//! Engines push these into the context outbox. The presentation layer,
//! reward granting and persistence react to them; the core never reaches
//! into those systems directly.

use serde::{Deserialize, Serialize};

use crate::items::Drop;
use crate::skills::SkillId;

/// Which combatant an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrikeKind {
    Standard,
    Ambush,
    Special,
    Skill,
    /// Simultaneous exchange on body contact in dungeon mode
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    Win,
    Lose,
    Timeout,
}

/// Rewards granted at the end of a session. Empty on loss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub xp: u64,
    pub coins: u64,
    pub drops: Vec<Drop>,
}

/// Intro banner shown before a stage fight goes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Banner {
    Ready,
    Fight,
}

impl Banner {
    pub fn text(&self) -> &'static str {
        match self {
            Banner::Ready => "READY?",
            Banner::Fight => "FIGHT!",
        }
    }
}

/// Encounter the stage controller is counting down toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRef {
    pub stage: u32,
    pub world: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    // ── Required collaborator events ───────────────────────────────
    StrikeResolved {
        amount: u64,
        target: Side,
        is_crit: bool,
        kind: StrikeKind,
    },
    HpChanged {
        side: Side,
        hp: u64,
        max_hp: u64,
    },
    SessionEnded {
        outcome: SessionOutcome,
        summary: RewardSummary,
    },

    // ── Stage battle ───────────────────────────────────────────────
    EncounterStarted {
        stage: u32,
        world: u32,
        enemy_name: String,
        is_boss: bool,
    },
    Announcement {
        banner: Banner,
    },
    ChargeChanged {
        charge: u32,
    },
    CinematicStarted,
    CinematicEnded,
    AutoAdvanceCountdown {
        remaining_secs: u32,
        next: StageRef,
    },
    AutoRestartCountdown {
        remaining_secs: u32,
        next: StageRef,
    },

    // ── Skills ─────────────────────────────────────────────────────
    SkillUnlocked {
        skill: SkillId,
    },
    SkillCast {
        skill: SkillId,
        magnitude: u64,
    },
    SkillLeveledUp {
        skill: SkillId,
        level: u32,
        cooldown_ms: u64,
    },

    // ── Dungeon ────────────────────────────────────────────────────
    DungeonStarted {
        boss_name: String,
        time_limit_secs: u32,
    },
    DungeonClock {
        seconds_left: u32,
    },
    ScreenShake,

    /// Session torn down after an internal invariant violation.
    SessionAborted {
        reason: String,
    },
}
