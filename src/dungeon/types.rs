//! Dungeon session data structures.

use serde::{Deserialize, Serialize};

use crate::combat::{Boss, Combatant};
use crate::core::constants::{BOSS_START, PLAYER_START};
use crate::core::context::Task;
use crate::core::events::SessionOutcome;
use crate::core::latch::ResolutionLatch;
use crate::core::scheduler::{Scheduler, TaskHandle};
use crate::skills::CombatTarget;

/// Scheduled work for a dungeon attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DungeonTask {
    /// Physics step, once per frame
    Frame,
    SkillTick,
    /// One second off the time limit
    ClockTick,
    PresentResult,
}

/// A point body in arena-percentage coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Body {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DungeonTimers {
    pub frame: Option<TaskHandle>,
    pub clock: Option<TaskHandle>,
    pub skill: Option<TaskHandle>,
    pub present: Option<TaskHandle>,
}

impl DungeonTimers {
    /// Stop the three live loops. The presentation task is left alone.
    pub fn stop_loops(&mut self, scheduler: &mut Scheduler<Task>) {
        for handle in [self.frame.take(), self.clock.take(), self.skill.take()]
            .into_iter()
            .flatten()
        {
            scheduler.cancel(handle);
        }
    }

    pub fn cancel_all(&mut self, scheduler: &mut Scheduler<Task>) {
        self.stop_loops(scheduler);
        if let Some(handle) = self.present.take() {
            scheduler.cancel(handle);
        }
    }
}

#[derive(Debug, Clone)]
pub struct DungeonSession {
    pub id: u64,
    /// Taken when the result is presented.
    pub boss: Option<Boss>,
    pub boss_level: u32,
    pub player_body: Body,
    pub boss_body: Body,
    /// Frames of stun left on the boss.
    pub boss_stun: u32,
    /// Frames until another contact exchange may resolve.
    pub hit_cooldown: u32,
    pub time_left_secs: u32,
    pub timers: DungeonTimers,
    pub result: ResolutionLatch<SessionOutcome>,
}

impl DungeonSession {
    pub fn new(id: u64, boss: Boss, time_limit_secs: u32) -> Self {
        let boss_level = boss.level();
        Self {
            id,
            boss: Some(boss),
            boss_level,
            player_body: Body::at(PLAYER_START.0, PLAYER_START.1),
            boss_body: Body::at(BOSS_START.0, BOSS_START.1),
            boss_stun: 0,
            hit_cooldown: 0,
            time_left_secs: time_limit_secs,
            timers: DungeonTimers::default(),
            result: ResolutionLatch::new(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.result.is_claimed()
    }

    pub fn boss_stats(&self) -> Option<&Combatant> {
        self.boss.as_ref().map(|b| &b.stats)
    }
}

impl CombatTarget for DungeonSession {
    fn is_active(&self) -> bool {
        !self.result.is_claimed() && self.boss.is_some()
    }

    fn enemy_mut(&mut self) -> Option<&mut Combatant> {
        self.boss.as_mut().map(|b| &mut b.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss() -> Boss {
        Boss::new("Stone Warlord".into(), 500.0, 20.0, 3)
    }

    #[test]
    fn test_new_session_places_bodies() {
        let session = DungeonSession::new(1, boss(), 90);
        assert_eq!(session.player_body, Body::at(20.0, 50.0));
        assert_eq!(session.boss_body, Body::at(80.0, 50.0));
        assert_eq!(session.boss_level, 3);
        assert_eq!(session.player_body.distance_to(&session.boss_body), 60.0);
    }

    #[test]
    fn test_target_inactive_once_resolved() {
        let mut session = DungeonSession::new(1, boss(), 90);
        assert!(session.is_active());
        session.result.claim(SessionOutcome::Timeout);
        assert!(!session.is_active());
        assert!(session.enemy_mut().is_some());
    }

    #[test]
    fn test_stop_loops_keeps_presentation() {
        let mut scheduler: Scheduler<Task> = Scheduler::new();
        let mut timers = DungeonTimers {
            frame: Some(scheduler.every_frame(Task::Dungeon(DungeonTask::Frame))),
            clock: Some(scheduler.every(1000, Task::Dungeon(DungeonTask::ClockTick))),
            skill: Some(scheduler.every(1000, Task::Dungeon(DungeonTask::SkillTick))),
            present: Some(scheduler.after(1000, Task::Dungeon(DungeonTask::PresentResult))),
        };
        timers.stop_loops(&mut scheduler);
        assert_eq!(scheduler.pending(), 1);
        timers.cancel_all(&mut scheduler);
        assert_eq!(scheduler.pending(), 0);
    }
}
