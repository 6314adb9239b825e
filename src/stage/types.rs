//! Stage battle data structures.
//!
//! A [`BattleSession`] is one fight against one enemy: created when the
//! encounter starts, dropped on exit or when the controller moves on to the
//! next stage.

use crate::combat::{Combatant, Enemy};
use crate::core::context::Task;
use crate::core::events::{Banner, SessionOutcome, StageRef};
use crate::core::latch::ResolutionLatch;
use crate::core::scheduler::{Scheduler, TaskHandle};
use crate::skills::CombatTarget;

/// Scheduled work for a stage battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTask {
    /// "READY?" banner finished
    ReadyElapsed,
    /// "FIGHT!" banner finished; the fight goes live
    FightElapsed,
    PlayerStrike,
    EnemyStrike,
    /// Special move lands
    SpecialImpact,
    /// Special move animation finished
    SpecialRecovered,
    DefeatAnimationDone,
    AutoAdvanceTick,
    AutoRestartTick,
}

/// Named steps of the special-move cinematic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialStep {
    Windup,
    Recover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    Countdown(Banner),
    Active,
    /// Strike ticks are suppressed while the special move plays out.
    Cinematic(SpecialStep),
    /// Enemy is down; waiting out the defeat animation before resolving.
    Defeating,
    Resolved(SessionOutcome),
}

/// Handles owned by one session. Every one of them is cancelled on teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTimers {
    pub intro: Option<TaskHandle>,
    pub player_strike: Option<TaskHandle>,
    pub enemy_strike: Option<TaskHandle>,
    pub cinematic: Option<TaskHandle>,
    pub defeat: Option<TaskHandle>,
    pub transition: Option<TaskHandle>,
}

impl SessionTimers {
    /// Stop both strike intervals and any pending cinematic step.
    pub fn freeze(&mut self, scheduler: &mut Scheduler<Task>) {
        for handle in [
            self.player_strike.take(),
            self.enemy_strike.take(),
            self.cinematic.take(),
        ]
        .into_iter()
        .flatten()
        {
            scheduler.cancel(handle);
        }
    }

    pub fn cancel_all(&mut self, scheduler: &mut Scheduler<Task>) {
        self.freeze(scheduler);
        for handle in [self.intro.take(), self.defeat.take(), self.transition.take()]
            .into_iter()
            .flatten()
        {
            scheduler.cancel(handle);
        }
    }
}

#[derive(Debug, Clone)]
pub struct BattleSession {
    pub id: u64,
    pub stage: u32,
    pub world: u32,
    pub phase: BattlePhase,
    pub enemy: Enemy,
    pub timers: SessionTimers,
    /// Guards terminal resolution: the first lethal detector wins.
    pub result: ResolutionLatch<SessionOutcome>,
    /// Encounter the post-result countdown leads to
    pub next: Option<StageRef>,
    pub countdown_remaining: u32,
}

impl BattleSession {
    pub fn new(id: u64, stage: u32, world: u32, enemy: Enemy) -> Self {
        Self {
            id,
            stage,
            world,
            phase: BattlePhase::Countdown(Banner::Ready),
            enemy,
            timers: SessionTimers::default(),
            result: ResolutionLatch::new(),
            next: None,
            countdown_remaining: 0,
        }
    }

    pub fn stage_ref(&self) -> StageRef {
        StageRef {
            stage: self.stage,
            world: self.world,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.result.is_claimed()
    }
}

impl CombatTarget for BattleSession {
    fn is_active(&self) -> bool {
        self.phase == BattlePhase::Active && !self.result.is_claimed()
    }

    fn enemy_mut(&mut self) -> Option<&mut Combatant> {
        Some(&mut self.enemy.stats)
    }
}

/// Where a stage progresses after a win: next stage, first stage of the next
/// world after the last stage, or hold at the final stage of the final world.
pub fn next_after_win(current: StageRef, stages_per_world: u32, max_world: u32) -> StageRef {
    if current.stage < stages_per_world {
        StageRef {
            stage: current.stage + 1,
            world: current.world,
        }
    } else if current.world < max_world {
        StageRef {
            stage: 1,
            world: current.world + 1,
        }
    } else {
        current
    }
}

/// A lost stage restarts the current world.
pub fn next_after_loss(current: StageRef) -> StageRef {
    StageRef {
        stage: 1,
        world: current.world,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(stage: u32, world: u32) -> StageRef {
        StageRef { stage, world }
    }

    #[test]
    fn test_next_after_win_increments_stage() {
        assert_eq!(next_after_win(at(1, 1), 20, 10), at(2, 1));
        assert_eq!(next_after_win(at(19, 3), 20, 10), at(20, 3));
    }

    #[test]
    fn test_next_after_win_wraps_world() {
        assert_eq!(next_after_win(at(20, 1), 20, 10), at(1, 2));
    }

    #[test]
    fn test_next_after_win_holds_at_max() {
        assert_eq!(next_after_win(at(20, 10), 20, 10), at(20, 10));
    }

    #[test]
    fn test_next_after_loss_restarts_world() {
        assert_eq!(next_after_loss(at(14, 4)), at(1, 4));
    }

    #[test]
    fn test_session_target_only_active_when_live() {
        let mut session = BattleSession::new(1, 1, 1, Enemy::new("Slime".into(), 10.0, 1.0));
        assert!(!session.is_active());
        session.phase = BattlePhase::Active;
        assert!(session.is_active());
        session.phase = BattlePhase::Cinematic(SpecialStep::Windup);
        assert!(!session.is_active());
        session.phase = BattlePhase::Active;
        session.result.claim(SessionOutcome::Win);
        assert!(!session.is_active());
    }

    #[test]
    fn test_timers_cancel_all_clears_scheduler() {
        let mut scheduler: Scheduler<Task> = Scheduler::new();
        let mut timers = SessionTimers {
            player_strike: Some(scheduler.every(600, Task::Stage(StageTask::PlayerStrike))),
            enemy_strike: Some(scheduler.every(900, Task::Stage(StageTask::EnemyStrike))),
            transition: Some(scheduler.every(1000, Task::Stage(StageTask::AutoAdvanceTick))),
            ..Default::default()
        };
        timers.freeze(&mut scheduler);
        assert_eq!(scheduler.pending(), 1);
        timers.cancel_all(&mut scheduler);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(timers, SessionTimers::default());
    }
}
