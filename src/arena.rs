//! Mode-switch boundary and scheduler pump.
//!
//! [`Arena`] owns the [`CombatContext`] and both engines. At most one of
//! them has a live session at any time: entering a mode tears the other one
//! down first, cancelling every handle it owned.

use tracing::{debug, info};

use crate::core::context::{CombatContext, Task};
use crate::core::events::CombatEvent;
use crate::dungeon::DungeonEngine;
use crate::stage::StageBattleController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaMode {
    Idle,
    Stage,
    Dungeon,
}

#[derive(Debug)]
pub struct Arena {
    pub ctx: CombatContext,
    stage: StageBattleController,
    dungeon: DungeonEngine,
}

impl Arena {
    pub fn new(ctx: CombatContext) -> Self {
        Self {
            ctx,
            stage: StageBattleController::new(),
            dungeon: DungeonEngine::new(),
        }
    }

    pub fn mode(&self) -> ArenaMode {
        if self.stage.is_running() {
            ArenaMode::Stage
        } else if self.dungeon.is_running() {
            ArenaMode::Dungeon
        } else {
            ArenaMode::Idle
        }
    }

    pub fn stage(&self) -> &StageBattleController {
        &self.stage
    }

    pub fn dungeon(&self) -> &DungeonEngine {
        &self.dungeon
    }

    pub fn enter_stage(&mut self, stage: u32, world: u32) {
        self.dungeon.exit(&mut self.ctx);
        info!(stage, world, "entering stage mode");
        self.stage.start(&mut self.ctx, stage, world);
    }

    pub fn enter_dungeon(&mut self, boss_level: u32) {
        self.stage.exit(&mut self.ctx);
        info!(boss_level, "entering dungeon mode");
        self.dungeon.start(&mut self.ctx, boss_level);
    }

    /// Leave whichever mode is active.
    pub fn exit(&mut self) {
        self.stage.exit(&mut self.ctx);
        self.dungeon.exit(&mut self.ctx);
    }

    /// Advance simulated time by `ms`, dispatching every task that comes due
    /// one at a time, and return the events they produced.
    pub fn advance(&mut self, ms: u64) -> Vec<CombatEvent> {
        let until = self.ctx.now().saturating_add(ms);
        let mut dispatched = 0usize;
        while let Some((_, task)) = self.ctx.scheduler.pop_due(until) {
            dispatched += 1;
            match task {
                Task::Stage(task) => self.stage.handle(&mut self.ctx, task),
                Task::Dungeon(task) => self.dungeon.handle(&mut self.ctx, task),
            }
        }
        self.ctx.scheduler.advance_to(until);
        debug!(now_ms = until, dispatched, "arena advanced");
        self.ctx.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::BasicStats;
    use crate::core::config::CombatConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn make_arena() -> Arena {
        let stats = BasicStats::new(50.0, 2000.0, 1);
        let ctx = CombatContext::new(Box::new(stats), CombatConfig::default())
            .with_rng(ChaCha8Rng::seed_from_u64(12345));
        Arena::new(ctx)
    }

    #[test]
    fn test_starts_idle() {
        let mut arena = make_arena();
        assert_eq!(arena.mode(), ArenaMode::Idle);
        assert!(arena.advance(10_000).is_empty());
    }

    #[test]
    fn test_entering_dungeon_tears_down_stage() {
        let mut arena = make_arena();
        arena.enter_stage(1, 1);
        arena.advance(3_000);
        assert_eq!(arena.mode(), ArenaMode::Stage);

        arena.enter_dungeon(3);
        assert_eq!(arena.mode(), ArenaMode::Dungeon);
        assert!(!arena.stage().is_running());
        let events = arena.advance(2_000);
        assert!(events.iter().all(|e| !matches!(
            e,
            CombatEvent::Announcement { .. } | CombatEvent::ChargeChanged { .. }
        )));
    }

    #[test]
    fn test_entering_stage_tears_down_dungeon() {
        let mut arena = make_arena();
        arena.enter_dungeon(1);
        arena.advance(500);
        arena.enter_stage(2, 1);
        assert_eq!(arena.mode(), ArenaMode::Stage);
        assert!(!arena.dungeon().is_running());
        let events = arena.advance(5_000);
        assert!(events.iter().all(|e| !matches!(e, CombatEvent::DungeonClock { .. })));
    }

    #[test]
    fn test_exit_silences_everything() {
        let mut arena = make_arena();
        arena.enter_stage(1, 1);
        arena.advance(4_000);
        arena.exit();
        assert_eq!(arena.mode(), ArenaMode::Idle);
        assert!(arena.advance(60_000).is_empty());
        assert_eq!(arena.ctx.scheduler.pending(), 0);
    }
}
