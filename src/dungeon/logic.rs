//! Dungeon attempt lifecycle: frame loop, contact exchanges, skill timer,
//! countdown clock, and the single result presentation.
//!
//! Three sources can observe a terminal condition in the same session: the
//! physics contact path, the skill timer and the countdown. All of them go
//! through [`DungeonEngine::finish`], which claims the session latch, stops
//! every loop and schedules the presentation once.

use tracing::{debug, error, info};

use super::physics::{apply_knockback, step};
use super::types::*;
use crate::combat::{generate_dungeon_boss, roll_boss_damage, roll_dungeon_damage, Boss};
use crate::core::constants::{
    COUNTDOWN_TICK_MS, DUNGEON_COINS_PER_BOSS_LEVEL, DUNGEON_XP_PER_BOSS_LEVEL,
};
use crate::core::context::{CombatContext, Task};
use crate::core::error::CombatError;
use crate::core::events::{CombatEvent, RewardSummary, SessionOutcome, Side, StrikeKind};
use crate::items::roll_boss_drop;
use crate::skills::SkillKind;

/// Owns at most one live [`DungeonSession`].
#[derive(Debug, Default)]
pub struct DungeonEngine {
    session: Option<DungeonSession>,
    next_session_id: u64,
}

impl DungeonEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DungeonSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut DungeonSession> {
        self.session.as_mut()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Start an attempt against a freshly generated boss of the given level.
    pub fn start(&mut self, ctx: &mut CombatContext, boss_level: u32) {
        let boss = generate_dungeon_boss(boss_level, &mut ctx.rng);
        self.start_with_boss(ctx, boss);
    }

    pub fn start_with_boss(&mut self, ctx: &mut CombatContext, boss: Boss) {
        self.exit(ctx);
        if !ctx.player.is_alive() {
            ctx.player.restore_full_hp();
        }

        self.next_session_id += 1;
        let time_limit = ctx.config.dungeon_time_limit_seconds;
        let mut session = DungeonSession::new(self.next_session_id, boss, time_limit);
        info!(
            session = session.id,
            boss_level = session.boss_level,
            time_limit,
            "dungeon attempt started"
        );

        ctx.emit(CombatEvent::DungeonStarted {
            boss_name: session.boss.as_ref().map(|b| b.name.clone()).unwrap_or_default(),
            time_limit_secs: time_limit,
        });
        ctx.emit_player_hp();
        emit_boss_hp(ctx, &session);

        let skill_ms = ctx.config.dungeon_skill_tick_ms;
        let timers = &mut session.timers;
        timers.frame = Some(ctx.scheduler.every_frame(Task::Dungeon(DungeonTask::Frame)));
        let clock = Task::Dungeon(DungeonTask::ClockTick);
        timers.clock = Some(ctx.scheduler.every(COUNTDOWN_TICK_MS, clock));
        timers.skill = Some(ctx.scheduler.every(skill_ms, Task::Dungeon(DungeonTask::SkillTick)));
        self.session = Some(session);
    }

    /// Tear down the live attempt and cancel every handle it owns.
    pub fn exit(&mut self, ctx: &mut CombatContext) {
        if let Some(mut session) = self.session.take() {
            session.timers.cancel_all(&mut ctx.scheduler);
            debug!(session = session.id, "dungeon attempt torn down");
        }
    }

    pub fn handle(&mut self, ctx: &mut CombatContext, task: DungeonTask) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match task {
            DungeonTask::Frame => on_frame(session, ctx),
            DungeonTask::SkillTick => on_skill_tick(session, ctx),
            DungeonTask::ClockTick => on_clock_tick(session, ctx),
            DungeonTask::PresentResult => {
                if let Err(err) = present(session, ctx) {
                    error!(session = session.id, %err, "dungeon session aborted");
                    ctx.emit(CombatEvent::SessionAborted {
                        reason: err.to_string(),
                    });
                    self.exit(ctx);
                    return;
                }
                // Attempt is over once the result is shown
                if let Some(done) = self.session.take() {
                    debug!(session = done.id, "dungeon attempt closed");
                }
            }
        }
    }

    /// Run the terminal checks from outside the scheduled paths. Repeated
    /// calls are no-ops after the first detection.
    pub fn check_terminal(&mut self, ctx: &mut CombatContext) {
        if let Some(session) = self.session.as_mut() {
            check_defeat(session, ctx);
        }
    }

    /// Authoritative terminal resolution. First caller wins.
    pub fn finish(&mut self, ctx: &mut CombatContext, outcome: SessionOutcome) -> bool {
        match self.session.as_mut() {
            Some(session) => finish(session, ctx, outcome),
            None => false,
        }
    }
}

fn emit_boss_hp(ctx: &mut CombatContext, session: &DungeonSession) {
    if let Some(stats) = session.boss_stats() {
        ctx.emit(CombatEvent::HpChanged {
            side: Side::Enemy,
            hp: stats.hp() as u64,
            max_hp: stats.max_hp as u64,
        });
    }
}

fn finish(session: &mut DungeonSession, ctx: &mut CombatContext, outcome: SessionOutcome) -> bool {
    if !session.result.claim(outcome) {
        return false;
    }
    session.timers.stop_loops(&mut ctx.scheduler);
    let delay = ctx.config.dungeon_result_delay_ms;
    let task = Task::Dungeon(DungeonTask::PresentResult);
    session.timers.present = Some(ctx.scheduler.after(delay, task));
    debug!(session = session.id, ?outcome, "dungeon attempt finished");
    true
}

/// Boss first, so a mutual knockout is a win.
fn check_defeat(session: &mut DungeonSession, ctx: &mut CombatContext) {
    let boss_down = session.boss_stats().is_some_and(|b| !b.is_alive());
    if boss_down {
        finish(session, ctx, SessionOutcome::Win);
    } else if !ctx.player.is_alive() {
        finish(session, ctx, SessionOutcome::Lose);
    }
}

fn on_frame(session: &mut DungeonSession, ctx: &mut CombatContext) {
    if session.is_over() {
        return;
    }
    let report = step(session);
    if report.shake {
        ctx.emit(CombatEvent::ScreenShake);
    }
    if report.contact {
        resolve_contact(session, ctx);
    }
}

/// Simultaneous exchange: both sides strike, then both bodies bounce apart.
fn resolve_contact(session: &mut DungeonSession, ctx: &mut CombatContext) {
    let Some(boss) = session.boss.as_mut() else {
        return;
    };
    let roll = roll_dungeon_damage(
        ctx.player.attack_power(),
        ctx.player.rank(),
        &ctx.config,
        &mut ctx.rng,
    );
    let boss_damage = roll_boss_damage(boss.stats.attack_power, &mut ctx.rng);

    boss.stats.take_damage(roll.damage);
    ctx.player.take_damage(boss_damage);

    ctx.emit(CombatEvent::StrikeResolved {
        amount: roll.damage.floor() as u64,
        target: Side::Enemy,
        is_crit: roll.is_crit,
        kind: StrikeKind::Contact,
    });
    ctx.emit(CombatEvent::StrikeResolved {
        amount: boss_damage.floor() as u64,
        target: Side::Player,
        is_crit: false,
        kind: StrikeKind::Contact,
    });
    emit_boss_hp(ctx, session);
    ctx.emit_player_hp();

    apply_knockback(session, roll.is_crit);
    if roll.is_crit {
        debug!(session = session.id, "boss stunned");
    }
    check_defeat(session, ctx);
}

fn on_skill_tick(session: &mut DungeonSession, ctx: &mut CombatContext) {
    if session.is_over() {
        return;
    }
    let now = ctx.now();
    let report = ctx.skills.auto_battle_tick(&mut ctx.player, session, now);
    let damaged = report.dealt_damage();
    let healed = report
        .casts
        .iter()
        .any(|c| c.skill.kind() == SkillKind::Heal && c.magnitude > 0);
    ctx.emit_all(report.into_events());
    if healed {
        ctx.emit_player_hp();
    }
    if damaged {
        emit_boss_hp(ctx, session);
    }
    check_defeat(session, ctx);
}

fn on_clock_tick(session: &mut DungeonSession, ctx: &mut CombatContext) {
    if session.is_over() {
        return;
    }
    session.time_left_secs = session.time_left_secs.saturating_sub(1);
    ctx.emit(CombatEvent::DungeonClock {
        seconds_left: session.time_left_secs,
    });
    if session.time_left_secs == 0 {
        finish(session, ctx, SessionOutcome::Timeout);
    }
}

/// Show the result and hand out rewards. Runs once per attempt.
fn present(session: &mut DungeonSession, ctx: &mut CombatContext) -> Result<(), CombatError> {
    session.timers.present = None;
    let Some(outcome) = session.result.get() else {
        return Ok(());
    };
    let boss = session.boss.take().ok_or(CombatError::MissingBoss)?;
    let level = boss.level();

    let summary = match outcome {
        SessionOutcome::Win => {
            let summary = RewardSummary {
                xp: DUNGEON_XP_PER_BOSS_LEVEL * level as u64,
                coins: DUNGEON_COINS_PER_BOSS_LEVEL * level as u64,
                drops: vec![roll_boss_drop(level, &mut ctx.rng)],
            };
            ctx.collaborators.grant(&summary);
            summary
        }
        SessionOutcome::Lose | SessionOutcome::Timeout => {
            ctx.player.restore_full_hp();
            ctx.emit_player_hp();
            RewardSummary::default()
        }
    };

    info!(
        session = session.id,
        boss = %boss.name,
        boss_level = level,
        ?outcome,
        xp = summary.xp,
        "dungeon attempt ended"
    );
    ctx.emit(CombatEvent::SessionEnded { outcome, summary });
    Ok(())
}
