//! Stage battle controller: ready countdown, live strike ticks, special-move
//! cinematic, win/lose resolution and the auto-advance/auto-restart loop.

use tracing::{debug, info};

use super::types::*;
use crate::combat::{generate_stage_enemy, roll_strike_damage, special_damage, Enemy};
use crate::core::constants::{COUNTDOWN_TICK_MS, WIN_XP_PER_STAGE_WORLD};
use crate::core::context::{CombatContext, Task};
use crate::core::events::{
    Banner, CombatEvent, RewardSummary, SessionOutcome, Side, StageRef, StrikeKind,
};
use crate::core::scheduler::TaskHandle;
use crate::items::roll_victory_drops;
use crate::skills::{CombatTarget, SkillKind};

fn schedule_once(ctx: &mut CombatContext, delay_ms: u64, task: StageTask) -> TaskHandle {
    ctx.scheduler.after(delay_ms, Task::Stage(task))
}

fn schedule_every(ctx: &mut CombatContext, interval_ms: u64, task: StageTask) -> TaskHandle {
    ctx.scheduler.every(interval_ms, Task::Stage(task))
}

/// Owns at most one live [`BattleSession`].
#[derive(Debug, Default)]
pub struct StageBattleController {
    session: Option<BattleSession>,
    next_session_id: u64,
}

impl StageBattleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&BattleSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut BattleSession> {
        self.session.as_mut()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Start the encounter for (stage, world), tearing down any current one.
    pub fn start(&mut self, ctx: &mut CombatContext, stage: u32, world: u32) {
        let stage = stage.clamp(1, ctx.config.stages_per_world);
        let world = world.clamp(1, ctx.config.max_world);
        let enemy = generate_stage_enemy(stage, world, ctx.config.stages_per_world, &mut ctx.rng);
        self.start_with_enemy(ctx, stage, world, enemy);
    }

    /// Start an encounter against a specific enemy.
    pub fn start_with_enemy(
        &mut self,
        ctx: &mut CombatContext,
        stage: u32,
        world: u32,
        enemy: Enemy,
    ) {
        self.exit(ctx);

        if !ctx.player.is_alive() {
            ctx.player.restore_full_hp();
        }
        ctx.player.reset_charge();

        self.next_session_id += 1;
        let mut session = BattleSession::new(self.next_session_id, stage, world, enemy);
        info!(
            session = session.id,
            stage,
            world,
            enemy = %session.enemy.name,
            "stage battle started"
        );

        ctx.emit(CombatEvent::EncounterStarted {
            stage,
            world,
            enemy_name: session.enemy.name.clone(),
            is_boss: session.enemy.is_boss,
        });
        ctx.emit_player_hp();
        emit_enemy_hp(ctx, &session);
        ctx.emit(CombatEvent::Announcement {
            banner: Banner::Ready,
        });
        let ready_ms = ctx.config.ready_announce_ms;
        session.timers.intro = Some(schedule_once(ctx, ready_ms, StageTask::ReadyElapsed));
        self.session = Some(session);
    }

    /// Tear down the live session and cancel every handle it owns.
    pub fn exit(&mut self, ctx: &mut CombatContext) {
        if let Some(mut session) = self.session.take() {
            session.timers.cancel_all(&mut ctx.scheduler);
            debug!(session = session.id, "stage battle torn down");
        }
    }

    /// Dispatch one scheduled task to the live session.
    pub fn handle(&mut self, ctx: &mut CombatContext, task: StageTask) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(next) = session.on_task(ctx, task) {
            self.start(ctx, next.stage, next.world);
        }
    }

    /// Run the lethal check from outside the strike path. Safe to call any
    /// number of times; only the first detection resolves.
    pub fn check_defeat(&mut self, ctx: &mut CombatContext) {
        if let Some(session) = self.session.as_mut() {
            session.check_defeat(ctx);
        }
    }
}

fn emit_enemy_hp(ctx: &mut CombatContext, session: &BattleSession) {
    ctx.emit(CombatEvent::HpChanged {
        side: Side::Enemy,
        hp: session.enemy.stats.hp() as u64,
        max_hp: session.enemy.stats.max_hp as u64,
    });
}

impl BattleSession {
    /// Returns the encounter to start when a post-result countdown completes.
    fn on_task(&mut self, ctx: &mut CombatContext, task: StageTask) -> Option<StageRef> {
        match task {
            StageTask::ReadyElapsed => self.on_ready_elapsed(ctx),
            StageTask::FightElapsed => self.on_fight_elapsed(ctx),
            StageTask::PlayerStrike => self.on_player_strike(ctx),
            StageTask::EnemyStrike => self.on_enemy_strike(ctx),
            StageTask::SpecialImpact => self.on_special_impact(ctx),
            StageTask::SpecialRecovered => self.on_special_recovered(ctx),
            StageTask::DefeatAnimationDone => self.on_defeat_animation_done(ctx),
            StageTask::AutoAdvanceTick | StageTask::AutoRestartTick => {
                return self.on_countdown_tick(ctx, task);
            }
        }
        None
    }

    fn on_ready_elapsed(&mut self, ctx: &mut CombatContext) {
        if self.phase != BattlePhase::Countdown(Banner::Ready) {
            return;
        }
        self.phase = BattlePhase::Countdown(Banner::Fight);
        ctx.emit(CombatEvent::Announcement {
            banner: Banner::Fight,
        });
        let fight_ms = ctx.config.fight_announce_ms;
        self.timers.intro = Some(schedule_once(ctx, fight_ms, StageTask::FightElapsed));
    }

    fn on_fight_elapsed(&mut self, ctx: &mut CombatContext) {
        if self.phase != BattlePhase::Countdown(Banner::Fight) {
            return;
        }
        self.timers.intro = None;
        self.phase = BattlePhase::Active;
        let player_ms = ctx.config.player_strike_interval_ms;
        let enemy_ms = ctx.config.enemy_strike_interval_ms;
        self.timers.player_strike = Some(schedule_every(ctx, player_ms, StageTask::PlayerStrike));
        self.timers.enemy_strike = Some(schedule_every(ctx, enemy_ms, StageTask::EnemyStrike));
        debug!(session = self.id, "stage battle live");
    }

    fn on_player_strike(&mut self, ctx: &mut CombatContext) {
        if self.phase != BattlePhase::Active || self.is_resolved() {
            return;
        }

        let per_strike = ctx.player.charge_per_strike();
        let charge = ctx.player.add_charge(per_strike);
        ctx.emit(CombatEvent::ChargeChanged { charge });

        if ctx.player.is_charge_full() {
            self.begin_special(ctx);
            return;
        }

        let roll = roll_strike_damage(ctx.player.attack_power(), &ctx.config, &mut ctx.rng);
        let kind = if roll.is_ambush {
            StrikeKind::Ambush
        } else {
            StrikeKind::Standard
        };
        self.apply_damage(ctx, Side::Enemy, roll.damage, roll.is_ambush, kind);

        // Skills ride on the player's tick and stop once the fight is frozen.
        if self.is_active() {
            self.run_skill_tick(ctx);
        }
    }

    fn on_enemy_strike(&mut self, ctx: &mut CombatContext) {
        if self.phase != BattlePhase::Active || self.is_resolved() {
            return;
        }
        let attack = self.enemy.stats.attack_power;
        let roll = roll_strike_damage(attack, &ctx.config, &mut ctx.rng);
        let kind = if roll.is_ambush {
            StrikeKind::Ambush
        } else {
            StrikeKind::Standard
        };
        self.apply_damage(ctx, Side::Player, roll.damage, roll.is_ambush, kind);
    }

    fn run_skill_tick(&mut self, ctx: &mut CombatContext) {
        let now = ctx.now();
        let report = ctx.skills.auto_battle_tick(&mut ctx.player, self, now);
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
            emit_enemy_hp(ctx, self);
            self.check_defeat(ctx);
        }
    }

    /// Enter the cinematic lock: zero the charge and schedule the impact.
    fn begin_special(&mut self, ctx: &mut CombatContext) {
        ctx.player.reset_charge();
        ctx.emit(CombatEvent::ChargeChanged { charge: 0 });
        self.phase = BattlePhase::Cinematic(SpecialStep::Windup);
        ctx.emit(CombatEvent::CinematicStarted);
        let windup = ctx.config.special_windup_ms;
        self.timers.cinematic = Some(schedule_once(ctx, windup, StageTask::SpecialImpact));
        debug!(session = self.id, "special move started");
    }

    fn on_special_impact(&mut self, ctx: &mut CombatContext) {
        if self.phase != BattlePhase::Cinematic(SpecialStep::Windup) {
            return;
        }
        self.phase = BattlePhase::Cinematic(SpecialStep::Recover);
        let recover = ctx.config.special_recover_ms;
        self.timers.cinematic = Some(schedule_once(ctx, recover, StageTask::SpecialRecovered));

        let damage = special_damage(ctx.player.attack_power(), ctx.player.soul_level());
        self.apply_damage(ctx, Side::Enemy, damage, true, StrikeKind::Special);
    }

    fn on_special_recovered(&mut self, ctx: &mut CombatContext) {
        if self.phase != BattlePhase::Cinematic(SpecialStep::Recover) {
            return;
        }
        self.timers.cinematic = None;
        self.phase = BattlePhase::Active;
        ctx.emit(CombatEvent::CinematicEnded);
    }

    /// Single damage path: subtract, report, then check both combatants.
    fn apply_damage(
        &mut self,
        ctx: &mut CombatContext,
        target: Side,
        damage: f64,
        is_crit: bool,
        kind: StrikeKind,
    ) {
        let amount = damage.max(0.0).floor();
        match target {
            Side::Enemy => {
                self.enemy.stats.take_damage(amount);
            }
            Side::Player => {
                ctx.player.take_damage(amount);
            }
        }
        ctx.emit(CombatEvent::StrikeResolved {
            amount: amount as u64,
            target,
            is_crit,
            kind,
        });
        match target {
            Side::Enemy => emit_enemy_hp(ctx, self),
            Side::Player => ctx.emit_player_hp(),
        }
        self.check_defeat(ctx);
    }

    /// Lethal check for both sides. Enemy first, so a mutual knockout is a win.
    fn check_defeat(&mut self, ctx: &mut CombatContext) {
        if !self.enemy.stats.is_alive() {
            if !self.result.claim(SessionOutcome::Win) {
                return;
            }
            self.timers.freeze(&mut ctx.scheduler);
            if matches!(self.phase, BattlePhase::Cinematic(_)) {
                ctx.emit(CombatEvent::CinematicEnded);
            }
            self.phase = BattlePhase::Defeating;
            let delay = ctx.config.defeat_animation_ms;
            self.timers.defeat = Some(schedule_once(ctx, delay, StageTask::DefeatAnimationDone));
            debug!(session = self.id, "enemy defeated");
        } else if !ctx.player.is_alive() {
            if !self.result.claim(SessionOutcome::Lose) {
                return;
            }
            self.timers.freeze(&mut ctx.scheduler);
            self.resolve_lose(ctx);
        }
    }

    fn on_defeat_animation_done(&mut self, ctx: &mut CombatContext) {
        if self.phase != BattlePhase::Defeating {
            return;
        }
        self.timers.defeat = None;
        self.resolve_win(ctx);
    }

    fn resolve_win(&mut self, ctx: &mut CombatContext) {
        let xp = WIN_XP_PER_STAGE_WORLD * self.stage as u64 * self.world as u64;
        let drops = roll_victory_drops(self.world, &mut ctx.rng);
        let summary = RewardSummary {
            xp,
            coins: ctx.config.win_coins,
            drops,
        };
        ctx.collaborators.grant(&summary);
        info!(
            session = self.id,
            stage = self.stage,
            world = self.world,
            xp,
            drops = summary.drops.len(),
            "stage won"
        );
        ctx.emit(CombatEvent::SessionEnded {
            outcome: SessionOutcome::Win,
            summary,
        });
        self.phase = BattlePhase::Resolved(SessionOutcome::Win);

        let next = next_after_win(
            self.stage_ref(),
            ctx.config.stages_per_world,
            ctx.config.max_world,
        );
        let seconds = ctx.config.auto_advance_seconds;
        self.begin_transition(ctx, next, seconds, StageTask::AutoAdvanceTick);
    }

    fn resolve_lose(&mut self, ctx: &mut CombatContext) {
        ctx.player.restore_full_hp();
        ctx.emit_player_hp();
        info!(session = self.id, stage = self.stage, world = self.world, "stage lost");
        ctx.emit(CombatEvent::SessionEnded {
            outcome: SessionOutcome::Lose,
            summary: RewardSummary::default(),
        });
        self.phase = BattlePhase::Resolved(SessionOutcome::Lose);

        let next = next_after_loss(self.stage_ref());
        let seconds = ctx.config.auto_restart_seconds;
        self.begin_transition(ctx, next, seconds, StageTask::AutoRestartTick);
    }

    fn begin_transition(
        &mut self,
        ctx: &mut CombatContext,
        next: StageRef,
        seconds: u32,
        task: StageTask,
    ) {
        self.next = Some(next);
        self.countdown_remaining = seconds;
        self.emit_countdown(ctx, task);
        self.timers.transition = Some(schedule_every(ctx, COUNTDOWN_TICK_MS, task));
    }

    fn emit_countdown(&self, ctx: &mut CombatContext, task: StageTask) {
        let Some(next) = self.next else {
            return;
        };
        let remaining_secs = self.countdown_remaining;
        let event = match task {
            StageTask::AutoRestartTick => {
                CombatEvent::AutoRestartCountdown { remaining_secs, next }
            }
            _ => CombatEvent::AutoAdvanceCountdown { remaining_secs, next },
        };
        ctx.emit(event);
    }

    fn on_countdown_tick(&mut self, ctx: &mut CombatContext, task: StageTask) -> Option<StageRef> {
        if !matches!(self.phase, BattlePhase::Resolved(_)) {
            return None;
        }
        self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
        self.emit_countdown(ctx, task);
        if self.countdown_remaining > 0 {
            return None;
        }
        if let Some(handle) = self.timers.transition.take() {
            ctx.scheduler.cancel(handle);
        }
        self.next
    }
}
