//! Integration test: stage battles end to end
//!
//! Drives the stage controller through the scheduler the way the arena does
//! and checks the observable event stream: strike counts, rewards handed to
//! collaborators, progression and teardown.

use clash::character::BasicStats;
use clash::combat::Enemy;
use clash::core::{
    CombatConfig, CombatContext, CombatEvent, Collaborators, Inventory, Leveling, SessionOutcome,
    Side, StageRef, StrikeKind, Task,
};
use clash::items::Drop;
use clash::stage::StageBattleController;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Ledger {
    xp: u64,
    coins: u64,
    level_checks: u32,
    drops: Vec<Drop>,
}

#[derive(Clone)]
struct Hooks(Rc<RefCell<Ledger>>);

impl Leveling for Hooks {
    fn add_xp(&mut self, xp: u64) {
        self.0.borrow_mut().xp += xp;
    }
    fn add_coins(&mut self, coins: u64) {
        self.0.borrow_mut().coins += coins;
    }
    fn check_level_up(&mut self) {
        self.0.borrow_mut().level_checks += 1;
    }
}

impl Inventory for Hooks {
    fn add_drop(&mut self, drop: Drop) {
        self.0.borrow_mut().drops.push(drop);
    }
}

fn no_ambush() -> CombatConfig {
    CombatConfig {
        ambush_chance: 0.0,
        ..Default::default()
    }
}

fn make_ctx(seed: u64, attack: f64, hooks: Option<Hooks>) -> CombatContext {
    let ctx = CombatContext::new(Box::new(BasicStats::new(attack, 1_000.0, 1)), no_ambush())
        .with_rng(ChaCha8Rng::seed_from_u64(seed));
    match hooks {
        Some(hooks) => ctx.with_collaborators(Collaborators {
            inventory: Some(Box::new(hooks.clone())),
            leveling: Some(Box::new(hooks)),
        }),
        None => ctx,
    }
}

fn pump(
    controller: &mut StageBattleController,
    ctx: &mut CombatContext,
    until: u64,
) -> Vec<CombatEvent> {
    while let Some((_, task)) = ctx.scheduler.pop_due(until) {
        if let Task::Stage(task) = task {
            controller.handle(ctx, task);
        }
    }
    ctx.scheduler.advance_to(until);
    ctx.drain_events()
}

fn player_strikes_before_end(events: &[CombatEvent]) -> usize {
    events
        .iter()
        .take_while(|e| !matches!(e, CombatEvent::SessionEnded { .. }))
        .filter(|e| {
            matches!(
                e,
                CombatEvent::StrikeResolved {
                    target: Side::Enemy,
                    kind: StrikeKind::Standard,
                    ..
                }
            )
        })
        .count()
}

// =============================================================================
// Reference scenario: attack 100 vs 250 hp, stage 1 world 1
// =============================================================================

#[test]
fn test_reference_scenario_win_within_tick_range() {
    for seed in 0..25 {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let mut ctx = make_ctx(seed, 100.0, Some(Hooks(ledger.clone())));
        let mut controller = StageBattleController::new();
        controller.start_with_enemy(&mut ctx, 1, 1, Enemy::new("Meadow Slime".into(), 250.0, 0.0));

        // Intro 1.6s, at most 4 strikes at 600ms, 800ms defeat animation
        let events = pump(&mut controller, &mut ctx, 1_600 + 4 * 600 + 800);
        let strikes = player_strikes_before_end(&events);
        assert!((2..=4).contains(&strikes), "seed {seed}: {strikes} strikes");

        let ended: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                CombatEvent::SessionEnded { outcome, summary } => Some((*outcome, summary.xp)),
                _ => None,
            })
            .collect();
        assert_eq!(ended, vec![(SessionOutcome::Win, 100)], "seed {seed}");

        let ledger = ledger.borrow();
        assert_eq!(ledger.xp, 100);
        assert_eq!(ledger.coins, 50);
        assert_eq!(ledger.level_checks, 1);
        assert!(ledger.drops.len() <= 3);
        assert!(ledger.drops.iter().all(|d| d.rarity.tier() == 1));
    }
}

#[test]
fn test_hp_events_track_enemy_down_to_zero() {
    let mut ctx = make_ctx(3, 100.0, None);
    let mut controller = StageBattleController::new();
    controller.start_with_enemy(&mut ctx, 1, 1, Enemy::new("Meadow Slime".into(), 250.0, 0.0));
    let events = pump(&mut controller, &mut ctx, 6_000);

    let enemy_hp: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::HpChanged {
                side: Side::Enemy,
                hp,
                max_hp: 250,
            } => Some(*hp),
            _ => None,
        })
        .collect();
    assert_eq!(enemy_hp.first(), Some(&250));
    assert_eq!(enemy_hp.last(), Some(&0));
    assert!(enemy_hp.windows(2).all(|w| w[1] <= w[0]));
}

// =============================================================================
// Progression
// =============================================================================

#[test]
fn test_win_auto_advances_to_next_stage() {
    let mut ctx = make_ctx(11, 100.0, None);
    let mut controller = StageBattleController::new();
    controller.start_with_enemy(&mut ctx, 4, 2, Enemy::new("Forest Wolf".into(), 50.0, 0.0));
    let events = pump(&mut controller, &mut ctx, 1_600 + 600 + 800);
    assert!(events.contains(&CombatEvent::AutoAdvanceCountdown {
        remaining_secs: 3,
        next: StageRef { stage: 5, world: 2 },
    }));

    let events = pump(&mut controller, &mut ctx, 1_600 + 600 + 800 + 3_000);
    let session = controller.session().expect("next encounter");
    assert_eq!((session.stage, session.world), (5, 2));
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::EncounterStarted { stage: 5, world: 2, .. }
    )));
}

#[test]
fn test_final_stage_wraps_to_next_world() {
    let mut ctx = make_ctx(5, 100.0, None);
    let mut controller = StageBattleController::new();
    controller.start_with_enemy(&mut ctx, 20, 1, Enemy::new("Meadow Warlord".into(), 10.0, 0.0));
    pump(&mut controller, &mut ctx, 1_600 + 600 + 800 + 3_000);
    let session = controller.session().expect("next encounter");
    assert_eq!((session.stage, session.world), (1, 2));
}

#[test]
fn test_generated_boss_on_last_stage() {
    let mut ctx = make_ctx(9, 100.0, None);
    let mut controller = StageBattleController::new();
    controller.start(&mut ctx, 20, 3);
    let events = ctx.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::EncounterStarted { is_boss: true, stage: 20, world: 3, .. }
    )));
}

// =============================================================================
// Missing collaborators and teardown
// =============================================================================

#[test]
fn test_win_without_hooks_still_resolves() {
    let mut ctx = make_ctx(2, 500.0, None);
    let mut controller = StageBattleController::new();
    controller.start_with_enemy(&mut ctx, 1, 1, Enemy::new("Meadow Slime".into(), 100.0, 0.0));
    let events = pump(&mut controller, &mut ctx, 5_000);
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::SessionEnded { outcome: SessionOutcome::Win, .. }
    )));
}

#[test]
fn test_exit_mid_fight_stops_all_mutation() {
    let mut ctx = make_ctx(8, 10.0, None);
    let mut controller = StageBattleController::new();
    controller.start_with_enemy(&mut ctx, 1, 1, Enemy::new("Meadow Golem".into(), 100_000.0, 25.0));
    pump(&mut controller, &mut ctx, 7_000);
    let hp = ctx.player.hp();
    let charge = ctx.player.charge();

    controller.exit(&mut ctx);
    let events = pump(&mut controller, &mut ctx, 120_000);
    assert!(events.is_empty());
    assert_eq!(ctx.player.hp(), hp);
    assert_eq!(ctx.player.charge(), charge);
    assert_eq!(ctx.scheduler.pending(), 0);
}

#[test]
fn test_exit_during_countdown_cancels_auto_advance() {
    let mut ctx = make_ctx(8, 500.0, None);
    let mut controller = StageBattleController::new();
    controller.start_with_enemy(&mut ctx, 1, 1, Enemy::new("Meadow Slime".into(), 10.0, 0.0));
    pump(&mut controller, &mut ctx, 1_600 + 600 + 800 + 1_000);
    controller.exit(&mut ctx);
    assert!(pump(&mut controller, &mut ctx, 30_000).is_empty());
    assert!(controller.session().is_none());
}
