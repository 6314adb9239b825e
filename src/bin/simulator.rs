//! Clash Headless Combat Simulator
//!
//! Drives stage battles or dungeon attempts against simulated time without
//! any UI, collecting metrics for balance analysis. Uses the same `Arena`
//! the game embeds.
//!
//! Usage:
//!   cargo run --bin simulator -- [OPTIONS]
//!
//! Options:
//!   --mode MODE     stage | dungeon (default: stage)
//!   --seconds N     Simulated seconds (default: 3600)
//!   --seed N        RNG seed (default: 42)
//!   --attack N      Starting attack power (default: 100)
//!   --hp N          Starting max hp (default: 1000)
//!   --level N       Starting player level (default: 1)
//!   --rank N        Player rank, raises dungeon crit chance (default: 0)
//!   --config FILE   CombatConfig JSON overrides
//!   --verbose       Print every session result

use clash::arena::Arena;
use clash::character::StatProvider;
use clash::core::{
    CombatConfig, CombatContext, CombatError, CombatEvent, Collaborators, Inventory, Leveling,
    SessionOutcome,
};
use clash::items::{Drop, Rarity};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ── CLI Configuration ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Stage,
    Dungeon,
}

struct SimConfig {
    mode: Mode,
    seconds: u64,
    seed: u64,
    attack: f64,
    hp: f64,
    level: u32,
    rank: u32,
    config_path: Option<String>,
    verbose: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Stage,
            seconds: 3_600,
            seed: 42,
            attack: 100.0,
            hp: 1_000.0,
            level: 1,
            rank: 0,
            config_path: None,
            verbose: false,
        }
    }
}

fn parse_args() -> SimConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                i += 1;
                config.mode = match args.get(i).map(String::as_str) {
                    Some("stage") => Mode::Stage,
                    Some("dungeon") => Mode::Dungeon,
                    _ => usage_error("--mode requires stage or dungeon"),
                };
            }
            "--seconds" => config.seconds = number(&args, &mut i, "--seconds"),
            "--seed" => config.seed = number(&args, &mut i, "--seed"),
            "--attack" => config.attack = number(&args, &mut i, "--attack"),
            "--hp" => config.hp = number(&args, &mut i, "--hp"),
            "--level" => config.level = number(&args, &mut i, "--level"),
            "--rank" => config.rank = number(&args, &mut i, "--rank"),
            "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config.config_path = Some(path.clone()),
                    None => usage_error("--config requires a file path"),
                }
            }
            "--verbose" => config.verbose = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => usage_error(&format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    config
}

fn number<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    *i += 1;
    match args.get(*i).and_then(|v| v.parse().ok()) {
        Some(value) => value,
        None => usage_error(&format!("{flag} requires a number")),
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    print_usage();
    std::process::exit(1);
}

fn print_usage() {
    eprintln!(
        "Clash Headless Combat Simulator\n\
         \n\
         Usage: simulator [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --mode MODE     stage | dungeon (default: stage)\n\
         \x20 --seconds N     Simulated seconds (default: 3600)\n\
         \x20 --seed N        RNG seed (default: 42)\n\
         \x20 --attack N      Starting attack power (default: 100)\n\
         \x20 --hp N          Starting max hp (default: 1000)\n\
         \x20 --level N       Starting player level (default: 1)\n\
         \x20 --rank N        Player rank (default: 0)\n\
         \x20 --config FILE   CombatConfig JSON overrides\n\
         \x20 --verbose       Print every session result\n\
         \x20 --help, -h      Show this help"
    );
}

fn load_combat_config(path: Option<&str>) -> Result<CombatConfig, CombatError> {
    let Some(path) = path else {
        return Ok(CombatConfig::default());
    };
    match std::fs::read_to_string(path) {
        Ok(json) => CombatConfig::from_json(&json),
        Err(err) => {
            warn!(path, %err, "could not read config; using defaults");
            Ok(CombatConfig::default())
        }
    }
}

// ── Simulated Progression ────────────────────────────────────────────

const XP_PER_LEVEL: u64 = 500;
const LEVEL_GROWTH: f64 = 1.08;

/// Stand-in for the game's progression and inventory systems.
#[derive(Debug)]
struct Progression {
    attack_power: f64,
    max_hp: f64,
    current_hp: f64,
    level: u32,
    rank: u32,
    xp: u64,
    coins: u64,
    drops_by_rarity: [u64; 6],
}

impl Progression {
    fn xp_to_next(&self) -> u64 {
        XP_PER_LEVEL * self.level as u64
    }
}

#[derive(Clone)]
struct Shared(Rc<RefCell<Progression>>);

impl StatProvider for Shared {
    fn attack_power(&self) -> f64 {
        self.0.borrow().attack_power
    }

    fn max_hp(&self) -> f64 {
        self.0.borrow().max_hp
    }

    fn current_hp(&self) -> f64 {
        self.0.borrow().current_hp
    }

    fn set_current_hp(&mut self, hp: f64) {
        self.0.borrow_mut().current_hp = hp;
    }

    fn level(&self) -> u32 {
        self.0.borrow().level
    }

    fn rank(&self) -> u32 {
        self.0.borrow().rank
    }

    fn soul_level(&self) -> f64 {
        0.0
    }

    fn advance_level(&self) -> f64 {
        0.0
    }
}

impl Leveling for Shared {
    fn add_xp(&mut self, xp: u64) {
        self.0.borrow_mut().xp += xp;
    }

    fn add_coins(&mut self, coins: u64) {
        self.0.borrow_mut().coins += coins;
    }

    fn check_level_up(&mut self) {
        let mut p = self.0.borrow_mut();
        while p.xp >= p.xp_to_next() {
            p.xp -= p.xp_to_next();
            p.level += 1;
            p.attack_power *= LEVEL_GROWTH;
            p.max_hp *= LEVEL_GROWTH;
            info!(level = p.level, "player levelled up");
        }
    }
}

impl Inventory for Shared {
    fn add_drop(&mut self, drop: Drop) {
        let idx = (drop.rarity.tier() as usize).saturating_sub(1).min(5);
        self.0.borrow_mut().drops_by_rarity[idx] += 1;
    }
}

// ── Simulation Statistics ────────────────────────────────────────────

#[derive(Debug, Default)]
struct SimStats {
    wins: u64,
    losses: u64,
    timeouts: u64,
    aborted: u64,
    crits: u64,
    specials: u64,
    skill_casts: u64,
    xp_gained: u64,
    furthest: (u32, u32),
    highest_boss_level: u32,
}

impl SimStats {
    fn process(&mut self, events: &[CombatEvent], verbose: bool, now_ms: u64) {
        for event in events {
            match event {
                CombatEvent::StrikeResolved { is_crit, .. } if *is_crit => self.crits += 1,
                CombatEvent::CinematicStarted => self.specials += 1,
                CombatEvent::SkillCast { .. } => self.skill_casts += 1,
                CombatEvent::EncounterStarted { stage, world, .. } => {
                    if (*world, *stage) > (self.furthest.1, self.furthest.0) {
                        self.furthest = (*stage, *world);
                    }
                }
                CombatEvent::Announcement { banner } if verbose => {
                    println!("[t={:>8.1}s] {}", now_ms as f64 / 1000.0, banner.text());
                }
                CombatEvent::SessionAborted { .. } => self.aborted += 1,
                CombatEvent::SessionEnded { outcome, summary } => {
                    match outcome {
                        SessionOutcome::Win => self.wins += 1,
                        SessionOutcome::Lose => self.losses += 1,
                        SessionOutcome::Timeout => self.timeouts += 1,
                    }
                    self.xp_gained += summary.xp;
                    if verbose {
                        println!(
                            "[t={:>8.1}s] {:?} (+{} XP, {} drops)",
                            now_ms as f64 / 1000.0,
                            outcome,
                            summary.xp,
                            summary.drops.len()
                        );
                    }
                }
                _ => {}
            }
        }
    }
}

// ── Core Simulation Loop ─────────────────────────────────────────────

const STEP_MS: u64 = 1_000;

fn run_simulation(config: &SimConfig, combat: CombatConfig) -> (SimStats, Shared) {
    let shared = Shared(Rc::new(RefCell::new(Progression {
        attack_power: config.attack,
        max_hp: config.hp,
        current_hp: config.hp,
        level: config.level,
        rank: config.rank,
        xp: 0,
        coins: 0,
        drops_by_rarity: [0; 6],
    })));

    let ctx = CombatContext::new(Box::new(shared.clone()), combat)
        .with_rng(ChaCha8Rng::seed_from_u64(config.seed))
        .with_collaborators(Collaborators {
            inventory: Some(Box::new(shared.clone())),
            leveling: Some(Box::new(shared.clone())),
        });
    let mut arena = Arena::new(ctx);
    let mut stats = SimStats::default();
    let mut boss_level = 1;

    match config.mode {
        Mode::Stage => arena.enter_stage(1, 1),
        Mode::Dungeon => arena.enter_dungeon(boss_level),
    }
    stats.highest_boss_level = boss_level;

    let total_ms = config.seconds * 1_000;
    while arena.ctx.now() < total_ms {
        let events = arena.advance(STEP_MS);
        stats.process(&events, config.verbose, arena.ctx.now());

        if config.mode == Mode::Dungeon {
            for event in &events {
                if let CombatEvent::SessionEnded { outcome, .. } = event {
                    if *outcome == SessionOutcome::Win {
                        boss_level += 1;
                    }
                }
            }
            if !arena.dungeon().is_running() {
                stats.highest_boss_level = stats.highest_boss_level.max(boss_level);
                arena.enter_dungeon(boss_level);
            }
        }
    }
    arena.exit();
    (stats, shared)
}

// ── Report Output ────────────────────────────────────────────────────

fn print_summary(stats: &SimStats, shared: &Shared, config: &SimConfig) {
    let p = shared.0.borrow();
    println!("============================================================");
    println!("  Clash Simulation Report  (seed={})", config.seed);
    println!("============================================================");
    println!();
    println!("Mode: {:?}  |  Duration: {}s", config.mode, config.seconds);
    println!();

    println!("--- Final State ---");
    println!(
        "Level: {}  |  XP: {}  |  Coins: {}",
        p.level, p.xp, p.coins
    );
    println!(
        "Attack: {:.0}  |  Max HP: {:.0}",
        p.attack_power, p.max_hp
    );
    match config.mode {
        Mode::Stage => println!("Furthest stage: {}-{}", stats.furthest.1, stats.furthest.0),
        Mode::Dungeon => println!("Highest boss level: {}", stats.highest_boss_level),
    }
    println!();

    println!("--- Combat ---");
    println!(
        "Wins: {}  |  Losses: {}  |  Timeouts: {}",
        stats.wins, stats.losses, stats.timeouts
    );
    println!(
        "Crits: {}  |  Specials: {}  |  Skill casts: {}",
        stats.crits, stats.specials, stats.skill_casts
    );
    println!("Total XP earned: {}", stats.xp_gained);
    if stats.aborted > 0 {
        println!("Aborted sessions: {}", stats.aborted);
    }
    println!();

    println!("--- Items ---");
    let total: u64 = p.drops_by_rarity.iter().sum();
    println!("Total drops: {total}");
    for (i, count) in p.drops_by_rarity.iter().enumerate() {
        if *count > 0 {
            println!("  {}: {}", Rarity::from_tier(i as u32 + 1).name(), count);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = parse_args();
    let combat = match load_combat_config(config.config_path.as_deref()) {
        Ok(combat) => combat,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let (stats, shared) = run_simulation(&config, combat);
    print_summary(&stats, &shared, &config);
}
