//! The explicit session context handed to every engine call.
//!
//! Nothing in the core reaches for ambient global state: the player, the
//! skill book, collaborator hooks, the scheduler, the RNG and the event
//! outbox all live here.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, warn};

use crate::character::{Player, StatProvider};
use crate::core::config::CombatConfig;
use crate::core::events::{CombatEvent, RewardSummary, Side};
use crate::core::scheduler::Scheduler;
use crate::dungeon::DungeonTask;
use crate::items::Drop;
use crate::skills::SkillBook;
use crate::stage::StageTask;

/// Inventory collaborator. The core hands over drops and never looks back.
pub trait Inventory {
    fn add_drop(&mut self, drop: Drop);
}

/// Leveling collaborator. Owns xp curves and level-up math.
pub trait Leveling {
    fn add_xp(&mut self, xp: u64);
    fn add_coins(&mut self, coins: u64);
    fn check_level_up(&mut self);
}

/// Optional hooks into external systems. Absent hooks are skipped.
#[derive(Default)]
pub struct Collaborators {
    pub inventory: Option<Box<dyn Inventory>>,
    pub leveling: Option<Box<dyn Leveling>>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("inventory", &self.inventory.is_some())
            .field("leveling", &self.leveling.is_some())
            .finish()
    }
}

impl Collaborators {
    /// Hand a reward summary to whichever hooks are present.
    pub fn grant(&mut self, summary: &RewardSummary) {
        match self.leveling.as_mut() {
            Some(leveling) => {
                leveling.add_xp(summary.xp);
                leveling.add_coins(summary.coins);
                leveling.check_level_up();
            }
            None => warn!(
                xp = summary.xp,
                coins = summary.coins,
                "no leveling hook; rewards not granted"
            ),
        }
        if summary.drops.is_empty() {
            return;
        }
        match self.inventory.as_mut() {
            Some(inventory) => {
                for drop in &summary.drops {
                    inventory.add_drop(drop.clone());
                }
            }
            None => warn!(drops = summary.drops.len(), "no inventory hook; drops discarded"),
        }
    }
}

/// Every task either combat mode can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Stage(StageTask),
    Dungeon(DungeonTask),
}

pub struct CombatContext {
    pub player: Player,
    pub skills: SkillBook,
    pub config: CombatConfig,
    pub collaborators: Collaborators,
    pub scheduler: Scheduler<Task>,
    pub rng: Box<dyn RngCore>,
    events: Vec<CombatEvent>,
}

impl std::fmt::Debug for CombatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatContext")
            .field("player", &self.player)
            .field("now_ms", &self.scheduler.now())
            .field("pending_tasks", &self.scheduler.pending())
            .field("queued_events", &self.events.len())
            .finish()
    }
}

impl CombatContext {
    pub fn new(stats: Box<dyn StatProvider>, config: CombatConfig) -> Self {
        Self {
            player: Player::new(stats),
            skills: SkillBook::new(),
            config: config.normalized(),
            collaborators: Collaborators::default(),
            scheduler: Scheduler::new(),
            rng: Box::new(StdRng::from_entropy()),
            events: Vec::new(),
        }
    }

    /// Replace the RNG (seeded runs, tests).
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn with_skills(mut self, skills: SkillBook) -> Self {
        self.skills = skills;
        self
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn emit(&mut self, event: CombatEvent) {
        debug!(?event, "combat event");
        self.events.push(event);
    }

    pub fn emit_all(&mut self, events: impl IntoIterator<Item = CombatEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    pub fn emit_player_hp(&mut self) {
        let event = CombatEvent::HpChanged {
            side: Side::Player,
            hp: self.player.hp() as u64,
            max_hp: self.player.max_hp() as u64,
        };
        self.emit(event);
    }

    /// Events queued since the last drain, in emission order.
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::BasicStats;
    use crate::items::{EquipmentSlot, Rarity};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Ledger {
        xp: u64,
        coins: u64,
        level_checks: u32,
        drops: Vec<Drop>,
    }

    struct SharedLedger(Rc<RefCell<Ledger>>);

    impl Leveling for SharedLedger {
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

    impl Inventory for SharedLedger {
        fn add_drop(&mut self, drop: Drop) {
            self.0.borrow_mut().drops.push(drop);
        }
    }

    fn summary() -> RewardSummary {
        RewardSummary {
            xp: 100,
            coins: 50,
            drops: vec![Drop {
                slot: EquipmentSlot::Ring,
                rarity: Rarity::Common,
                source_tier: 1,
            }],
        }
    }

    #[test]
    fn test_grant_with_all_hooks() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let mut hooks = Collaborators {
            inventory: Some(Box::new(SharedLedger(ledger.clone()))),
            leveling: Some(Box::new(SharedLedger(ledger.clone()))),
        };
        hooks.grant(&summary());
        let ledger = ledger.borrow();
        assert_eq!(ledger.xp, 100);
        assert_eq!(ledger.coins, 50);
        assert_eq!(ledger.level_checks, 1);
        assert_eq!(ledger.drops.len(), 1);
    }

    #[test]
    fn test_grant_without_hooks_is_noop() {
        let mut hooks = Collaborators::default();
        hooks.grant(&summary());
    }

    #[test]
    fn test_drain_events_empties_outbox() {
        let mut ctx = CombatContext::new(Box::new(BasicStats::default()), CombatConfig::default());
        ctx.emit_player_hp();
        assert_eq!(ctx.events().len(), 1);
        let drained = ctx.drain_events();
        assert_eq!(
            drained,
            vec![CombatEvent::HpChanged {
                side: Side::Player,
                hp: 1000,
                max_hp: 1000
            }]
        );
        assert!(ctx.events().is_empty());
    }
}
