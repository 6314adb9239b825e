// Tick and timing
pub const FRAME_MS: u64 = 16; // ~60 FPS for the physics loop
pub const PLAYER_STRIKE_INTERVAL_MS: u64 = 600;
pub const ENEMY_STRIKE_INTERVAL_MS: u64 = 900;
pub const COUNTDOWN_TICK_MS: u64 = 1000;

// Stage battle intro ("READY?" then "FIGHT!")
pub const READY_ANNOUNCE_MS: u64 = 1000;
pub const FIGHT_ANNOUNCE_MS: u64 = 600;

// Special move cinematic
pub const SPECIAL_WINDUP_MS: u64 = 1200;
pub const SPECIAL_RECOVER_MS: u64 = 800;
pub const DEFEAT_ANIMATION_MS: u64 = 800;

// Stage transitions
pub const AUTO_ADVANCE_SECONDS: u32 = 3;
pub const AUTO_RESTART_SECONDS: u32 = 5;

// Upper bounds for configured timings
pub const MAX_CONFIG_DELAY_MS: u64 = 3_600_000;
pub const MAX_CONFIG_SECONDS: u32 = 3_600;
pub const STAGES_PER_WORLD: u32 = 20;
pub const MAX_WORLD: u32 = 10;

// Charge
pub const CHARGE_MAX: u32 = 100;
pub const CHARGE_PER_STRIKE: u32 = 12;
pub const CHARGE_PER_SOUL_LEVEL: f64 = 0.5;

// Combat math
pub const STRIKE_VARIANCE_MIN: f64 = 0.7;
pub const STRIKE_VARIANCE_MAX: f64 = 1.3;
pub const AMBUSH_CHANCE: f64 = 0.2;
pub const AMBUSH_MULTIPLIER: f64 = 1.5;
pub const DUNGEON_VARIANCE_MIN: f64 = 0.9;
pub const DUNGEON_VARIANCE_MAX: f64 = 1.1;
pub const DUNGEON_BASE_CRIT_CHANCE: f64 = 0.1;
pub const DUNGEON_CRIT_PER_RANK: f64 = 0.05;
pub const DUNGEON_CRIT_MULTIPLIER: f64 = 2.0;
pub const SPECIAL_POWER_MULTIPLIER: f64 = 6.0;
pub const SPECIAL_SOUL_BONUS: f64 = 0.1;

// Rewards
pub const WIN_XP_PER_STAGE_WORLD: u64 = 100;
pub const WIN_COINS: u64 = 50;
pub const MAX_VICTORY_DROPS: u32 = 3;
pub const MAX_DROP_RARITY: u32 = 6;
pub const DUNGEON_XP_PER_BOSS_LEVEL: u64 = 250;
pub const DUNGEON_COINS_PER_BOSS_LEVEL: u64 = 40;
pub const DUNGEON_LEVELS_PER_RARITY: u32 = 10;

// Stage enemy base stats and scaling
pub const ENEMY_BASE_HP: f64 = 250.0;
pub const ENEMY_BASE_ATTACK: f64 = 18.0;
pub const ENEMY_STAGE_GROWTH: f64 = 0.12;
pub const ENEMY_WORLD_GROWTH: f64 = 2.2;
// Boss multipliers: (hp_mult, atk_mult)
pub const STAGE_BOSS_MULTIPLIERS: (f64, f64) = (3.0, 1.5);
pub const DUNGEON_BOSS_BASE_HP: f64 = 2000.0;
pub const DUNGEON_BOSS_BASE_ATTACK: f64 = 40.0;
pub const DUNGEON_BOSS_HP_GROWTH: f64 = 0.25;
pub const DUNGEON_BOSS_ATTACK_GROWTH: f64 = 0.15;

// Skills: unlock levels
pub const CLEAVE_UNLOCK_LEVEL: u32 = 30;
pub const MEND_UNLOCK_LEVEL: u32 = 50;
pub const CATACLYSM_UNLOCK_LEVEL: u32 = 70;
// Skills: (base cooldown ms, cooldown step ms, cooldown floor ms)
pub const CLEAVE_COOLDOWN: (u64, u64, u64) = (12_000, 500, 4_000);
pub const MEND_COOLDOWN: (u64, u64, u64) = (20_000, 1_000, 8_000);
pub const CATACLYSM_COOLDOWN: (u64, u64, u64) = (45_000, 2_000, 20_000);
pub const SKILL_BASE_XP_TO_NEXT: u64 = 100;
pub const SKILL_XP_GROWTH: f64 = 1.25;
pub const SKILL_XP_PER_CAST: u64 = 10;
pub const MEND_HP_THRESHOLD: f64 = 0.6;

// Dungeon
pub const DUNGEON_TIME_LIMIT_SECONDS: u32 = 90;
pub const DUNGEON_SKILL_TICK_MS: u64 = 1000;
pub const DUNGEON_RESULT_DELAY_MS: u64 = 1000;

// Dungeon physics (arena coordinates are percentages, 0..100)
pub const ARENA_MIN: f64 = 0.0;
pub const ARENA_MAX: f64 = 100.0;
pub const MAGNET_FORCE: f64 = 0.035;
pub const BOSS_REPEL_FORCE: f64 = 0.02;
pub const STUN_MAGNET_MULTIPLIER: f64 = 4.0;
pub const FRICTION: f64 = 0.94;
pub const WALL_RESTITUTION: f64 = 0.8;
pub const CONTACT_DISTANCE: f64 = 8.0;
pub const HIT_COOLDOWN_FRAMES: u32 = 30;
pub const BOUNCE_FORCE: f64 = 0.6;
pub const CRIT_BOUNCE_MULTIPLIER: f64 = 15.0;
pub const STUN_FRAMES: u32 = 45;
pub const SHAKE_SPEED_THRESHOLD: f64 = 2.0;
pub const PLAYER_START: (f64, f64) = (20.0, 50.0);
pub const BOSS_START: (f64, f64) = (80.0, 50.0);
