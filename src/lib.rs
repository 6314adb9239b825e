//! Clash - Idle RPG Combat Engine
//!
//! Stage battles, the skill engine and the dungeon physics fight, driven by
//! a cooperative scheduler on simulated time.

pub mod arena;
pub mod character;
pub mod combat;
pub mod core;
pub mod dungeon;
pub mod items;
pub mod skills;
pub mod stage;
