//! Skill cooldowns, experience and the auto-battle skill tick.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
