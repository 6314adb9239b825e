//! Dungeon mode: a continuous physics boss fight against a hard time limit.

pub mod logic;
pub mod physics;
pub mod types;

pub use logic::*;
pub use physics::*;
pub use types::*;
