//! Combat math and the shared combatant shapes.

pub mod math;
pub mod types;

pub use math::*;
pub use types::*;
