//! Player-side view of the external progression system.

pub mod player;
pub mod stats;

pub use player::*;
pub use stats::*;
