//! Stage mode: timed strike exchanges against one enemy per stage.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
