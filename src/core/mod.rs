//! Core runtime pieces shared by every combat mode.

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod events;
pub mod latch;
pub mod scheduler;

pub use config::*;
pub use context::*;
pub use error::*;
pub use events::*;
pub use latch::*;
pub use scheduler::*;
