//! Victory drops handed to the inventory collaborator.

pub mod drops;
pub mod types;

pub use drops::*;
pub use types::*;
