use thiserror::Error;

/// Errors surfaced by the combat core.
///
/// None of these are fatal to the process. Invariant violations abort only
/// the session that hit them.
#[derive(Debug, Error)]
pub enum CombatError {
    #[error("dungeon session resolved without a boss")]
    MissingBoss,

    #[error("invalid combat config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
