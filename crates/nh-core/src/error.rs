//! Error types for NetHeist

use thiserror::Error;

/// Core error type
///
/// All resolver-level failures are detected before any mutation is issued;
/// once a store update has been issued, a failure of that call surfaces as
/// `System` and the request fails without retrying with different randomness.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Insufficient funds: need {needed} credits, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("System error: {0}")]
    System(String),
}

/// Result type alias
pub type GameResult<T> = Result<T, GameError>;
