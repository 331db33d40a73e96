//! Error type shared by every fair-dice component.

use thiserror::Error;

/// Errors from randomness, commitment, protocol, and dice operations
#[derive(Debug, Error)]
pub enum FairDiceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Value {value} is out of range: expected 0..{range_size}")]
    OutOfRange { value: u64, range_size: u64 },

    #[error("Entropy source failure: {0}")]
    Entropy(String),

    #[error("Commitment failure: {0}")]
    Commitment(String),

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Game aborted")]
    Aborted,
}

pub type Result<T> = std::result::Result<T, FairDiceError>;
