//! Fair Dice Core Library
//!
//! This crate provides the commit-reveal protocol for fair two-party random
//! numbers, exact win probabilities between custom dice, and the game engine
//! for the non-transitive dice game built on both.

pub mod crypto;
pub mod dice;
pub mod error;
pub mod game;
pub mod protocol;

pub use crypto::{
    Commitment, CommitmentKey, CommitmentScheme, HmacSha256Scheme, OsRandomSource,
    SaltedSha256Scheme, SecureDraw, SeededRandomSource,
};
pub use dice::{DiceSet, Die, ProbabilityTable, WinCount};
pub use error::FairDiceError;
pub use game::{DiceGame, GameInteraction, GameReport, Outcome, Purpose, Side, MIN_GAME_DICE};
pub use protocol::{Announcement, Counterpart, ExchangeId, FairRandom, Phase, Reveal};

#[cfg(test)]
mod test_support;
