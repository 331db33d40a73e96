//! Dice and the exact probabilities between them.

mod die;
mod probability;

pub use die::{DiceSet, Die};
pub use probability::{tie_fraction, win_probability, ProbabilityTable, WinCount};
