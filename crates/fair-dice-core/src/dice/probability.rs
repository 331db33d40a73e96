//! Exact win probabilities between dice.
//!
//! Every face of one die is paired with every face of the other, so the
//! numbers are expectations over a fair roll of each, not estimates.

use super::Die;
use serde::{Deserialize, Serialize};

/// Exact tally of face pairings between two dice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinCount {
    pub wins: u64,
    pub ties: u64,
    pub losses: u64,
}

impl WinCount {
    /// Count pairings where `a` shows a higher, equal, or lower face than `b`
    pub fn between(a: &Die, b: &Die) -> Self {
        let mut count = Self {
            wins: 0,
            ties: 0,
            losses: 0,
        };
        for fa in a.faces() {
            for fb in b.faces() {
                match fa.cmp(fb) {
                    std::cmp::Ordering::Greater => count.wins += 1,
                    std::cmp::Ordering::Equal => count.ties += 1,
                    std::cmp::Ordering::Less => count.losses += 1,
                }
            }
        }
        count
    }

    pub fn total(&self) -> u64 {
        self.wins + self.ties + self.losses
    }

    pub fn win_probability(&self) -> f64 {
        self.wins as f64 / self.total() as f64
    }

    pub fn tie_fraction(&self) -> f64 {
        self.ties as f64 / self.total() as f64
    }

    pub fn loss_probability(&self) -> f64 {
        self.losses as f64 / self.total() as f64
    }

    /// The same tally seen from the other die
    pub fn reversed(&self) -> Self {
        Self {
            wins: self.losses,
            ties: self.ties,
            losses: self.wins,
        }
    }
}

/// Probability that `a` rolls strictly higher than `b`
pub fn win_probability(a: &Die, b: &Die) -> f64 {
    WinCount::between(a, b).win_probability()
}

/// Probability that `a` and `b` roll the same face value
pub fn tie_fraction(a: &Die, b: &Die) -> f64 {
    WinCount::between(a, b).tie_fraction()
}

/// Pairwise win probabilities for a set of dice
///
/// Cell `(i, j)` is the probability that die `i` beats die `j`. The diagonal
/// is `None`: a die is never matched against itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProbabilityTable {
    dice: Vec<Die>,
    probabilities: Vec<Vec<Option<f64>>>,
}

impl ProbabilityTable {
    pub fn build(dice: &[Die]) -> Self {
        let probabilities = dice
            .iter()
            .enumerate()
            .map(|(i, a)| {
                dice.iter()
                    .enumerate()
                    .map(|(j, b)| (i != j).then(|| win_probability(a, b)))
                    .collect()
            })
            .collect();

        Self {
            dice: dice.to_vec(),
            probabilities,
        }
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    /// Number of dice (rows and columns)
    pub fn size(&self) -> usize {
        self.dice.len()
    }

    /// Probability that die `i` beats die `j`; `None` on the diagonal or out of bounds
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.probabilities.get(i)?.get(j).copied().flatten()
    }

    /// Exact tally behind cell `(i, j)`
    pub fn count(&self, i: usize, j: usize) -> Option<WinCount> {
        if i == j {
            return None;
        }
        Some(WinCount::between(self.dice.get(i)?, self.dice.get(j)?))
    }

    /// Die `i` wins against die `j` more often than it loses
    pub fn beats(&self, i: usize, j: usize) -> bool {
        match (self.get(i, j), self.get(j, i)) {
            (Some(win), Some(loss)) => win > loss,
            _ => false,
        }
    }

    /// Die with the best chance of beating die `j`
    pub fn best_counter(&self, j: usize) -> Option<usize> {
        (0..self.size())
            .filter_map(|i| self.get(i, j).map(|p| (i, p)))
            .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((i, p)),
            })
            .map(|(i, _)| i)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.probabilities.iter().map(Vec::as_slice)
    }
}
