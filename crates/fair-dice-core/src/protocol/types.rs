//! Protocol types.

use crate::crypto::{Commitment, CommitmentKey, CommitmentScheme};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of one commit-reveal exchange
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(Uuid);

impl ExchangeId {
    /// Create a new random exchange ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExchangeId({})", self.0)
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one exchange
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Secret drawn and bound, digest not yet published
    Committed,
    /// Digest published, waiting for the counterpart's value
    Awaiting,
    /// Key and secret published
    Revealed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Committed => "committed",
            Phase::Awaiting => "awaiting",
            Phase::Revealed => "revealed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Published at commit time, before the counterpart chooses
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub exchange_id: ExchangeId,
    /// Number of possible outcomes; every value lies in `0..range_size`
    pub range_size: u64,
    pub commitment: Commitment,
}

impl Announcement {
    /// Largest value either side may contribute
    pub fn range_max(&self) -> u64 {
        self.range_size.saturating_sub(1)
    }
}

/// Published at reveal time so anyone can audit the exchange
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub exchange_id: ExchangeId,
    pub range_size: u64,
    pub commitment: Commitment,
    pub key: CommitmentKey,
    /// The committer's value, fixed before the contribution was known
    pub secret: u32,
    /// The counterpart's value
    pub contribution: u32,
    /// `(secret + contribution) mod range_size`
    pub result: u32,
}

impl Reveal {
    /// Check that the key opens the commitment to `secret` and that `result`
    /// combines both values
    pub fn verify<C: CommitmentScheme + ?Sized>(&self, scheme: &C) -> bool {
        u64::from(self.secret) < self.range_size
            && u64::from(self.contribution) < self.range_size
            && scheme.verify(&self.commitment, &self.key, self.secret)
            && super::combine(self.secret, self.contribution, self.range_size) == Some(self.result)
    }
}
