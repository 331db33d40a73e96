//! Fair random protocol: commit, await the counterpart, reveal.

mod fair_random;
mod types;

pub use fair_random::{
    combine, validate_contribution, verify_reveal, AwaitingRound, CommittedRound, Counterpart,
    FairRandom,
};
pub use types::{Announcement, ExchangeId, Phase, Reveal};
