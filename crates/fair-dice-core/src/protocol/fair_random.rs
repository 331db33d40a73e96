//! One commit-reveal exchange combined with the counterpart's value.
//!
//! The committer draws a secret `x`, binds it under a fresh key, and publishes
//! the digest before asking the counterpart for `y`. The shared result is
//! `(x + y) mod range_size`, which stays uniform as long as either side draws
//! uniformly.

use super::types::{Announcement, ExchangeId, Phase, Reveal};
use crate::crypto::{Commitment, CommitmentKey, CommitmentScheme, HmacSha256Scheme, SecureDraw};
use crate::error::{FairDiceError, Result};
use std::fmt;
use tracing::{debug, info};

/// Combine both contributions into the shared result
///
/// Returns `None` when `range_size` is outside `1..=2^32`, which can only
/// happen for a reveal that did not come from [`FairRandom`].
pub fn combine(secret: u32, contribution: u32, range_size: u64) -> Option<u32> {
    if range_size == 0 || range_size > 1 << 32 {
        return None;
    }
    u32::try_from((u64::from(secret) + u64::from(contribution)) % range_size).ok()
}

/// Check a counterpart value before it enters an exchange
pub fn validate_contribution(value: u64, range_size: u64) -> Result<u32> {
    if value >= range_size {
        return Err(FairDiceError::OutOfRange { value, range_size });
    }
    u32::try_from(value).map_err(|_| FairDiceError::OutOfRange { value, range_size })
}

/// Audit a reveal against the announcement published earlier
pub fn verify_reveal<C: CommitmentScheme + ?Sized>(
    scheme: &C,
    announcement: &Announcement,
    reveal: &Reveal,
) -> bool {
    announcement.exchange_id == reveal.exchange_id
        && announcement.range_size == reveal.range_size
        && announcement.commitment == reveal.commitment
        && reveal.verify(scheme)
}

/// The other side of an exchange
///
/// `contribute` is the only blocking point of the protocol: it runs after the
/// commitment is published and before anything secret is revealed.
pub trait Counterpart {
    /// Choose a value in `0..announcement.range_size`
    fn contribute(&mut self, announcement: &Announcement) -> Result<u32>;

    /// Called once the exchange is revealed
    fn observe_reveal(&mut self, _reveal: &Reveal) -> Result<()> {
        Ok(())
    }
}

impl<F> Counterpart for F
where
    F: FnMut(&Announcement) -> Result<u32>,
{
    fn contribute(&mut self, announcement: &Announcement) -> Result<u32> {
        self(announcement)
    }
}

/// Runs commit-reveal exchanges with an injected source and scheme
pub struct FairRandom<R, C = HmacSha256Scheme> {
    source: R,
    scheme: C,
}

impl<R: SecureDraw, C: CommitmentScheme> FairRandom<R, C> {
    pub fn new(source: R, scheme: C) -> Self {
        Self { source, scheme }
    }

    pub fn scheme(&self) -> &C {
        &self.scheme
    }

    /// Access the random source for draws outside an exchange
    pub fn source_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Draw and bind a secret in `0..=range_max`
    pub fn commit(&mut self, range_max: u32) -> Result<CommittedRound> {
        let range_size = u64::from(range_max) + 1;
        let drawn = self.source.next(range_size)?;
        let secret = u32::try_from(drawn).map_err(|_| {
            FairDiceError::Entropy(format!("drew {drawn} outside 0..{range_size}"))
        })?;
        let key = CommitmentKey::generate(&mut self.source)?;
        let commitment = self.scheme.commit(&key, secret)?;

        Ok(CommittedRound {
            exchange_id: ExchangeId::new(),
            range_size,
            secret,
            key,
            commitment,
        })
    }

    /// Run one full exchange against `counterpart`
    pub fn execute<P: Counterpart + ?Sized>(
        &mut self,
        range_max: u32,
        counterpart: &mut P,
    ) -> Result<Reveal> {
        let (announcement, round) = self.commit(range_max)?.publish();
        let contribution = counterpart.contribute(&announcement)?;
        let reveal = round.reveal(contribution)?;
        counterpart.observe_reveal(&reveal)?;
        Ok(reveal)
    }
}

/// Secret drawn and bound; nothing published yet
pub struct CommittedRound {
    exchange_id: ExchangeId,
    range_size: u64,
    secret: u32,
    key: CommitmentKey,
    commitment: Commitment,
}

impl CommittedRound {
    pub fn phase(&self) -> Phase {
        Phase::Committed
    }

    pub fn exchange_id(&self) -> ExchangeId {
        self.exchange_id
    }

    /// Publish the digest and start waiting for the counterpart
    pub fn publish(self) -> (Announcement, AwaitingRound) {
        let announcement = Announcement {
            exchange_id: self.exchange_id,
            range_size: self.range_size,
            commitment: self.commitment,
        };
        debug!(
            "Exchange {} published commitment {} over {} outcomes",
            self.exchange_id, self.commitment, self.range_size
        );

        (announcement, AwaitingRound { inner: self })
    }
}

impl fmt::Debug for CommittedRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommittedRound")
            .field("exchange_id", &self.exchange_id)
            .field("range_size", &self.range_size)
            .field("commitment", &self.commitment)
            .finish_non_exhaustive()
    }
}

/// Digest published; the secret stays hidden until [`AwaitingRound::reveal`]
///
/// Revealing consumes the round, so a round cannot be revealed twice:
///
/// ```compile_fail
/// use fair_dice_core::{FairRandom, HmacSha256Scheme, SeededRandomSource};
///
/// let mut fair = FairRandom::new(SeededRandomSource::new(1), HmacSha256Scheme);
/// let (_announcement, round) = fair.commit(5).unwrap().publish();
/// let first = round.reveal(1).unwrap();
/// let second = round.reveal(2).unwrap();
/// ```
pub struct AwaitingRound {
    inner: CommittedRound,
}

impl AwaitingRound {
    pub fn phase(&self) -> Phase {
        Phase::Awaiting
    }

    pub fn exchange_id(&self) -> ExchangeId {
        self.inner.exchange_id
    }

    pub fn range_size(&self) -> u64 {
        self.inner.range_size
    }

    /// Bind the counterpart's value, combine, and open the commitment
    pub fn reveal(self, contribution: u32) -> Result<Reveal> {
        let CommittedRound {
            exchange_id,
            range_size,
            secret,
            key,
            commitment,
        } = self.inner;
        let contribution = validate_contribution(u64::from(contribution), range_size)?;
        let Some(result) = combine(secret, contribution, range_size) else {
            return Err(FairDiceError::OutOfRange {
                value: u64::from(contribution),
                range_size,
            });
        };

        info!(
            "Exchange {} revealed: secret {} + contribution {} mod {} = {}",
            exchange_id, secret, contribution, range_size, result
        );

        Ok(Reveal {
            exchange_id,
            range_size,
            commitment,
            key,
            secret,
            contribution,
            result,
        })
    }
}

impl fmt::Debug for AwaitingRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwaitingRound")
            .field("round", &self.inner)
            .finish()
    }
}
