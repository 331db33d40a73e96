//! Uniform integer draws from a cryptographically secure source.

use crate::error::{FairDiceError, Result};
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

/// Capability to draw secure random values
///
/// Production code uses [`OsRandomSource`]. Tests inject a
/// [`SeededRandomSource`] so protocol runs are reproducible.
pub trait SecureDraw {
    /// Fill `dest` with random bytes
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<()>;

    /// Draw a uniform integer in `[0, exclusive_max)`
    ///
    /// Draws just enough bytes to cover the smallest power-of-two mask that
    /// spans the range, then rejects masked values at or above the bound.
    fn next(&mut self, exclusive_max: u64) -> Result<u64> {
        if exclusive_max == 0 {
            return Err(FairDiceError::InvalidArgument(
                "exclusive maximum of a random draw must be positive".to_string(),
            ));
        }

        let mask = range_mask(exclusive_max);
        let width = byte_width(mask);
        let mut buf = [0u8; 8];
        loop {
            self.fill_bytes(&mut buf[..width])?;
            let candidate = u64::from_le_bytes(buf) & mask;
            if candidate < exclusive_max {
                return Ok(candidate);
            }
        }
    }

    /// Draw `len` random bytes
    fn random_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.fill_bytes(&mut bytes)?;
        Ok(bytes)
    }
}

impl<T: SecureDraw + ?Sized> SecureDraw for &mut T {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        (**self).fill_bytes(dest)
    }
}

/// Smallest `2^k - 1` such that `2^k >= exclusive_max`
fn range_mask(exclusive_max: u64) -> u64 {
    exclusive_max
        .checked_next_power_of_two()
        .map(|p| p - 1)
        .unwrap_or(u64::MAX)
}

/// Number of bytes needed to fill every bit of `mask`
fn byte_width(mask: u64) -> usize {
    ((u64::BITS - mask.leading_zeros()) as usize + 7) / 8
}

/// Operating system CSPRNG
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandomSource;

impl OsRandomSource {
    pub fn new() -> Self {
        Self
    }
}

impl SecureDraw for OsRandomSource {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| FairDiceError::Entropy(e.to_string()))
    }
}

/// Deterministic source for tests and replays
///
/// Same seed, same sequence. Never use it where the counterpart could learn
/// the seed.
#[derive(Clone, Debug)]
pub struct SeededRandomSource(StdRng);

impl SeededRandomSource {
    /// Create a source from a 64-bit seed
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl SecureDraw for SeededRandomSource {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        self.0.fill_bytes(dest);
        Ok(())
    }
}
