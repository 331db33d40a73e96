//! Commitment keys, digests, and the keyed schemes that bind a secret number.

use super::SecureDraw;
use crate::error::{FairDiceError, Result};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of a commitment key in bytes (256 bits)
pub const KEY_LEN: usize = 32;

/// Length of a commitment digest in bytes
pub const DIGEST_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Secret key for one commitment, withheld until reveal
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitmentKey(#[serde(with = "hex_bytes")] [u8; KEY_LEN]);

impl CommitmentKey {
    /// Generate a fresh key from a secure source
    pub fn generate<R: SecureDraw + ?Sized>(source: &mut R) -> Result<Self> {
        let mut bytes = [0u8; KEY_LEN];
        source.fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for CommitmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitmentKey({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for CommitmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for CommitmentKey {
    type Err = FairDiceError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(decode_hex(s)?))
    }
}

/// Published digest binding a secret number under a key
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(#[serde(with = "hex_bytes")] [u8; DIGEST_LEN]);

impl Commitment {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Commitment {
    type Err = FairDiceError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(decode_hex(s)?))
    }
}

fn decode_hex<const N: usize>(s: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(s.trim())
        .map_err(|e| FairDiceError::InvalidArgument(format!("invalid hex: {e}")))?;
    bytes.as_slice().try_into().map_err(|_| {
        FairDiceError::InvalidArgument(format!("expected {N} bytes, got {}", bytes.len()))
    })
}

/// Fixed-width encoding of the committed number
pub fn encode_message(message: u32) -> [u8; 4] {
    message.to_le_bytes()
}

/// Binding, hiding commitment to a secret number
///
/// Verification recomputes the digest from the revealed key and message, so any
/// observer holding the published commitment can audit a reveal.
pub trait CommitmentScheme {
    /// Compute the digest of `message` under `key`
    fn commit(&self, key: &CommitmentKey, message: u32) -> Result<Commitment>;

    /// Check that `key` and `message` open `commitment`
    fn verify(&self, commitment: &Commitment, key: &CommitmentKey, message: u32) -> bool {
        matches!(self.commit(key, message), Ok(expected) if expected == *commitment)
    }
}

/// HMAC-SHA256 over the 4-byte little-endian message
#[derive(Clone, Copy, Debug, Default)]
pub struct HmacSha256Scheme;

impl HmacSha256Scheme {
    fn mac(key: &CommitmentKey, message: u32) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| FairDiceError::Commitment(e.to_string()))?;
        mac.update(&encode_message(message));
        Ok(mac)
    }
}

impl CommitmentScheme for HmacSha256Scheme {
    fn commit(&self, key: &CommitmentKey, message: u32) -> Result<Commitment> {
        let digest = Self::mac(key, message)?.finalize().into_bytes();
        Ok(Commitment(digest.into()))
    }

    fn verify(&self, commitment: &Commitment, key: &CommitmentKey, message: u32) -> bool {
        // verify_slice compares in constant time
        match Self::mac(key, message) {
            Ok(mac) => mac.verify_slice(commitment.as_bytes()).is_ok(),
            Err(_) => false,
        }
    }
}

/// Commitment = SHA256(message || key)
#[derive(Clone, Copy, Debug, Default)]
pub struct SaltedSha256Scheme;

impl CommitmentScheme for SaltedSha256Scheme {
    fn commit(&self, key: &CommitmentKey, message: u32) -> Result<Commitment> {
        let mut hasher = Sha256::new();
        hasher.update(encode_message(message));
        hasher.update(key.as_bytes());
        Ok(Commitment(hasher.finalize().into()))
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        s: S,
    ) -> Result<S::Ok, S::Error> {
        hex::encode(bytes).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        d: D,
    ) -> Result<[u8; N], D::Error> {
        let hex_str = String::deserialize(d)?;
        let bytes = hex::decode(&hex_str).map_err(serde::de::Error::custom)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::custom(format!("expected {N} bytes")))
    }
}
