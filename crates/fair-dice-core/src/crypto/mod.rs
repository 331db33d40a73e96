//! Cryptographic primitives for fair dice.
//!
//! This module provides:
//! - SecureDraw and its OS-backed and seeded sources
//! - CommitmentKey and Commitment for the commit-reveal scheme
//! - CommitmentScheme with HMAC-SHA256 and salted SHA-256 implementations

mod commitment;
mod random;

pub use commitment::{
    encode_message, Commitment, CommitmentKey, CommitmentScheme, HmacSha256Scheme,
    SaltedSha256Scheme, DIGEST_LEN, KEY_LEN,
};
pub use random::{OsRandomSource, SecureDraw, SeededRandomSource};
