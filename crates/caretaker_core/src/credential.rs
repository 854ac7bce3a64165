//! Salted credential hashing.
//!
//! # Responsibility
//! - Derive and verify salted password digests.
//!
//! # Invariants
//! - Plaintext passwords are never persisted or logged.
//! - Every account gets a fresh random salt; equal passwords produce
//!   different digests across accounts.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_BYTES: usize = 16;

/// Generates a fresh hex-encoded random salt.
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    hex::encode(salt)
}

/// Derives the hex-encoded salted SHA-256 digest of `password`.
pub fn hash_password(password: &str, salt_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies `password` against a stored salt/digest pair.
///
/// Comparison is constant-time over the digest length to avoid leaking a
/// prefix-match signal.
pub fn verify_password(password: &str, salt_hex: &str, expected_hash: &str) -> bool {
    let computed = hash_password(password, salt_hex);
    if computed.len() != expected_hash.len() {
        return false;
    }
    computed
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
