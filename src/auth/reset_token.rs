//! Single-use password reset tokens
//!
//! The raw token only ever travels inside the emailed link. The user record
//! keeps its SHA-256 digest and an expiry.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    /// Hex-encoded random value sent to the user.
    pub raw: String,
    /// Hex-encoded SHA-256 of `raw`, stored on the user.
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Generate a fresh reset token valid for `ttl_mins` minutes.
pub fn issue(ttl_mins: u64) -> IssuedResetToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);

    IssuedResetToken {
        hash: hash(&raw),
        raw,
        expires_at: Utc::now() + Duration::minutes(ttl_mins as i64),
    }
}

pub fn hash(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Compare a presented raw token against a stored digest.
pub fn matches(presented: &str, stored_hash: &str) -> bool {
    let candidate = hash(presented);
    // 等长比较，避免按字节提前返回
    candidate.len() == stored_hash.len()
        && candidate
            .bytes()
            .zip(stored_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
