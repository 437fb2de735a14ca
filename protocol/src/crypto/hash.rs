//! # Hashing Utilities
//!
//! SHA-256 is the only digest in the signing path. The signer never sees
//! the canonical string itself, only its 32-byte digest, so every party
//! that wants to check a signature has to hash the exact same UTF-8 bytes.

use sha2::{Digest, Sha256};

use crate::config::DIGEST_LENGTH;

/// Compute the SHA-256 digest of `data` as a fixed-size array.
///
/// # Example
///
/// ```
/// use shardpay_protocol::crypto::sha256;
///
/// let digest = sha256(b"10:alice:ab01:bob");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; DIGEST_LENGTH];
    output.copy_from_slice(&result);
    output
}

/// Digest of a canonical transaction string, hashed as UTF-8.
pub fn canonical_digest(canonical: &str) -> [u8; DIGEST_LENGTH] {
    sha256(canonical.as_bytes())
}

/// Hex-encoded SHA-256, for log correlation of submitted payloads.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
