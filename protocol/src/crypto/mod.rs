//! # Cryptographic Primitives
//!
//! Hashing, key handling, and signatures for the transaction signing path.
//! Everything here is a thin wrapper over `sha2` and `ed25519-dalek`; the
//! point of the wrappers is one place to audit and one set of error types.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{canonical_digest, sha256, sha256_hex};
pub use keys::{KeyError, WalletKeypair, WalletPublicKey};
pub use signatures::{sign_digest, verify_digest, SignatureError};
