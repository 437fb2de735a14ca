//! # Digital Signatures
//!
//! Ed25519 over the SHA-256 digest of a canonical transaction.
//!
//! Signing the digest rather than the raw string keeps the signed message
//! a fixed 32 bytes whatever the transaction looks like, and matches what
//! the validator network recomputes on its side.
//!
//! Verification uses `verify_strict`, which rejects the small-order and
//! non-canonical edge cases that lenient implementations let through.

use ed25519_dalek::{Signature as DalekSignature, Signer};
use thiserror::Error;

use super::keys::{KeyError, WalletKeypair, WalletPublicKey};
use crate::config::{DIGEST_LENGTH, SIGNATURE_LENGTH};

/// Errors during signature operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signing failed: {reason}")]
    SigningFailed { reason: String },

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid signature bytes: expected 64 bytes")]
    InvalidSignatureBytes,

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Sign a 32-byte digest.
///
/// Ed25519 is deterministic: the same key and digest always yield the same
/// 64 bytes.
pub fn sign_digest(
    keypair: &WalletKeypair,
    digest: &[u8; DIGEST_LENGTH],
) -> Result<Vec<u8>, SignatureError> {
    let signature = keypair
        .signing_key()
        .try_sign(digest)
        .map_err(|e| SignatureError::SigningFailed {
            reason: e.to_string(),
        })?;
    Ok(signature.to_bytes().to_vec())
}

/// Verify a signature over a 32-byte digest.
pub fn verify_digest(
    public_key: &WalletPublicKey,
    digest: &[u8; DIGEST_LENGTH],
    signature: &[u8],
) -> Result<(), SignatureError> {
    let signature =
        DalekSignature::from_slice(signature).map_err(|_| SignatureError::InvalidSignatureBytes)?;
    public_key
        .verifying_key()?
        .verify_strict(digest, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256;

    #[test]
    fn test_sign_and_verify() {
        let kp = WalletKeypair::generate();
        let digest = sha256(b"10:alice:k:bob");
        let sig = sign_digest(&kp, &digest).unwrap();
        assert_eq!(sig.len(), SIGNATURE_LENGTH);
        assert!(verify_digest(&kp.public_key(), &digest, &sig).is_ok());
    }

    #[test]
    fn test_deterministic_signatures() {
        let kp = WalletKeypair::from_seed(&[3u8; 32]);
        let digest = sha256(b"same message");
        assert_eq!(
            sign_digest(&kp, &digest).unwrap(),
            sign_digest(&kp, &digest).unwrap()
        );
    }

    #[test]
    fn test_wrong_digest_fails() {
        let kp = WalletKeypair::generate();
        let sig = sign_digest(&kp, &sha256(b"pay bob 10")).unwrap();
        assert_eq!(
            verify_digest(&kp.public_key(), &sha256(b"pay bob 100"), &sig),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let kp1 = WalletKeypair::generate();
        let kp2 = WalletKeypair::generate();
        let digest = sha256(b"msg");
        let sig = sign_digest(&kp1, &digest).unwrap();
        assert!(verify_digest(&kp2.public_key(), &digest, &sig).is_err());
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let kp = WalletKeypair::generate();
        let digest = sha256(b"msg");
        let sig = sign_digest(&kp, &digest).unwrap();
        assert_eq!(
            verify_digest(&kp.public_key(), &digest, &sig[..63]),
            Err(SignatureError::InvalidSignatureBytes)
        );
    }
}
