//! Transaction signing with PEM-encoded Ed25519 private keys.
//!
//! The signing input is `SHA-256(utf8(canonical))`. The resulting
//! [`SignedTransaction`] owns the transaction, its canonical string, and
//! the signature, and exposes them read-only. It is deliberately not
//! `Clone`: submitting consumes it, so the same signed payload cannot be
//! sent twice by accident.

use thiserror::Error;

use super::encoding::EncodingError;
use super::types::Transaction;
use crate::crypto::hash::{canonical_digest, sha256_hex};
use crate::crypto::keys::{KeyError, WalletKeypair, WalletPublicKey};
use crate::crypto::signatures::{sign_digest, verify_digest, SignatureError};

/// Failure to produce a signature from a private key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignError {
    /// The key text could not be parsed into a private key.
    #[error("invalid private key: {0}")]
    InvalidKey(KeyError),

    /// The key parsed but could not be used to sign.
    #[error("signing failed: {reason}")]
    Signing { reason: String },
}

impl From<KeyError> for SignError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::KeypairMismatch => SignError::Signing {
                reason: err.to_string(),
            },
            other => SignError::InvalidKey(other),
        }
    }
}

impl From<SignatureError> for SignError {
    fn from(err: SignatureError) -> Self {
        SignError::Signing {
            reason: err.to_string(),
        }
    }
}

/// Anything that stops a transaction from being signed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("cannot encode transaction: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Sign(#[from] SignError),
}

/// Sign a canonical string with a PKCS#8 PEM private key.
///
/// Returns the raw 64-byte signature over the SHA-256 digest of
/// `canonical`. The key is parsed, used, and dropped; it is never logged.
pub fn sign(canonical: &str, private_key_pem: &str) -> Result<Vec<u8>, SignError> {
    let keypair = WalletKeypair::from_pem(private_key_pem)?;
    sign_with_keypair(canonical, &keypair)
}

/// Same as [`sign`] for an already parsed keypair.
pub fn sign_with_keypair(canonical: &str, keypair: &WalletKeypair) -> Result<Vec<u8>, SignError> {
    let digest = canonical_digest(canonical);
    Ok(sign_digest(keypair, &digest)?)
}

/// Verify a signature over `canonical` against a textual public key.
pub fn verify_signature(
    canonical: &str,
    public_key: &str,
    signature: &[u8],
) -> Result<(), SignatureError> {
    let public_key = WalletPublicKey::parse(public_key)?;
    verify_digest(&public_key, &canonical_digest(canonical), signature)
}

/// Encode and sign `tx`, consuming it.
pub fn sign_transaction(
    tx: Transaction,
    private_key_pem: &str,
) -> Result<SignedTransaction, TransactionError> {
    let canonical = tx.canonical()?;
    let signature = sign(&canonical, private_key_pem)?;
    tracing::debug!(
        sender = %tx.sender,
        payee = %tx.payee,
        amount = tx.amount,
        canonical_len = canonical.len(),
        payload = %sha256_hex(canonical.as_bytes()),
        "transaction signed"
    );
    Ok(SignedTransaction {
        transaction: tx,
        canonical,
        signature,
    })
}

/// A transaction together with its canonical form and signature.
#[derive(Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: Transaction,
    canonical: String,
    signature: Vec<u8>,
}

impl SignedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// The exact string that was hashed and signed.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Raw signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Signature as lowercase hex, the form sent on the wire.
    pub fn signature_hex(&self) -> String {
        hex::encode(&self.signature)
    }

    /// Check the signature against the transaction's own `senderPublicKey`.
    pub fn verify(&self) -> Result<(), SignatureError> {
        verify_signature(
            &self.canonical,
            &self.transaction.sender_public_key,
            &self.signature,
        )
    }
}
