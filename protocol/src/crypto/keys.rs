//! # Key Management
//!
//! Ed25519 keypairs in portable textual encodings.
//!
//! Private keys travel as PKCS#8 PEM, which is what the key-provisioning
//! endpoint hands out and what the `keygen` command writes. Public keys are
//! accepted either as 64 hex characters or as SPKI PEM, because both forms
//! show up in the transaction's `senderPublicKey` field.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (ed25519-dalek does this for us).
//! - Key bytes are never logged and [`WalletKeypair`] has no `Serialize`.
//!   Exporting a secret is always an explicit call to [`WalletKeypair::to_pem`].

use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, KeypairBytes,
};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use crate::config::PUBLIC_KEY_LENGTH;

const PUBLIC_KEY_PEM_LABEL: &str = "-----BEGIN PUBLIC KEY-----";

/// Errors that can occur while parsing or exporting key material.
///
/// Messages never echo the offending input. A half-pasted private key in
/// an error log is still a leaked private key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid private key: not a PKCS#8 PEM encoded Ed25519 key")]
    InvalidPrivateKey,

    #[error("invalid public key: expected 64 hex characters or SPKI PEM")]
    InvalidPublicKey,

    #[error("keypair validation failed: embedded public key does not match secret key")]
    KeypairMismatch,

    #[error("key export failed")]
    ExportFailed,
}

/// A wallet signing keypair.
///
/// # Examples
///
/// ```
/// use shardpay_protocol::crypto::keys::WalletKeypair;
///
/// let kp = WalletKeypair::generate();
/// let pem = kp.to_pem().unwrap();
/// let restored = WalletKeypair::from_pem(&pem).unwrap();
/// assert_eq!(kp.public_key(), restored.public_key());
/// ```
pub struct WalletKeypair {
    signing_key: SigningKey,
}

/// The public half of a wallet keypair. Safe to share and log.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalletPublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl WalletKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair deterministically from a 32-byte seed. Test fixtures
    /// use this to get reproducible signatures.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse a PKCS#8 PEM private key.
    ///
    /// PKCS#8 v2 documents embed the public key next to the secret scalar.
    /// When they disagree the document still parses, but signing with it
    /// would produce signatures nobody can attribute, so it is refused with
    /// [`KeyError::KeypairMismatch`].
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let keypair_bytes =
            KeypairBytes::from_pkcs8_pem(pem.trim()).map_err(|_| KeyError::InvalidPrivateKey)?;
        let signing_key = SigningKey::from_bytes(&keypair_bytes.secret_key);

        if let Some(embedded) = keypair_bytes.public_key {
            if embedded.to_bytes() != signing_key.verifying_key().to_bytes() {
                return Err(KeyError::KeypairMismatch);
            }
        }

        Ok(Self { signing_key })
    }

    /// Export the private key as PKCS#8 PEM.
    pub fn to_pem(&self) -> Result<String, KeyError> {
        let pem = self
            .signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|_| KeyError::ExportFailed)?;
        Ok(pem.as_str().to_owned())
    }

    /// The public key matching this keypair.
    pub fn public_key(&self) -> WalletPublicKey {
        WalletPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for WalletKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletKeypair(pub={})", self.public_key().to_hex())
    }
}

impl WalletPublicKey {
    /// Wrap raw key bytes, rejecting points that are not valid Ed25519 keys.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes: *bytes })
    }

    /// Parse 64 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let decoded = hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidPublicKey)?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }

    /// Parse an SPKI PEM public key.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let key = VerifyingKey::from_public_key_pem(pem.trim())
            .map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self {
            bytes: key.to_bytes(),
        })
    }

    /// Parse either accepted textual form, picking by the PEM header.
    pub fn parse(text: &str) -> Result<Self, KeyError> {
        if text.trim_start().starts_with(PUBLIC_KEY_PEM_LABEL) {
            Self::from_pem(text)
        } else {
            Self::from_hex(text)
        }
    }

    /// Lowercase hex of the raw key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// SPKI PEM encoding.
    pub fn to_pem(&self) -> Result<String, KeyError> {
        self.verifying_key()?
            .to_public_key_pem(LineEnding::LF)
            .map_err(|_| KeyError::ExportFailed)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::from_bytes(&self.bytes).map_err(|_| KeyError::InvalidPublicKey)
    }
}

impl fmt::Debug for WalletPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletPublicKey({})", self.to_hex())
    }
}

impl fmt::Display for WalletPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
