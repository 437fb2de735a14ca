//! Core transaction value type.
//!
//! A [`Transaction`] is built fresh from the caller's form for every
//! submission. Once signed it is moved into a
//! [`SignedTransaction`](super::signing::SignedTransaction) and cannot be
//! touched again; changing a field means building and signing a new one.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::encoding::{self, EncodingError};

/// A transfer of `amount` minor currency units from `sender` to `payee`.
///
/// # Examples
///
/// ```
/// use shardpay_protocol::transaction::Transaction;
///
/// let tx = Transaction::transfer(250, "alice", "ab01", "bob");
/// assert_eq!(tx.canonical().unwrap(), "250:alice:ab01:bob");
///
/// let tx = tx.with_nonce(3);
/// assert_eq!(tx.canonical().unwrap(), "250:alice:ab01:bob:3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Amount in the currency's smallest unit.
    pub amount: u64,
    /// Opaque sender identifier. Must be non-empty.
    pub sender: String,
    /// Sender's public key, hex or SPKI PEM.
    pub sender_public_key: String,
    /// Opaque payee identifier. Must be non-empty.
    pub payee: String,
    /// Per-sender sequence number. Only present when the session runs with
    /// replay protection; absent transactions use the four-field encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl Transaction {
    /// Creates a transfer without a sequence number.
    pub fn transfer(
        amount: u64,
        sender: impl Into<String>,
        sender_public_key: impl Into<String>,
        payee: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            sender: sender.into(),
            sender_public_key: sender_public_key.into(),
            payee: payee.into(),
            nonce: None,
        }
    }

    /// Attaches a sequence number.
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// The canonical signing form. See [`encoding::encode`].
    pub fn canonical(&self) -> Result<String, EncodingError> {
        encoding::encode(self)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} to {}", self.amount, self.sender, self.payee)?;
        if let Some(nonce) = self.nonce {
            write!(f, " (seq {})", nonce)?;
        }
        Ok(())
    }
}
