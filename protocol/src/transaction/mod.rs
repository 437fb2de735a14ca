//! # Transaction Module
//!
//! Construction, canonical encoding, and signing of transfers.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    — the Transaction value type
//! encoding.rs — canonical `amount:sender:pubkey:payee[:nonce]` form
//! signing.rs  — SHA-256 + Ed25519 over the canonical form
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — [`Transaction::transfer`] from the current form values.
//! 2. **Encode** — [`encode`] produces the canonical string.
//! 3. **Sign** — [`sign_transaction`] consumes the transaction and returns a
//!    [`SignedTransaction`].
//! 4. **Submit** — hand the signed transaction to
//!    [`SubmissionClient::submit`](crate::submit::SubmissionClient::submit),
//!    which consumes it.
//!
//! ## Design Decisions
//!
//! - Amounts are `u64` minor units. No floating point near money.
//! - The delimiter is reserved rather than escaped. See [`encoding`].
//! - A sequence number is optional so the four-field form stays the
//!   default wire format.

pub mod encoding;
pub mod signing;
pub mod types;

pub use encoding::{decode, encode, EncodingError};
pub use signing::{
    sign, sign_transaction, sign_with_keypair, verify_signature, SignError, SignedTransaction,
    TransactionError,
};
pub use types::Transaction;
