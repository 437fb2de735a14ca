//! Canonical string encoding of a transaction.
//!
//! ```text
//! <amount>:<sender>:<senderPublicKey>:<payee>[:<nonce>]
//! ```
//!
//! The encoding is only injective because `:` is reserved. Fields are not
//! escaped; a field containing the delimiter is refused instead, so two
//! different transactions can never share a signing input.

use thiserror::Error;

use super::types::Transaction;
use crate::config::{CANONICAL_FIELDS, CANONICAL_FIELDS_WITH_NONCE, FIELD_DELIMITER};

/// A transaction that cannot be put into canonical form, or a canonical
/// string that does not describe one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("field `{field}` must not be empty")]
    EmptyField { field: &'static str },

    #[error("field `{field}` contains the reserved delimiter ':'")]
    ReservedDelimiter { field: &'static str },

    #[error("canonical transaction has {found} fields, expected 4 or 5")]
    FieldCount { found: usize },

    #[error("field `{field}` is not a canonical non-negative integer")]
    InvalidInteger { field: &'static str },
}

/// Encode `tx` into its canonical signing form.
///
/// Pure and deterministic. Fails when `sender`, `payee`, or
/// `senderPublicKey` is empty or contains the delimiter.
pub fn encode(tx: &Transaction) -> Result<String, EncodingError> {
    let sender = checked_field("sender", &tx.sender)?;
    let public_key = checked_field("senderPublicKey", &tx.sender_public_key)?;
    let payee = checked_field("payee", &tx.payee)?;

    let mut out = format!(
        "{amount}{d}{sender}{d}{public_key}{d}{payee}",
        amount = tx.amount,
        d = FIELD_DELIMITER,
    );
    if let Some(nonce) = tx.nonce {
        out.push(FIELD_DELIMITER);
        out.push_str(&nonce.to_string());
    }
    Ok(out)
}

/// Parse a canonical string back into a [`Transaction`].
///
/// Exact inverse of [`encode`]: integers must be plain decimal with no
/// sign and no leading zeros, so `decode(s)` re-encodes to `s`.
pub fn decode(canonical: &str) -> Result<Transaction, EncodingError> {
    let fields: Vec<&str> = canonical.split(FIELD_DELIMITER).collect();
    if fields.len() != CANONICAL_FIELDS && fields.len() != CANONICAL_FIELDS_WITH_NONCE {
        return Err(EncodingError::FieldCount {
            found: fields.len(),
        });
    }

    let amount = parse_integer("amount", fields[0])?;
    let sender = checked_field("sender", fields[1])?;
    let public_key = checked_field("senderPublicKey", fields[2])?;
    let payee = checked_field("payee", fields[3])?;
    let nonce = match fields.get(4) {
        Some(raw) => Some(parse_integer("nonce", raw)?),
        None => None,
    };

    Ok(Transaction {
        amount,
        sender: sender.to_string(),
        sender_public_key: public_key.to_string(),
        payee: payee.to_string(),
        nonce,
    })
}

fn checked_field<'a>(field: &'static str, value: &'a str) -> Result<&'a str, EncodingError> {
    if value.is_empty() {
        return Err(EncodingError::EmptyField { field });
    }
    if value.contains(FIELD_DELIMITER) {
        return Err(EncodingError::ReservedDelimiter { field });
    }
    Ok(value)
}

fn parse_integer(field: &'static str, raw: &str) -> Result<u64, EncodingError> {
    let canonical = !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && (raw == "0" || !raw.starts_with('0'));
    if !canonical {
        return Err(EncodingError::InvalidInteger { field });
    }
    raw.parse().map_err(|_| EncodingError::InvalidInteger { field })
}
