//! Submission errors and the JSON shapes exchanged with the validator
//! endpoints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::verdict::Shard;

/// Submission-level errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Transport failure: connection refused, non-2xx status, timeout.
    #[error("network error: {message}")]
    Network {
        /// Human-readable description.
        message: String,
    },
    /// The endpoint answered, but not with a well-formed verdict.
    #[error("remote validation error: {reason}")]
    RemoteValidation {
        /// What was wrong with the payload.
        reason: String,
    },
}

impl SubmitError {
    pub(crate) fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub(crate) fn remote(reason: impl Into<String>) -> Self {
        Self::RemoteValidation {
            reason: reason.into(),
        }
    }
}

/// Body posted to the serial and shard endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Canonical transaction string.
    pub transaction: String,
    /// Hex-encoded signature over the canonical string's digest.
    pub signature: String,
    /// Requested shard count. Shard endpoint only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shards: Option<u32>,
}

/// Verdict as it arrives off the wire.
///
/// Every field is optional here so that a missing one can be reported by
/// name instead of as an opaque decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVerdict {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Elapsed processing time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shards: Option<Vec<Shard>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}
