//! # Protocol Configuration & Constants
//!
//! Every fixed number the client depends on lives here, next to the
//! runtime [`ClientConfig`] that the command line fills in.
//!
//! The endpoint paths and the shard ceiling mirror what the validator
//! network serves. Change them together with the server or not at all.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Client protocol version, reported by the CLI `version` command.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Canonical Encoding
// ---------------------------------------------------------------------------

/// Field separator of the canonical transaction encoding. Reserved: no
/// field value may contain it.
pub const FIELD_DELIMITER: char = ':';

/// Field count of a canonical transaction without a sequence number.
pub const CANONICAL_FIELDS: usize = 4;

/// Field count of a canonical transaction carrying a sequence number.
pub const CANONICAL_FIELDS_WITH_NONCE: usize = 5;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Signature scheme used for every transaction.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Digest applied to the canonical string before signing.
pub const DIGEST_ALGORITHM: &str = "SHA-256";

/// SHA-256 output length in bytes.
pub const DIGEST_LENGTH: usize = 32;

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Sharding
// ---------------------------------------------------------------------------

/// Upper bound on the number of shards a single submission may request.
/// Larger requests are clamped to this value, never rejected.
pub const MAX_SHARDS: u32 = 10;

/// Lower bound on the shard count. A sharded submission with no shard
/// has nobody to validate it.
pub const MIN_SHARDS: u32 = 1;

/// Shard count used when the caller does not pick one.
pub const DEFAULT_SHARDS: u32 = MAX_SHARDS;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Validator base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Serial (single-validator) endpoint path.
pub const SERIAL_PATH: &str = "normal";

/// Sharded endpoint path.
pub const SHARD_PATH: &str = "shard";

/// Key-provisioning endpoint path.
pub const PROVISIONING_PATH: &str = "get-user";

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// How long a submission may stay in flight before it counts as a
/// network failure.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Same timeout in milliseconds, for CLI defaults and env parsing.
/// Keep in sync with [`DEFAULT_SUBMIT_TIMEOUT`].
pub const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 30_000;

/// TCP connect budget for the HTTP transport.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Runtime Configuration
// ---------------------------------------------------------------------------

/// Runtime settings for a submission session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the validator network (scheme, host, optional port).
    pub base_url: String,
    /// In-flight budget for one submission.
    pub submit_timeout: Duration,
    /// Append the session sequence number to the canonical encoding.
    pub replay_protection: bool,
    /// Shard count used when a transfer form does not request one.
    pub default_shards: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            replay_protection: false,
            default_shards: DEFAULT_SHARDS,
        }
    }
}

impl ClientConfig {
    /// Creates a config for `base_url` with every other field defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
