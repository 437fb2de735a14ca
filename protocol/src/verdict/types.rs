//! Verdict vocabulary: validation strategy, shard reports, and the final
//! result handed back to the caller.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::{MAX_SHARDS, MIN_SHARDS};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Which validation path a submission takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// One validator runs every check.
    Serial,
    /// N validators check independently; their votes are aggregated.
    Shard,
}

impl Strategy {
    /// Label used in metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serial => "Serial",
            Self::Shard => "Shard",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serial" | "sequential" | "normal" => Ok(Self::Serial),
            "shard" | "sharded" | "sharding" => Ok(Self::Shard),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ShardCount
// ---------------------------------------------------------------------------

/// Number of shards requested for a sharded submission, always within
/// `MIN_SHARDS..=MAX_SHARDS`.
///
/// Out-of-range requests are clamped, matching the form input this value
/// comes from:
///
/// ```
/// use shardpay_protocol::verdict::ShardCount;
///
/// assert_eq!(ShardCount::new(15).get(), 10);
/// assert_eq!(ShardCount::new(0).get(), 1);
/// assert_eq!(ShardCount::new(4).get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ShardCount(u32);

impl ShardCount {
    pub fn new(requested: u32) -> Self {
        let clamped = requested.clamp(MIN_SHARDS, MAX_SHARDS);
        if clamped != requested {
            tracing::debug!(requested, clamped, "shard count clamped");
        }
        Self(clamped)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for ShardCount {
    fn default() -> Self {
        Self(crate::config::DEFAULT_SHARDS)
    }
}

impl fmt::Display for ShardCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Shard
// ---------------------------------------------------------------------------

/// One validator's report: the outcome of each sub-check it ran, in the
/// order it ran them (signature, stakeholders, amount, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shard {
    pub id: u32,
    pub validated_results: Vec<bool>,
}

impl Shard {
    pub fn new(id: u32, validated_results: Vec<bool>) -> Self {
        Self {
            id,
            validated_results,
        }
    }

    /// True when the shard ran at least one check and every check passed.
    /// A shard that reports nothing has not shown the transaction is valid.
    pub fn passed(&self) -> bool {
        !self.validated_results.is_empty() && self.validated_results.iter().all(|ok| *ok)
    }

    /// Indices of the sub-checks that failed.
    pub fn failed_checks(&self) -> Vec<usize> {
        self.validated_results
            .iter()
            .enumerate()
            .filter(|(_, ok)| !**ok)
            .map(|(i, _)| i)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TransactionResult
// ---------------------------------------------------------------------------

/// The verdict for one submission.
///
/// Immutable once the session stores it; the next verdict replaces it
/// wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    /// Final accept/reject decision.
    pub success: bool,
    /// Strategy that produced this verdict.
    #[serde(rename = "type")]
    pub strategy: Strategy,
    /// Processing time reported by the validator network.
    #[serde(serialize_with = "serialize_secs")]
    pub time: Duration,
    /// Per-shard reports. Always empty for [`Strategy::Serial`].
    pub shards: Vec<Shard>,
    /// Account balance after this verdict.
    pub balance: u64,
    /// Diagnostic, present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl TransactionResult {
    /// Restates a failed verdict against the balance held before the
    /// attempt. A rejected transfer moves no money, whatever balance the
    /// remote echoed back. Successful verdicts are returned unchanged.
    pub fn with_prior_balance(self, prior: u64) -> Self {
        if self.success {
            self
        } else {
            Self {
                balance: prior,
                ..self
            }
        }
    }
}

fn serialize_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_display_and_parse() {
        assert_eq!(Strategy::Serial.to_string(), "Serial");
        assert_eq!(Strategy::Shard.to_string(), "Shard");
        assert_eq!("SERIAL".parse::<Strategy>().unwrap(), Strategy::Serial);
        assert_eq!("sharding".parse::<Strategy>().unwrap(), Strategy::Shard);
        assert!("quorum".parse::<Strategy>().is_err());
    }

    #[test]
    fn strategy_serde_matches_wire_type() {
        assert_eq!(serde_json::to_string(&Strategy::Shard).unwrap(), "\"Shard\"");
        let parsed: Strategy = serde_json::from_str("\"Serial\"").unwrap();
        assert_eq!(parsed, Strategy::Serial);
    }

    #[test]
    fn shard_count_clamps_to_maximum() {
        assert_eq!(ShardCount::new(15).get(), 10);
        assert_eq!(ShardCount::new(10).get(), 10);
        assert_eq!(ShardCount::new(u32::MAX).get(), 10);
    }

    #[test]
    fn shard_count_has_a_floor() {
        assert_eq!(ShardCount::new(0).get(), 1);
        assert_eq!(ShardCount::default().get(), 10);
    }

    #[test]
    fn shard_pass_requires_evidence() {
        assert!(Shard::new(0, vec![true, true]).passed());
        assert!(!Shard::new(0, vec![true, false]).passed());
        assert!(!Shard::new(0, vec![]).passed());
    }

    #[test]
    fn shard_failed_checks_lists_indices() {
        let shard = Shard::new(3, vec![true, false, true, false]);
        assert_eq!(shard.failed_checks(), vec![1, 3]);
        assert!(Shard::new(0, vec![true]).failed_checks().is_empty());
    }

    #[test]
    fn shard_uses_camel_case_on_the_wire() {
        let shard: Shard =
            serde_json::from_str(r#"{"id":2,"validatedResults":[true,false]}"#).unwrap();
        assert_eq!(shard, Shard::new(2, vec![true, false]));
    }

    #[test]
    fn prior_balance_applies_only_to_failures() {
        let base = TransactionResult {
            success: false,
            strategy: Strategy::Serial,
            time: Duration::from_millis(5),
            shards: vec![],
            balance: 0,
            error_msg: Some("insufficient funds".into()),
        };
        assert_eq!(base.clone().with_prior_balance(90).balance, 90);

        let ok = TransactionResult {
            success: true,
            error_msg: None,
            balance: 40,
            ..base
        };
        assert_eq!(ok.with_prior_balance(90).balance, 40);
    }

    #[test]
    fn result_serializes_with_wire_names() {
        let result = TransactionResult {
            success: true,
            strategy: Strategy::Shard,
            time: Duration::from_millis(1500),
            shards: vec![Shard::new(0, vec![true])],
            balance: 75,
            error_msg: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "Shard");
        assert_eq!(json["time"], 1.5);
        assert_eq!(json["shards"][0]["validatedResults"][0], true);
        assert!(json.get("errorMsg").is_none());
    }
}
