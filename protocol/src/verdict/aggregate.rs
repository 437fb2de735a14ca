//! Shard verdict aggregation.
//!
//! A sharded submission comes back as a list of per-shard sub-check
//! outcomes. The aggregator folds that list into the single success flag
//! the serial path returns directly. With one shard whose sub-checks are
//! the serial validator's checks, both paths must agree; sharding refines
//! serial validation, it does not change the policy.
//!
//! The folding rule sits behind [`VerdictPolicy`]. [`Unanimous`] is the
//! only policy shipped.

use std::fmt;

use super::types::Shard;

/// Rule for combining shard reports into one verdict.
pub trait VerdictPolicy: Send + Sync + fmt::Debug {
    /// Short name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Overall success for the given shard reports.
    fn evaluate(&self, shards: &[Shard]) -> bool;
}

/// Every shard must report at least one sub-check, and every sub-check of
/// every shard must pass. No shards at all is a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unanimous;

impl VerdictPolicy for Unanimous {
    fn name(&self) -> &'static str {
        "unanimous"
    }

    fn evaluate(&self, shards: &[Shard]) -> bool {
        !shards.is_empty() && shards.iter().all(Shard::passed)
    }
}

/// Aggregate under the default [`Unanimous`] policy.
///
/// ```
/// use shardpay_protocol::verdict::{aggregate, Shard};
///
/// assert!(aggregate(&[Shard::new(0, vec![true, true])]));
/// assert!(!aggregate(&[]));
/// ```
pub fn aggregate(shards: &[Shard]) -> bool {
    Unanimous.evaluate(shards)
}

/// Human-readable summary of what failed, for verdicts that arrive
/// without their own diagnostic.
pub fn describe_failures(shards: &[Shard]) -> String {
    if shards.is_empty() {
        return "no shard reported a verdict".to_string();
    }
    let parts: Vec<String> = shards
        .iter()
        .filter(|shard| !shard.passed())
        .map(|shard| {
            if shard.validated_results.is_empty() {
                format!("shard {} ran no checks", shard.id)
            } else {
                format!("shard {} failed checks {:?}", shard.id, shard.failed_checks())
            }
        })
        .collect();
    if parts.is_empty() {
        "all shards passed".to_string()
    } else {
        parts.join("; ")
    }
}
