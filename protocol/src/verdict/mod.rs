//! # Verdict Module
//!
//! The result model shared by both validation strategies, and the
//! aggregator that turns per-shard votes into one outcome.
//!
//! ```text
//! types.rs     — Strategy, ShardCount, Shard, TransactionResult
//! aggregate.rs — VerdictPolicy and the unanimous-pass rule
//! ```

pub mod aggregate;
pub mod types;

pub use aggregate::{aggregate, describe_failures, Unanimous, VerdictPolicy};
pub use types::{Shard, ShardCount, Strategy, TransactionResult};
