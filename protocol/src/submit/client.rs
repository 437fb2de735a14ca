//! Submission client: strategy selection, timeout, and verdict
//! interpretation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use super::transport::{HttpTransport, ValidatorTransport};
use super::types::{SubmitError, SubmitRequest, WireVerdict};
use crate::config::ClientConfig;
use crate::provisioning::ProvisionedAccount;
use crate::transaction::SignedTransaction;
use crate::verdict::{
    describe_failures, ShardCount, Strategy, TransactionResult, Unanimous, VerdictPolicy,
};

/// Sends signed transactions to the validator network and turns the
/// replies into [`TransactionResult`]s.
pub struct SubmissionClient<T: ValidatorTransport = HttpTransport> {
    /// Transport used for every call.
    transport: T,
    /// Shard aggregation rule.
    policy: Arc<dyn VerdictPolicy>,
    /// In-flight budget per call. Expiry is a network error.
    timeout: Duration,
}

impl SubmissionClient<HttpTransport> {
    /// Client over HTTP, configured from `config`.
    pub fn http(config: &ClientConfig) -> Result<Self, SubmitError> {
        let transport = HttpTransport::new(config.clone())?;
        Ok(Self::new(transport, config.submit_timeout))
    }
}

impl<T: ValidatorTransport> SubmissionClient<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self {
            transport,
            policy: Arc::new(Unanimous),
            timeout,
        }
    }

    /// Replaces the shard aggregation rule.
    pub fn with_policy(mut self, policy: Arc<dyn VerdictPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &dyn VerdictPolicy {
        self.policy.as_ref()
    }

    /// Fetches the provisioned accounts, bounded by the client timeout.
    pub async fn fetch_accounts(&self) -> Result<Vec<ProvisionedAccount>, SubmitError> {
        match timeout(self.timeout, self.transport.fetch_accounts()).await {
            Ok(result) => result,
            Err(_elapsed) => Err(self.timed_out()),
        }
    }

    /// Submits `signed` through `strategy` and waits for the verdict.
    ///
    /// Consumes the signed transaction: a retry is a new signing cycle,
    /// never a resend of the same payload. `shard_count` is only sent on
    /// the shard path.
    pub async fn submit(
        &self,
        signed: SignedTransaction,
        strategy: Strategy,
        shard_count: ShardCount,
    ) -> Result<TransactionResult, SubmitError> {
        let request = SubmitRequest {
            transaction: signed.canonical().to_owned(),
            signature: signed.signature_hex(),
            shards: match strategy {
                Strategy::Serial => None,
                Strategy::Shard => Some(shard_count.get()),
            },
        };
        drop(signed);

        let started = Instant::now();
        let verdict = match timeout(self.timeout, self.transport.submit(strategy, &request)).await
        {
            Ok(result) => result?,
            Err(_elapsed) => return Err(self.timed_out()),
        };

        let result = interpret(verdict, strategy, shard_count, self.policy.as_ref())?;
        tracing::info!(
            %strategy,
            success = result.success,
            shards = result.shards.len(),
            remote_time_ms = result.time.as_millis() as u64,
            round_trip_ms = started.elapsed().as_millis() as u64,
            "verdict received"
        );
        Ok(result)
    }

    fn timed_out(&self) -> SubmitError {
        SubmitError::network(format!(
            "request timed out after {}ms",
            self.timeout.as_millis()
        ))
    }
}

/// Validates a raw verdict and builds the caller-facing result.
///
/// On the shard path `policy` decides success. A remote `success` flag
/// that disagrees is logged and overridden.
pub fn interpret(
    verdict: WireVerdict,
    strategy: Strategy,
    shard_count: ShardCount,
    policy: &dyn VerdictPolicy,
) -> Result<TransactionResult, SubmitError> {
    let remote_success = verdict
        .success
        .ok_or_else(|| SubmitError::remote("missing field `success`"))?;
    let kind = verdict
        .kind
        .ok_or_else(|| SubmitError::remote("missing field `type`"))?;
    if kind != strategy.as_str() {
        return Err(SubmitError::remote(format!(
            "expected a {} verdict, got `{}`",
            strategy, kind
        )));
    }
    let seconds = verdict
        .time
        .ok_or_else(|| SubmitError::remote("missing field `time`"))?;
    let time = Duration::try_from_secs_f64(seconds)
        .map_err(|_| SubmitError::remote(format!("invalid processing time: {}", seconds)))?;
    let balance = verdict
        .balance
        .ok_or_else(|| SubmitError::remote("missing field `balance`"))?;

    let (success, shards) = match strategy {
        Strategy::Serial => {
            let shards = verdict.shards.unwrap_or_default();
            if !shards.is_empty() {
                return Err(SubmitError::remote(format!(
                    "serial verdict carried {} shard reports",
                    shards.len()
                )));
            }
            (remote_success, shards)
        }
        Strategy::Shard => {
            let shards = verdict
                .shards
                .ok_or_else(|| SubmitError::remote("missing field `shards`"))?;
            let mut seen = HashSet::with_capacity(shards.len());
            for shard in &shards {
                if shard.id >= shard_count.get() {
                    return Err(SubmitError::remote(format!(
                        "shard id {} out of range for {} shards",
                        shard.id, shard_count
                    )));
                }
                if !seen.insert(shard.id) {
                    return Err(SubmitError::remote(format!(
                        "duplicate shard id {}",
                        shard.id
                    )));
                }
            }
            let aggregated = policy.evaluate(&shards);
            if aggregated != remote_success {
                tracing::warn!(
                    remote = remote_success,
                    aggregated,
                    policy = policy.name(),
                    "remote success flag disagrees with shard votes, using aggregated verdict"
                );
            }
            (aggregated, shards)
        }
    };

    let error_msg = if success {
        None
    } else {
        match verdict.error_msg {
            Some(message) => Some(message),
            None if strategy == Strategy::Shard => Some(describe_failures(&shards)),
            None => None,
        }
    };

    Ok(TransactionResult {
        success,
        strategy,
        time,
        shards,
        balance,
        error_msg,
    })
}
