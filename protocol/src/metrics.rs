//! # Session Metrics
//!
//! Prometheus counters for submissions made through a [`Session`](crate::session::Session).
//! Everything is registered in a dedicated [`prometheus::Registry`] with
//! the `shardpay` prefix so the client can be embedded next to other
//! registries.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::verdict::{Strategy, TransactionResult};

/// Outcome label for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
    /// Signing or encoding failed before anything was sent.
    Invalid,
    NetworkError,
    RemoteError,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Invalid => "invalid",
            Self::NetworkError => "network_error",
            Self::RemoteError => "remote_error",
        }
    }
}

/// Metric handles for the session layer.
#[derive(Clone)]
pub struct SessionMetrics {
    registry: Registry,
    /// Submissions by strategy and outcome.
    pub submissions_total: IntCounterVec,
    /// Sends refused because another one was still in flight.
    pub in_flight_rejections_total: IntCounter,
    /// Remote processing time of completed verdicts.
    pub verdict_latency_seconds: Histogram,
    /// Shard reports per sharded verdict.
    pub shards_per_verdict: Histogram,
}

impl SessionMetrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("shardpay".into()), None)?;

        let submissions_total = IntCounterVec::new(
            Opts::new(
                "submissions_total",
                "Transaction submissions by strategy and outcome",
            ),
            &["strategy", "outcome"],
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        let in_flight_rejections_total = IntCounter::new(
            "in_flight_rejections_total",
            "Sends rejected because a submission was already in flight",
        )?;
        registry.register(Box::new(in_flight_rejections_total.clone()))?;

        let verdict_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "verdict_latency_seconds",
                "Validator processing time reported with each verdict",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
        )?;
        registry.register(Box::new(verdict_latency_seconds.clone()))?;

        let shards_per_verdict = Histogram::with_opts(
            HistogramOpts::new(
                "shards_per_verdict",
                "Number of shard reports in each sharded verdict",
            )
            .buckets(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]),
        )?;
        registry.register(Box::new(shards_per_verdict.clone()))?;

        Ok(Self {
            registry,
            submissions_total,
            in_flight_rejections_total,
            verdict_latency_seconds,
            shards_per_verdict,
        })
    }

    /// Records one submission outcome.
    pub fn record(&self, strategy: Strategy, outcome: Outcome) {
        self.submissions_total
            .with_label_values(&[strategy.as_str(), outcome.as_str()])
            .inc();
    }

    /// Records a completed verdict, accepted or rejected.
    pub fn record_verdict(&self, result: &TransactionResult) {
        let outcome = if result.success {
            Outcome::Accepted
        } else {
            Outcome::Rejected
        };
        self.record(result.strategy, outcome);
        self.verdict_latency_seconds
            .observe(result.time.as_secs_f64());
        if result.strategy == Strategy::Shard {
            self.shards_per_verdict.observe(result.shards.len() as f64);
        }
    }

    /// Encodes all registered metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
