//! # Submission Session
//!
//! One [`Session`] owns everything a caller sees while sending transfers:
//! the provisioned account, the current balance, the latest verdict, the
//! last error, and the in-flight (loading) flag.
//!
//! ## Phases
//!
//! ```text
//!            send()               signed               verdict ok
//!   Idle ───────────▶ Signing ───────────▶ Submitted ───────────▶ Succeeded
//!    ▲                   │                     │
//!    │   sign/encode     │                     │ rejected, network,
//!    └───── error ───────┘                     │ remote error
//!    ▲                                         ▼
//!    └──────────────── reset() ─────────────  Failed
//! ```
//!
//! Only one submission runs at a time. A `send` issued while another is in
//! flight fails with [`SessionError::InFlight`] and leaves the pending one
//! untouched, so the state the caller sees always belongs to a single
//! attempt.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::metrics::{Outcome, SessionMetrics};
use crate::provisioning::{select_account, ProvisionedAccount};
use crate::submit::{HttpTransport, SubmissionClient, SubmitError, ValidatorTransport};
use crate::transaction::{sign_transaction, Transaction, TransactionError};
use crate::verdict::{ShardCount, Strategy, TransactionResult};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Another submission on this session has not finished yet.
    #[error("a submission is already in flight")]
    InFlight,

    /// The provisioning endpoint returned an empty account list.
    #[error("no provisioned accounts")]
    NoAccounts,

    #[error("no provisioned account for user `{0}`")]
    UnknownUser(String),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where the session is in its submission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Signing,
    Submitted,
    Succeeded,
    Failed,
}

impl Phase {
    /// Succeeded or Failed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Form values for one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferForm {
    pub amount: u64,
    pub payee: String,
    /// Shard count for the shard strategy. `None` uses the session default.
    pub shards: Option<ShardCount>,
}

impl TransferForm {
    pub fn new(amount: u64, payee: impl Into<String>) -> Self {
        Self {
            amount,
            payee: payee.into(),
            shards: None,
        }
    }

    /// Requests `shards` shards. Clamped to the supported range.
    pub fn with_shards(mut self, shards: u32) -> Self {
        self.shards = Some(ShardCount::new(shards));
        self
    }
}

#[derive(Debug)]
struct SessionState {
    phase: Phase,
    balance: u64,
    result: Option<TransactionResult>,
    last_error: Option<String>,
    next_nonce: u64,
    completed_at: Option<DateTime<Utc>>,
    in_flight: bool,
}

impl SessionState {
    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.last_error = None;
    }
}

/// Caller-visible view of a session. Carries no key material.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub user: String,
    pub public_key: String,
    pub phase: Phase,
    /// True while a submission is in flight.
    pub loading: bool,
    pub balance: u64,
    pub result: Option<TransactionResult>,
    pub last_error: Option<String>,
    /// Sequence number the next replay-protected transaction will carry.
    pub next_nonce: u64,
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Submission session for one provisioned account.
pub struct Session<T: ValidatorTransport = HttpTransport> {
    id: Uuid,
    client: SubmissionClient<T>,
    account: ProvisionedAccount,
    config: ClientConfig,
    state: Mutex<SessionState>,
    metrics: Option<Arc<SessionMetrics>>,
}

impl<T: ValidatorTransport> Session<T> {
    /// Starts a session for `account`, balance taken from the provisioning
    /// record.
    pub fn new(client: SubmissionClient<T>, account: ProvisionedAccount, config: ClientConfig) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session = %id, user = %account.user, balance = account.balance, "session started");
        Self {
            id,
            state: Mutex::new(SessionState {
                phase: Phase::Idle,
                balance: account.balance,
                result: None,
                last_error: None,
                next_nonce: 0,
                completed_at: None,
                in_flight: false,
            }),
            client,
            account,
            config,
            metrics: None,
        }
    }

    /// Fetches the provisioned accounts and starts a session for `user`,
    /// or for the first account when `user` is `None`.
    pub async fn bootstrap(
        client: SubmissionClient<T>,
        user: Option<&str>,
        config: ClientConfig,
    ) -> Result<Self, SessionError> {
        let accounts = client.fetch_accounts().await?;
        let account = select_account(accounts, user).ok_or_else(|| match user {
            Some(name) => SessionError::UnknownUser(name.to_owned()),
            None => SessionError::NoAccounts,
        })?;
        Ok(Self::new(client, account, config))
    }

    pub fn with_metrics(mut self, metrics: Arc<SessionMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn account(&self) -> &ProvisionedAccount {
        &self.account
    }

    pub fn client(&self) -> &SubmissionClient<T> {
        &self.client
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Signs and submits one transfer, then records the verdict.
    ///
    /// A well-formed rejection is returned as `Ok` with
    /// `success == false`. Signing and encoding errors leave the session
    /// `Idle` with balance and result untouched. Network and remote errors
    /// move it to `Failed`.
    pub async fn send(
        &self,
        form: TransferForm,
        strategy: Strategy,
    ) -> Result<TransactionResult, SessionError> {
        let guard = match InFlightGuard::acquire(self) {
            Some(guard) => guard,
            None => {
                tracing::warn!(session = %self.id, "send rejected, submission already in flight");
                if let Some(metrics) = &self.metrics {
                    metrics.in_flight_rejections_total.inc();
                }
                return Err(SessionError::InFlight);
            }
        };

        let (prior_balance, nonce) = {
            let state = self.state.lock();
            (state.balance, state.next_nonce)
        };

        let mut tx = Transaction::transfer(
            form.amount,
            self.account.user.as_str(),
            self.account.public_key.as_str(),
            form.payee,
        );
        if self.config.replay_protection {
            tx = tx.with_nonce(nonce);
        }

        let signed = match sign_transaction(tx, self.account.private_key_pem()) {
            Ok(signed) => signed,
            Err(err) => {
                guard.settle(|state| state.phase = Phase::Idle);
                tracing::warn!(session = %self.id, error = %err, "transaction not signed");
                self.record(strategy, Outcome::Invalid);
                return Err(err.into());
            }
        };

        self.state.lock().phase = Phase::Submitted;
        let shards = form
            .shards
            .unwrap_or_else(|| ShardCount::new(self.config.default_shards));

        match self.client.submit(signed, strategy, shards).await {
            Ok(result) => {
                let result = result.with_prior_balance(prior_balance);
                guard.settle(|state| {
                    if result.success {
                        state.phase = Phase::Succeeded;
                        state.balance = result.balance;
                        state.last_error = None;
                        state.next_nonce += 1;
                    } else {
                        state.phase = Phase::Failed;
                        state.last_error = result.error_msg.clone();
                    }
                    state.result = Some(result.clone());
                    state.completed_at = Some(Utc::now());
                });

                if let Some(metrics) = &self.metrics {
                    metrics.record_verdict(&result);
                }
                Ok(result)
            }
            Err(err) => {
                guard.settle(|state| {
                    state.phase = Phase::Failed;
                    state.last_error = Some(err.to_string());
                    state.completed_at = Some(Utc::now());
                });
                tracing::warn!(session = %self.id, %strategy, error = %err, "submission failed");
                let outcome = match err {
                    SubmitError::Network { .. } => Outcome::NetworkError,
                    SubmitError::RemoteValidation { .. } => Outcome::RemoteError,
                };
                self.record(strategy, outcome);
                Err(err.into())
            }
        }
    }

    /// Returns a terminal session to `Idle`. The last result and balance
    /// are kept. A no-op when already idle.
    pub fn reset(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.in_flight {
            return Err(SessionError::InFlight);
        }
        if state.phase.is_terminal() {
            state.reset();
        }
        Ok(())
    }

    /// Phase and loading flag are read under one lock, so a snapshot never
    /// pairs `loading` with a terminal phase.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            session_id: self.id,
            user: self.account.user.clone(),
            public_key: self.account.public_key.clone(),
            phase: state.phase,
            loading: state.in_flight,
            balance: state.balance,
            result: state.result.clone(),
            last_error: state.last_error.clone(),
            next_nonce: state.next_nonce,
            completed_at: state.completed_at,
        }
    }

    fn record(&self, strategy: Strategy, outcome: Outcome) {
        if let Some(metrics) = &self.metrics {
            metrics.record(strategy, outcome);
        }
    }
}

/// Holds the in-flight flag for one `send`.
///
/// The flag only changes together with the phase: `acquire` sets it and
/// enters `Signing`, `settle` writes the outcome and clears it. Dropping
/// an unsettled guard (the future was cancelled) marks the attempt
/// `Failed`.
struct InFlightGuard<'a, T: ValidatorTransport> {
    session: &'a Session<T>,
    settled: bool,
}

impl<'a, T: ValidatorTransport> InFlightGuard<'a, T> {
    fn acquire(session: &'a Session<T>) -> Option<Self> {
        let mut state = session.state.lock();
        if state.in_flight {
            return None;
        }
        if state.phase.is_terminal() {
            state.reset();
        }
        state.in_flight = true;
        state.phase = Phase::Signing;
        Some(Self {
            session,
            settled: false,
        })
    }

    fn settle(mut self, update: impl FnOnce(&mut SessionState)) {
        let mut state = self.session.state.lock();
        update(&mut state);
        state.in_flight = false;
        self.settled = true;
    }
}

impl<T: ValidatorTransport> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.session.state.lock();
        if matches!(state.phase, Phase::Signing | Phase::Submitted) {
            state.phase = Phase::Failed;
            state.last_error = Some("submission abandoned before a verdict arrived".into());
            state.completed_at = Some(Utc::now());
            tracing::warn!(session = %self.session.id, "in-flight submission dropped");
        }
        state.in_flight = false;
    }
}
