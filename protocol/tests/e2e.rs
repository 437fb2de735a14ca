//! End-to-end tests against an in-process validator double.
//!
//! The double is a small axum app serving the same routes as the real
//! validator network (`get-user`, `normal`, `shard`). It decodes the
//! canonical string, verifies the signature, checks the balance, and
//! answers with a verdict, so every test runs the real HTTP transport,
//! the real signer, and the real verdict checks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use shardpay_protocol::config::ClientConfig;
use shardpay_protocol::provisioning::ProvisionedAccount;
use shardpay_protocol::session::{Phase, Session, SessionError, TransferForm};
use shardpay_protocol::submit::{SubmissionClient, SubmitError, SubmitRequest};
use shardpay_protocol::transaction::{decode, verify_signature};
use shardpay_protocol::verdict::Strategy;

// ---------------------------------------------------------------------------
// Validator double
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Ledger {
    accounts: Vec<ProvisionedAccount>,
    balances: HashMap<String, u64>,
    /// Shard ids that vote against every transaction.
    faulty_shards: Vec<u32>,
    /// Requests seen on the shard route.
    shard_requests: Vec<SubmitRequest>,
}

type Shared = Arc<Mutex<Ledger>>;

/// Runs the three sub-checks: signature, known stakeholders, funds.
fn checks(ledger: &Ledger, request: &SubmitRequest) -> ([bool; 3], u64, String) {
    let Ok(tx) = decode(&request.transaction) else {
        return ([false; 3], 0, String::new());
    };
    let signature_ok = hex::decode(&request.signature)
        .map(|sig| verify_signature(&request.transaction, &tx.sender_public_key, &sig).is_ok())
        .unwrap_or(false);
    let stakeholders_ok =
        ledger.balances.contains_key(&tx.sender) && ledger.balances.contains_key(&tx.payee);
    let balance = ledger.balances.get(&tx.sender).copied().unwrap_or(0);
    let amount_ok = tx.amount > 0 && tx.amount <= balance;
    ([signature_ok, stakeholders_ok, amount_ok], tx.amount, tx.sender)
}

fn settle(ledger: &mut Ledger, sender: &str, amount: u64, request: &SubmitRequest) -> u64 {
    let payee = decode(&request.transaction)
        .map(|tx| tx.payee)
        .unwrap_or_default();
    if let Some(balance) = ledger.balances.get_mut(sender) {
        *balance -= amount;
    }
    if let Some(balance) = ledger.balances.get_mut(&payee) {
        *balance += amount;
    }
    ledger.balances.get(sender).copied().unwrap_or(0)
}

async fn get_user(State(ledger): State<Shared>) -> Json<Value> {
    let ledger = ledger.lock();
    let accounts: Vec<Value> = ledger
        .accounts
        .iter()
        .map(|a| {
            json!({
                "user": a.user,
                "balance": a.balance,
                "privKey": a.private_key_pem(),
                "pubKey": a.public_key,
            })
        })
        .collect();
    Json(Value::Array(accounts))
}

async fn normal(State(ledger): State<Shared>, Json(request): Json<SubmitRequest>) -> Json<Value> {
    let started = Instant::now();
    let mut ledger = ledger.lock();
    let (results, amount, sender) = checks(&ledger, &request);
    let success = results.iter().all(|ok| *ok);
    let balance = if success {
        settle(&mut ledger, &sender, amount, &request)
    } else {
        ledger.balances.get(&sender).copied().unwrap_or(0)
    };
    let mut body = json!({
        "success": success,
        "type": "Serial",
        "time": started.elapsed().as_secs_f64(),
        "shards": [],
        "balance": balance,
    });
    if !success {
        body["errorMsg"] = json!(format!("checks failed: {:?}", results));
    }
    Json(body)
}

async fn shard(State(ledger): State<Shared>, Json(request): Json<SubmitRequest>) -> Json<Value> {
    let started = Instant::now();
    let mut ledger = ledger.lock();
    ledger.shard_requests.push(request.clone());
    let count = request.shards.unwrap_or(1);
    let (results, amount, sender) = checks(&ledger, &request);
    let shards: Vec<Value> = (0..count)
        .map(|id| {
            let mut votes = results.to_vec();
            if ledger.faulty_shards.contains(&id) {
                votes[0] = false;
            }
            json!({ "id": id, "validatedResults": votes })
        })
        .collect();
    let all_pass = results.iter().all(|ok| *ok) && ledger.faulty_shards.is_empty();
    let balance = if all_pass {
        settle(&mut ledger, &sender, amount, &request)
    } else {
        ledger.balances.get(&sender).copied().unwrap_or(0)
    };
    // The double always claims success; the client must decide from votes.
    Json(json!({
        "success": true,
        "type": "Shard",
        "time": started.elapsed().as_secs_f64(),
        "shards": shards,
        "balance": balance,
    }))
}

fn validator(ledger: Shared) -> Router {
    Router::new()
        .route("/get-user", get(get_user))
        .route("/normal", post(normal))
        .route("/shard", post(shard))
        .with_state(ledger)
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{}", addr)
}

/// Seeds Alice (100) and Bob (50) and starts the double.
async fn start_validator(faulty_shards: Vec<u32>) -> (String, Shared) {
    let alice = ProvisionedAccount::generate("Alice", 100).expect("keygen");
    let bob = ProvisionedAccount::generate("Bob", 50).expect("keygen");
    let ledger = Arc::new(Mutex::new(Ledger {
        balances: HashMap::from([("Alice".to_string(), 100), ("Bob".to_string(), 50)]),
        accounts: vec![alice, bob],
        faulty_shards,
        ..Ledger::default()
    }));
    let url = spawn(validator(ledger.clone())).await;
    (url, ledger)
}

async fn session_for(url: &str, user: &str) -> Session {
    let config = ClientConfig::with_base_url(url);
    let client = SubmissionClient::http(&config).expect("http client");
    Session::bootstrap(client, Some(user), config)
        .await
        .expect("bootstrap")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn provisioning_returns_usable_keys() {
    let (url, _) = start_validator(vec![]).await;
    let client = SubmissionClient::http(&ClientConfig::with_base_url(&url)).unwrap();
    let accounts = client.fetch_accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);
    for account in &accounts {
        account.check_keypair().unwrap();
    }
}

#[tokio::test]
async fn serial_transfer_succeeds() {
    let (url, ledger) = start_validator(vec![]).await;
    let session = session_for(&url, "Alice").await;

    let result = session
        .send(TransferForm::new(30, "Bob"), Strategy::Serial)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.strategy, Strategy::Serial);
    assert!(result.shards.is_empty());
    assert_eq!(result.balance, 70);
    assert_eq!(result.error_msg, None);

    let snap = session.snapshot();
    assert_eq!(snap.phase, Phase::Succeeded);
    assert_eq!(snap.balance, 70);
    assert_eq!(ledger.lock().balances["Bob"], 80);
}

#[tokio::test]
async fn overdraft_is_a_rejection_not_an_error() {
    let (url, _) = start_validator(vec![]).await;
    let session = session_for(&url, "Bob").await;

    let result = session
        .send(TransferForm::new(500, "Alice"), Strategy::Serial)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.balance, 50);
    assert!(result.error_msg.unwrap().contains("checks failed"));
    assert_eq!(session.snapshot().phase, Phase::Failed);
}

#[tokio::test]
async fn sharded_transfer_clamps_and_aggregates() {
    let (url, ledger) = start_validator(vec![]).await;
    let session = session_for(&url, "Alice").await;

    let result = session
        .send(TransferForm::new(10, "Bob").with_shards(15), Strategy::Shard)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.strategy, Strategy::Shard);
    assert_eq!(result.shards.len(), 10);
    assert_eq!(ledger.lock().shard_requests[0].shards, Some(10));
    assert_eq!(session.snapshot().balance, 90);
}

#[tokio::test]
async fn one_dissenting_shard_fails_the_verdict() {
    let (url, _) = start_validator(vec![2]).await;
    let session = session_for(&url, "Alice").await;

    let result = session
        .send(TransferForm::new(10, "Bob").with_shards(4), Strategy::Shard)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.balance, 100);
    assert_eq!(
        result.error_msg.as_deref(),
        Some("shard 2 failed checks [0]")
    );
}

#[tokio::test]
async fn unknown_user_fails_bootstrap() {
    let (url, _) = start_validator(vec![]).await;
    let config = ClientConfig::with_base_url(&url);
    let client = SubmissionClient::http(&config).unwrap();
    let result = Session::bootstrap(client, Some("Mallory"), config).await;
    assert!(matches!(result, Err(SessionError::UnknownUser(_))));
}

#[tokio::test]
async fn malformed_body_is_remote_validation_error() {
    let router = Router::new().route("/normal", post(|| async { "not json" }));
    let url = spawn(router).await;
    let config = ClientConfig::with_base_url(&url);
    let client = SubmissionClient::http(&config).unwrap();
    let account = ProvisionedAccount::generate("Alice", 100).unwrap();
    let session = Session::new(client, account, config);

    let err = session
        .send(TransferForm::new(1, "Bob"), Strategy::Serial)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Submit(SubmitError::RemoteValidation { .. })
    ));
    assert_eq!(session.snapshot().phase, Phase::Failed);
    assert_eq!(session.snapshot().balance, 100);
}

#[tokio::test]
async fn server_error_status_is_network_error() {
    let router = Router::new().route(
        "/normal",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = spawn(router).await;
    let config = ClientConfig::with_base_url(&url);
    let client = SubmissionClient::http(&config).unwrap();
    let account = ProvisionedAccount::generate("Alice", 100).unwrap();
    let session = Session::new(client, account, config);

    let err = session
        .send(TransferForm::new(1, "Bob"), Strategy::Serial)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Submit(SubmitError::Network { .. })));
}

#[tokio::test]
async fn slow_validator_times_out() {
    let router = Router::new().route(
        "/normal",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let url = spawn(router).await;
    let config = ClientConfig {
        submit_timeout: Duration::from_millis(200),
        ..ClientConfig::with_base_url(&url)
    };
    let client = SubmissionClient::http(&config).unwrap();
    let account = ProvisionedAccount::generate("Alice", 100).unwrap();
    let session = Session::new(client, account, config);

    let err = session
        .send(TransferForm::new(1, "Bob"), Strategy::Serial)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Submit(SubmitError::Network { .. })));
    assert!(!session.snapshot().loading);
}

#[tokio::test]
async fn replay_protected_transfers_carry_sequence_numbers() {
    let (url, ledger) = start_validator(vec![]).await;
    let config = ClientConfig {
        replay_protection: true,
        ..ClientConfig::with_base_url(&url)
    };
    let client = SubmissionClient::http(&config).unwrap();
    let session = Session::bootstrap(client, Some("Alice"), config)
        .await
        .unwrap();

    for _ in 0..2 {
        let result = session
            .send(TransferForm::new(5, "Bob").with_shards(2), Strategy::Shard)
            .await
            .unwrap();
        assert!(result.success);
    }

    let ledger = ledger.lock();
    let nonces: Vec<Option<u64>> = ledger
        .shard_requests
        .iter()
        .map(|r| decode(&r.transaction).unwrap().nonce)
        .collect();
    assert_eq!(nonces, vec![Some(0), Some(1)]);
    assert_eq!(ledger.balances["Alice"], 90);
}
