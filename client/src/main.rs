// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ShardPay Client
//!
//! Entry point for the `shardpay` binary. Parses CLI arguments, initializes
//! logging, bootstraps a session from the key-provisioning endpoint, and
//! drives submissions.
//!
//! - `users`   — list provisioned accounts
//! - `send`    — sign and submit one transfer
//! - `compare` — serial vs. sharded timing over a batch of transfers
//! - `keygen`  — write a fresh PEM keypair
//! - `version` — print build version information

mod cli;
mod keygen;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use shardpay_protocol::config::{DIGEST_ALGORITHM, PROTOCOL_VERSION, SIGNING_ALGORITHM};
use shardpay_protocol::metrics::SessionMetrics;
use shardpay_protocol::session::{Session, TransferForm};
use shardpay_protocol::submit::SubmissionClient;
use shardpay_protocol::verdict::{Strategy, TransactionResult};

use cli::{Commands, GlobalArgs, ShardpayCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ShardpayCli::parse();
    logging::init_logging(
        &cli.global.log_level,
        LogFormat::from_str_lossy(&cli.global.log_format),
    );

    match cli.command {
        Commands::Users => list_users(&cli.global).await,
        Commands::Send(args) => send(&cli.global, args).await,
        Commands::Compare(args) => compare(&cli.global, args).await,
        Commands::Keygen(args) => generate_key(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

async fn list_users(global: &GlobalArgs) -> Result<()> {
    let config = global.client_config(false);
    let client = SubmissionClient::http(&config).context("failed to build HTTP client")?;
    let accounts = client
        .fetch_accounts()
        .await
        .with_context(|| format!("failed to fetch accounts from {}", config.base_url))?;

    println!("{:<16} {:>12}  public key", "user", "balance");
    for account in &accounts {
        let key = account.public_key.lines().collect::<Vec<_>>().join("");
        println!("{:<16} {:>12}  {}", account.user, account.balance, key);
    }
    Ok(())
}

async fn send(global: &GlobalArgs, args: cli::SendArgs) -> Result<()> {
    let config = global.client_config(args.replay_protection);
    let metrics = session_metrics()?;
    let session = bootstrap(&config, args.user.as_deref())
        .await?
        .with_metrics(Arc::clone(&metrics));

    let form = TransferForm::new(args.amount, args.payee).with_shards(args.shards);
    let result = session
        .send(form, args.strategy)
        .await
        .context("transfer was not completed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_verdict(&result);
    }
    if args.print_metrics {
        print_metrics(&metrics)?;
    }
    Ok(())
}

/// Sends `count` transfers through each strategy and prints the mean time
/// the validator network reported for each.
async fn compare(global: &GlobalArgs, args: cli::CompareArgs) -> Result<()> {
    let config = global.client_config(false);
    let metrics = session_metrics()?;
    let session = bootstrap(&config, args.user.as_deref())
        .await?
        .with_metrics(Arc::clone(&metrics));

    for strategy in [Strategy::Serial, Strategy::Shard] {
        let mut times = Vec::with_capacity(args.count as usize);
        let mut accepted = 0u32;
        for i in 0..args.count {
            let form = TransferForm::new(args.amount, args.payee.as_str()).with_shards(args.shards);
            let result = session
                .send(form, strategy)
                .await
                .with_context(|| format!("{} transfer {} failed", strategy, i + 1))?;
            if result.success {
                accepted += 1;
            }
            times.push(result.time);
        }
        println!(
            "{:<8} transfers={:<4} accepted={:<4} mean={:.6}s",
            strategy.as_str(),
            times.len(),
            accepted,
            mean_secs(&times)
        );
    }

    if args.print_metrics {
        print_metrics(&metrics)?;
    }
    Ok(())
}

fn generate_key(args: cli::KeygenArgs) -> Result<()> {
    let generated = keygen::write_keypair(&args.out_dir, &args.name)?;
    println!("Keypair written.");
    println!("  Private key : {}", generated.private_key_path.display());
    println!("  Public key  : {}", generated.public_key_path.display());
    println!("  Hex         : {}", generated.public_key_hex);
    Ok(())
}

async fn bootstrap(
    config: &shardpay_protocol::config::ClientConfig,
    user: Option<&str>,
) -> Result<Session> {
    let client = SubmissionClient::http(config).context("failed to build HTTP client")?;
    let session = Session::bootstrap(client, user, config.clone())
        .await
        .with_context(|| format!("failed to bootstrap session from {}", config.base_url))?;
    let account = session.account();
    account
        .check_keypair()
        .with_context(|| format!("provisioned keys for `{}` do not match", account.user))?;
    Ok(session)
}

fn session_metrics() -> Result<Arc<SessionMetrics>> {
    SessionMetrics::new()
        .map(Arc::new)
        .map_err(|e| anyhow::anyhow!("failed to register metrics: {}", e))
}

fn print_metrics(metrics: &SessionMetrics) -> Result<()> {
    let text = metrics
        .encode()
        .map_err(|e| anyhow::anyhow!("failed to encode metrics: {}", e))?;
    print!("{}", text);
    Ok(())
}

fn print_verdict(result: &TransactionResult) {
    let outcome = if result.success { "accepted" } else { "rejected" };
    println!("{} ({})", outcome, result.strategy);
    println!("  time    : {:.6}s", result.time.as_secs_f64());
    println!("  balance : {}", result.balance);
    for shard in &result.shards {
        let votes: String = shard
            .validated_results
            .iter()
            .map(|ok| if *ok { '+' } else { '-' })
            .collect();
        println!("  shard {:<3}: {}", shard.id, votes);
    }
    if let Some(message) = &result.error_msg {
        println!("  error   : {}", message);
    }
}

/// Mean in seconds. Summed as `f64` because the times are remote-reported
/// and a `Duration` sum can overflow.
fn mean_secs(times: &[Duration]) -> f64 {
    if times.is_empty() {
        return 0.0;
    }
    times.iter().map(Duration::as_secs_f64).sum::<f64>() / times.len() as f64
}

/// Prints version information to stdout.
fn print_version() {
    for line in version_lines() {
        println!("{}", line);
    }
}

fn version_lines() -> Vec<String> {
    vec![
        format!("shardpay  {}", env!("CARGO_PKG_VERSION")),
        format!("protocol  {}", PROTOCOL_VERSION),
        format!("signing   {} over {}", SIGNING_ALGORITHM, DIGEST_ALGORITHM),
    ]
}
