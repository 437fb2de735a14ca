//! # CLI Interface
//!
//! Command-line structure for `shardpay`, built with `clap` derive.
//! Connection and logging options are global and fall back to
//! `SHARDPAY_*` environment variables.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use shardpay_protocol::config::{self, ClientConfig};
use shardpay_protocol::verdict::Strategy;

/// ShardPay client.
///
/// Signs transfers with a provisioned key and submits them to the
/// validator network, either to a single validator or to a set of shards
/// that must all agree.
#[derive(Parser, Debug)]
#[command(
    name = "shardpay",
    about = "ShardPay validator network client",
    version,
    propagate_version = true
)]
pub struct ShardpayCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Base URL of the validator network.
    #[arg(long, global = true, env = "SHARDPAY_URL", default_value = config::DEFAULT_BASE_URL)]
    pub url: String,

    /// Request timeout in milliseconds. Expiry counts as a network error.
    #[arg(long, global = true, env = "SHARDPAY_TIMEOUT_MS", default_value_t = config::DEFAULT_SUBMIT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Log output format: pretty or json.
    #[arg(long, global = true, env = "SHARDPAY_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Default log directive when RUST_LOG is unset.
    #[arg(long, global = true, env = "SHARDPAY_LOG_LEVEL", default_value = "shardpay_cli=info,shardpay_protocol=info")]
    pub log_level: String,
}

impl GlobalArgs {
    pub fn client_config(&self, replay_protection: bool) -> ClientConfig {
        ClientConfig {
            submit_timeout: Duration::from_millis(self.timeout_ms),
            replay_protection,
            ..ClientConfig::with_base_url(self.url.as_str())
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List provisioned accounts. Private keys are never printed.
    Users,
    /// Send one transfer and print the verdict.
    Send(SendArgs),
    /// Submit a batch through each strategy and compare reported times.
    Compare(CompareArgs),
    /// Generate a PEM keypair into a directory.
    Keygen(KeygenArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Provisioned user to send from. Defaults to the first account.
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Recipient identifier.
    #[arg(long, short = 'p')]
    pub payee: String,

    /// Amount in minor units.
    #[arg(long, short = 'a')]
    pub amount: u64,

    /// Validation strategy: serial or shard.
    #[arg(long, short = 's', default_value = "serial")]
    pub strategy: Strategy,

    /// Shard count for the shard strategy. Values above 10 are clamped.
    #[arg(long, default_value_t = config::DEFAULT_SHARDS)]
    pub shards: u32,

    /// Append a sequence number to the signed transaction.
    #[arg(long, env = "SHARDPAY_REPLAY_PROTECTION")]
    pub replay_protection: bool,

    /// Print the verdict as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print session metrics after the run.
    #[arg(long)]
    pub print_metrics: bool,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    #[arg(long, short = 'p')]
    pub payee: String,

    /// Amount per transfer.
    #[arg(long, short = 'a', default_value_t = 1)]
    pub amount: u64,

    /// Transfers per strategy.
    #[arg(long, short = 'n', default_value_t = 10)]
    pub count: u32,

    #[arg(long, default_value_t = config::DEFAULT_SHARDS)]
    pub shards: u32,

    #[arg(long)]
    pub print_metrics: bool,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory, created if missing.
    #[arg(long, short = 'o', default_value = ".")]
    pub out_dir: PathBuf,

    /// File stem for `<name>.pem` and `<name>.pub.pem`.
    #[arg(long, default_value = "wallet")]
    pub name: String,
}
