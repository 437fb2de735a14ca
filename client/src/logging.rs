//! # Structured Logging
//!
//! Installs the `tracing` subscriber: pretty or JSON output, filtered by
//! `RUST_LOG` when set. Everything goes to stderr so that stdout carries
//! only command output (verdict JSON, key material paths, metrics text).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for terminals.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Accepts "json" or "pretty", case-insensitive. Anything else is
    /// `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once, early in `main()`. A second call panics.
///
/// # Arguments
///
/// * `default_level` - Filter used when `RUST_LOG` is unset. Comes from
///   `--log-level` / `SHARDPAY_LOG_LEVEL`, e.g. `"info"` or
///   `"shardpay_cli=info,shardpay_protocol=debug"`.
/// * `format` - Pretty for terminals, JSON for log shippers.
///
/// # Environment
///
/// `RUST_LOG` replaces `default_level` entirely when set. Directives use
/// the `EnvFilter` syntax. Raising `shardpay_protocol` to `debug` shows
/// the payload hash of each signed transfer:
///
/// ```text
/// RUST_LOG=shardpay_cli=debug,shardpay_protocol=debug,reqwest=warn
/// ```
pub fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_ids(false),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }

    tracing::debug!("logging initialized (format={:?})", format);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_is_lenient() {
        assert_eq!(LogFormat::from_str_lossy("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_lossy("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str_lossy("yaml"), LogFormat::Pretty);
    }

    #[test]
    fn documented_directives_parse() {
        for directive in [
            "info",
            "shardpay_cli=info,shardpay_protocol=debug",
            "shardpay_cli=debug,shardpay_protocol=debug,reqwest=warn",
        ] {
            assert!(EnvFilter::try_new(directive).is_ok(), "{}", directive);
        }
    }
}
