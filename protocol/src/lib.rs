// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ShardPay Protocol — Core Library
//!
//! Client side of a small payment proof of concept: transfers are encoded
//! into a canonical string, signed, and sent to a validator network that
//! checks them either serially (one validator runs every check) or sharded
//! (several validators vote, and every vote must pass).
//!
//! ## Architecture
//!
//! - **crypto** — SHA-256 and Ed25519 wrappers, PEM and hex key handling.
//! - **transaction** — canonical encoding and signing.
//! - **verdict** — shard reports, results, and the aggregation rule.
//! - **submit** — transport seam, HTTP transport, and verdict validation.
//! - **provisioning** — the bootstrap account record.
//! - **session** — caller-visible state and the one-in-flight guard.
//! - **metrics** — Prometheus counters for sessions.
//! - **config** — protocol constants and runtime settings.
//!
//! ## Example
//!
//! ```
//! use shardpay_protocol::crypto::WalletKeypair;
//! use shardpay_protocol::transaction::{sign_transaction, Transaction};
//!
//! let keypair = WalletKeypair::generate();
//! let pem = keypair.to_pem().unwrap();
//! let tx = Transaction::transfer(25, "alice", keypair.public_key().to_hex(), "bob");
//! let signed = sign_transaction(tx, &pem).unwrap();
//! assert!(signed.verify().is_ok());
//! assert!(signed.canonical().starts_with("25:alice:"));
//! ```

pub mod config;
pub mod crypto;
pub mod metrics;
pub mod provisioning;
pub mod session;
pub mod submit;
pub mod transaction;
pub mod verdict;
