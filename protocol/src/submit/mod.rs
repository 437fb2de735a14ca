//! # Submission
//!
//! Delivers signed transactions to the validator network and reads back
//! verdicts.
//!
//! ```text
//! types.rs     — SubmitError, request and raw verdict shapes
//! transport.rs — ValidatorTransport seam and the reqwest implementation
//! client.rs    — SubmissionClient: timeout, routing, verdict checks
//! ```
//!
//! Errors split in two. [`SubmitError::Network`] means nothing usable came
//! back (refused, non-2xx, timed out). [`SubmitError::RemoteValidation`]
//! means a reply arrived but was not a well-formed verdict. A well-formed
//! rejection is not an error: it is a [`TransactionResult`](crate::verdict::TransactionResult)
//! with `success == false`.

pub mod client;
pub mod transport;
pub mod types;

pub use client::{interpret, SubmissionClient};
pub use transport::{HttpTransport, ValidatorTransport};
pub use types::{SubmitError, SubmitRequest, WireVerdict};
