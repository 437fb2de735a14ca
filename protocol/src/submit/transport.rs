//! Transport seam between the submission client and the validator network.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::types::{SubmitError, SubmitRequest, WireVerdict};
use crate::config::{self, ClientConfig};
use crate::provisioning::ProvisionedAccount;
use crate::verdict::Strategy;

/// Validator network interface.
#[async_trait]
pub trait ValidatorTransport: Send + Sync {
    /// Fetches the provisioned accounts.
    async fn fetch_accounts(&self) -> Result<Vec<ProvisionedAccount>, SubmitError>;

    /// Posts `request` to the endpoint for `strategy` and returns the raw
    /// verdict.
    async fn submit(
        &self,
        strategy: Strategy,
        request: &SubmitRequest,
    ) -> Result<WireVerdict, SubmitError>;
}

/// JSON-over-HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client used for every call.
    client: reqwest::Client,
    /// Base URL and timeouts.
    config: ClientConfig,
}

impl HttpTransport {
    /// Creates an HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Network`] when HTTP client creation fails.
    pub fn new(config: ClientConfig) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(config.submit_timeout)
            .connect_timeout(config::CONNECT_TIMEOUT)
            .build()
            .map_err(|error| SubmitError::network(error.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn route(&self, strategy: Strategy) -> String {
        match strategy {
            Strategy::Serial => self.config.endpoint(config::SERIAL_PATH),
            Strategy::Shard => self.config.endpoint(config::SHARD_PATH),
        }
    }
}

#[async_trait]
impl ValidatorTransport for HttpTransport {
    async fn fetch_accounts(&self) -> Result<Vec<ProvisionedAccount>, SubmitError> {
        let url = self.config.endpoint(config::PROVISIONING_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|error| SubmitError::network(error.to_string()))?;
        read_json(response).await
    }

    async fn submit(
        &self,
        strategy: Strategy,
        request: &SubmitRequest,
    ) -> Result<WireVerdict, SubmitError> {
        let url = self.route(strategy);
        tracing::debug!(%url, %strategy, "posting transaction");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|error| SubmitError::network(error.to_string()))?;
        read_json(response).await
    }
}

/// Status check, then body, then decode. Transport problems are
/// [`SubmitError::Network`]; a body that is not the expected JSON is
/// [`SubmitError::RemoteValidation`].
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SubmitError> {
    let response = response
        .error_for_status()
        .map_err(|error| SubmitError::network(error.to_string()))?;
    let body = response
        .bytes()
        .await
        .map_err(|error| SubmitError::network(error.to_string()))?;
    serde_json::from_slice(&body)
        .map_err(|error| SubmitError::remote(format!("malformed response body: {}", error)))
}
