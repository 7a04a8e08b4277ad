//! Internal HTTP client that talks to the agent's REST API.

use crate::core::{
    domain::{
        error::{NcpaError, NcpaResult, classify_error},
        model::ncpa_connection::NcpaConnection,
    },
    infrastructure::config::NcpaConfig,
};
use async_trait::async_trait;
use governor::DefaultDirectRateLimiter;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// Read access to the agent's API.
///
/// Collection services are written against this trait so they can be
/// exercised without a running agent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Fetches one endpoint and returns its error-checked JSON body.
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> NcpaResult<Value>;
}

/// Internal HTTP client that builds authenticated endpoint URLs and decodes replies.
///
/// The token travels as a query parameter on every request, and every
/// response body is checked for an agent `error` object before it is
/// handed back.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<NcpaConnection>,
    config: Arc<NcpaConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Errors
    /// Returns `NcpaError::Validation` for a zero rate limit and
    /// `NcpaError::Connection` if the HTTP client cannot be built.
    pub fn new(connection: NcpaConnection, config: NcpaConfig) -> NcpaResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.timeout)
            .build()
            .map_err(|e| NcpaError::Connection(e.to_string()))?;

        let rate_limiter = config
            .rate_limit
            .map(|rl| rl.quota())
            .transpose()?
            .map(|quota| Arc::new(DefaultDirectRateLimiter::direct(quota)));

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &NcpaConnection {
        &self.connection
    }

    pub fn config(&self) -> &NcpaConfig {
        &self.config
    }

    /// Performs a GET request against an endpoint below `/api/`.
    ///
    /// # Errors
    /// Returns the classified agent error when the body carries an `error`
    /// key, and `NcpaError::Connection` when the request fails, the status is
    /// not a success, or the body is not JSON.
    pub async fn get<K, V>(&self, endpoint: &str, params: &[(K, V)]) -> NcpaResult<Value>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.endpoint_url(endpoint, params)?;
        debug!(url = %url.redacted(), "Requesting NCPA endpoint");

        // reqwest errors embed the URL, and the URL embeds the token.
        let response = self
            .http_client
            .get(url.as_url().clone())
            .send()
            .await
            .map_err(|e| {
                NcpaError::Connection(format!("HTTP request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            NcpaError::Connection(format!("Failed to read response: {}", e.without_url()))
        })?;
        let output = serde_json::from_str::<Value>(&body);

        if let Ok(output) = &output {
            if let Some(err) = classify_error(output) {
                error!(endpoint, error = %err, "NCPA agent returned an error");
                return Err(err);
            }
        }

        if !status.is_success() {
            return Err(NcpaError::Connection(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        output.map_err(|e| NcpaError::Connection(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl AgentApi for ApiClient {
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> NcpaResult<Value> {
        self.get(endpoint, params).await
    }
}
