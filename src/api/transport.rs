//! Transport capability for the remote boards service.
//!
//! One round trip per call, nothing else: retries, backoff and rate
//! limiting are deliberately absent — a failed call surfaces to the
//! operator, who retries by hand.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::RemoteError;

/// Default GraphQL endpoint of the boards service.
pub const DEFAULT_ENDPOINT: &str = "https://api.monday.com/v2";

/// API version pinned for all requests.
pub const API_VERSION: &str = "2024-10";

/// A single query/mutation round trip against the remote service.
///
/// Implementations return the response's `data` object with service-level
/// errors already folded into [`RemoteError`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, RemoteError>;
}

/// HTTP transport speaking the service's GraphQL dialect.
#[derive(Clone)]
pub struct HttpTransport {
    endpoint: String,
    http_client: reqwest::Client,
    api_token: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, api_token: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("buyer-intake/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            endpoint: endpoint.into(),
            http_client,
            api_token: api_token.into(),
        }
    }

    /// Build a transport from the environment (`.env` honored):
    /// `MONDAY_API_TOKEN`, optional `MONDAY_API_ENDPOINT`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_token = std::env::var("MONDAY_API_TOKEN")?;
        let endpoint =
            std::env::var("MONDAY_API_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        Ok(Self::new(endpoint, api_token))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, RemoteError> {
        log::debug!("POST {} query: {}", self.endpoint, first_line(query));

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", &self.api_token)
            .header("API-Version", API_VERSION)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("service returned {}: {}", status, body);
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = response.json().await?;

        // A 200 can still carry query-level errors.
        if let Some(errors) = envelope.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let message = errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("; ");
                log::error!("service error: {}", message);
                return Err(RemoteError::Api(message));
            }
        }

        envelope
            .get("data")
            .cloned()
            .ok_or_else(|| RemoteError::Shape("response has no data object".into()))
    }
}

fn first_line(query: &str) -> &str {
    query.lines().next().unwrap_or(query).trim()
}
