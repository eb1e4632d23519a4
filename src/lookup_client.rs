use crate::errors::AppError;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the external intelligence lookup provider.
///
/// Stateless adapter: one normalized query string in, one raw structured
/// payload (or fault) out. The provider is paid per query, so callers must
/// only invoke this after the credit gate has passed.
#[derive(Clone)]
pub struct LookupClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl LookupClient {
    /// Creates a new `LookupClient` with a bounded request timeout.
    pub fn new(base_url: String, token: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create lookup client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Runs one lookup against the provider.
    ///
    /// Transport failures and timeouts surface as `UpstreamUnavailable`;
    /// a reachable provider answering non-2xx or with an unparseable body
    /// surfaces as `UpstreamError`. No retries here: a fault is terminal
    /// for the current request.
    pub async fn search(&self, query: &str) -> Result<Value, AppError> {
        tracing::info!("Querying lookup provider");

        let body = json!({
            "token": self.token,
            "request": query,
            "limit": 1000,
            "lang": "en",
            "type": "json",
        });

        let response = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await
            .map_err(AppError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError(format!(
                "Lookup provider returned {}: {}",
                status, error_text
            )));
        }

        let data: Value = response.json().await.map_err(|e| {
            AppError::UpstreamError(format!("Failed to parse lookup provider response: {}", e))
        })?;

        Ok(data)
    }
}
