//! Client for the external AI service that scores applications.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use jobhub_types::api::AnalysisRequest;

const ANALYZE_ENDPOINT: &str = "/analyze";

pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Posts the application with its posting and returns the service's JSON untouched.
    pub async fn analyze(&self, payload: &AnalysisRequest) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, ANALYZE_ENDPOINT);
        debug!("Calling analysis service: {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .context("Failed to call analysis service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Analysis service returned {}: {}", status, body);
            anyhow::bail!("analysis service returned status {}", status);
        }

        response
            .json::<serde_json::Value>()
            .await
            .context("Analysis service sent invalid JSON")
    }
}
