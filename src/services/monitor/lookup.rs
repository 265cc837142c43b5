use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::{LookupError, MonitorTarget, StatusReport};

/// External status source polled by the monitor.
///
/// Implementations own their own request timeout; the poller never cancels a lookup.
#[async_trait]
pub trait StatusLookup: Send + Sync {
    async fn fetch_status(&self, target: &MonitorTarget) -> Result<StatusReport, LookupError>;
}

/// Status API client
/// Queries `GET {base_url}/connection-state/{target}` and expects `{"status": "..."}`
pub struct HttpStatusLookup {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpStatusLookup {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn status_url(&self, target: &MonitorTarget) -> String {
        format!("{}/connection-state/{}", self.base_url, target)
    }
}

#[async_trait]
impl StatusLookup for HttpStatusLookup {
    async fn fetch_status(&self, target: &MonitorTarget) -> Result<StatusReport, LookupError> {
        let mut request = self.client.get(self.status_url(target));
        if !self.api_key.is_empty() {
            request = request.header("API-Key", &self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LookupError::Api {
                status: response.status().as_u16(),
            });
        }

        response
            .json::<StatusReport>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))
    }
}
