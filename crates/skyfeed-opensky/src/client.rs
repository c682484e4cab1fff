//! OpenSky Network HTTP client.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use skyfeed_core::{BoundingBox, FeedError, FlightFeed, FlightRecord};

use crate::state_vector::{normalize_states, StatesResponse};

pub const DEFAULT_BASE_URL: &str = "https://opensky-network.org/api";

/// HTTP client for the OpenSky `states/all` endpoint.
pub struct OpenSkyClient {
    client: Client,
    base_url: String,
}

impl OpenSkyClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn states_url(&self, bbox: &BoundingBox) -> String {
        format!(
            "{}/states/all?lamin={}&lomin={}&lamax={}&lomax={}",
            self.base_url, bbox.south, bbox.west, bbox.north, bbox.east
        )
    }

    /// Fetch and normalize all aircraft inside `bbox`.
    pub async fn fetch_states(&self, bbox: &BoundingBox) -> Result<Vec<FlightRecord>, FeedError> {
        let url = self.states_url(bbox);
        tracing::debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited);
        }
        if !status.is_success() {
            return Err(FeedError::Unavailable(format!("HTTP {}", status)));
        }

        let body: StatesResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Unavailable(format!("invalid body: {}", e)))?;

        let (records, dropped) = normalize_states(&body);
        if dropped > 0 {
            tracing::warn!("Dropped {} malformed aircraft rows", dropped);
        }
        tracing::info!("Received {} aircraft from OpenSky", records.len());
        Ok(records)
    }
}

impl FlightFeed for OpenSkyClient {
    fn fetch(
        &self,
        bbox: &BoundingBox,
    ) -> impl Future<Output = Result<Vec<FlightRecord>, FeedError>> + Send {
        let bbox = *bbox;
        async move { self.fetch_states(&bbox).await }
    }
}
