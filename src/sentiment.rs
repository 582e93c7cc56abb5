//! Review-sentiment summary fetcher
//!
//! Independent of the scan flow: one read-only request, no merging, no
//! session identity. The holder keeps a tri-state value so the UI can
//! distinguish "still loading" from "failed" from "loaded"; stale or
//! placeholder data is never presented as live.

use crate::config::BackendConfig;
use crate::error::FetchError;
use crate::events::{EventBus, ScanEvent};
use crate::models::SentimentSummary;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Sentiment summary endpoint path
const SENTIMENT_SUMMARY_PATH: &str = "/api/sentiment/summary";

/// Source of the pre-aggregated review sentiment summary
#[async_trait]
pub trait SentimentSource: Send + Sync {
    /// Fetch the current summary
    ///
    /// # Errors
    /// `FetchError::Unreachable` on transport failure or a non-success
    /// response; `FetchError::InvalidResponse` when the body lacks the
    /// summary payload.
    async fn fetch_summary(&self) -> Result<SentimentSummary, FetchError>;
}

/// HTTP implementation of [`SentimentSource`]
pub struct SentimentClient {
    http_client: Client,
    base_url: String,
}

impl SentimentClient {
    /// Create a client against the configured backend
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(config.timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl SentimentSource for SentimentClient {
    async fn fetch_summary(&self) -> Result<SentimentSummary, FetchError> {
        debug!("Fetching sentiment summary");

        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, SENTIMENT_SUMMARY_PATH))
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(format!("sentiment request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Unreachable(format!(
                "sentiment service returned {}",
                response.status()
            )));
        }

        let body: SentimentEnvelope = response.json().await.map_err(|e| {
            FetchError::InvalidResponse(format!("failed to parse sentiment response: {}", e))
        })?;

        let summary = body.data.ok_or_else(|| {
            FetchError::InvalidResponse("response missing summary payload".to_string())
        })?;

        debug!(
            total_reviews = summary.total_reviews,
            "Sentiment summary loaded"
        );

        Ok(summary)
    }
}

/// Tri-state for the sentiment panel: exactly one of these is true at any
/// moment, and a failure is never rendered as data
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryState {
    /// Fetch in flight (also the initial state)
    Loading,
    /// Last fetch succeeded
    Loaded(SentimentSummary),
    /// Last fetch failed
    Failed(FetchError),
}

/// Holds the current [`SummaryState`] across on-demand refreshes
#[derive(Clone)]
pub struct SentimentFetcher {
    source: Arc<dyn SentimentSource>,
    state: Arc<RwLock<SummaryState>>,
    event_bus: EventBus,
}

impl SentimentFetcher {
    pub fn new(source: Arc<dyn SentimentSource>, event_bus: EventBus) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(SummaryState::Loading)),
            event_bus,
        }
    }

    /// Wire up the HTTP client for a backend
    pub fn with_backend(config: &BackendConfig, event_bus: EventBus) -> Self {
        Self::new(Arc::new(SentimentClient::new(config)), event_bus)
    }

    /// Current state of the summary panel
    pub async fn state(&self) -> SummaryState {
        self.state.read().await.clone()
    }

    /// Fetch the summary and settle into `Loaded` or `Failed`
    pub async fn refresh(&self) {
        {
            let mut state = self.state.write().await;
            *state = SummaryState::Loading;
        }

        match self.source.fetch_summary().await {
            Ok(summary) => {
                self.event_bus.emit_lossy(ScanEvent::SentimentLoaded {
                    total_reviews: summary.total_reviews,
                    timestamp: Utc::now(),
                });
                let mut state = self.state.write().await;
                *state = SummaryState::Loaded(summary);
            }
            Err(error) => {
                tracing::warn!(error = %error, "Sentiment summary unavailable");
                self.event_bus.emit_lossy(ScanEvent::SentimentFailed {
                    error: error.to_string(),
                    timestamp: Utc::now(),
                });
                let mut state = self.state.write().await;
                *state = SummaryState::Failed(error);
            }
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// The backend wraps the summary in a `data` envelope
#[derive(Debug, Deserialize)]
struct SentimentEnvelope {
    data: Option<SentimentSummary>,
}
