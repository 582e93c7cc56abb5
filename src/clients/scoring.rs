//! Batch safety-scoring client
//!
//! Submits a resolved ingredient list for evaluation. The orchestrator
//! guarantees the list is non-empty before calling. Scores come back opaque:
//! nothing here recomputes or normalizes them.

use crate::config::BackendConfig;
use crate::error::ScoringError;
use crate::models::{IngredientSafety, SafetyReport};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Batch scoring endpoint path
const BATCH_CHECK_PATH: &str = "/api/ocr/batch-check";

/// Rating label used when upstream omits an overall rating
const UNKNOWN_RATING: &str = "Unknown";

/// Batch safety evaluation of ingredient names
#[async_trait]
pub trait SafetyScoring: Send + Sync {
    /// Score a non-empty ingredient list
    ///
    /// # Errors
    /// - `ScoringError::Unreachable` on transport failure or non-success
    ///   response
    /// - `ScoringError::InvalidResponse` when the body parses but lacks the
    ///   per-ingredient result sequence entirely
    async fn score(&self, ingredients: &[String]) -> Result<SafetyReport, ScoringError>;
}

/// HTTP implementation of [`SafetyScoring`]
pub struct ScoringClient {
    http_client: Client,
    base_url: String,
}

impl ScoringClient {
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
impl SafetyScoring for ScoringClient {
    async fn score(&self, ingredients: &[String]) -> Result<SafetyReport, ScoringError> {
        debug!(count = ingredients.len(), "Requesting batch safety scoring");

        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, BATCH_CHECK_PATH))
            .json(&BatchCheckRequest { ingredients })
            .send()
            .await
            .map_err(|e| ScoringError::Unreachable(format!("scoring request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ScoringError::Unreachable(format!(
                "scoring service returned {}",
                response.status()
            )));
        }

        let body: BatchCheckResponse = response.json().await.map_err(|e| {
            ScoringError::InvalidResponse(format!("failed to parse scoring response: {}", e))
        })?;

        let report = report_from_response(body)?;

        debug!(
            overall = %report.overall_rating,
            scored = report.average_score.is_some(),
            entries = report.per_ingredient.len(),
            "Batch scoring complete"
        );

        Ok(report)
    }
}

/// Lift the wire response into a report
///
/// A missing `results` sequence is invalid. A present-but-empty one is a
/// valid outcome. A missing overall rating becomes the literal `"Unknown"`
/// label, and a missing average score stays `None`, an explicit unscored
/// marker, never conflated with 0.
fn report_from_response(body: BatchCheckResponse) -> Result<SafetyReport, ScoringError> {
    let results = body.results.ok_or_else(|| {
        ScoringError::InvalidResponse("response missing per-ingredient results".to_string())
    })?;

    Ok(SafetyReport {
        overall_rating: body
            .overall_rating
            .unwrap_or_else(|| UNKNOWN_RATING.to_string()),
        average_score: body.average_score,
        per_ingredient: results
            .into_iter()
            .map(|entry| IngredientSafety {
                ingredient: entry.ingredient,
                safety_score: entry.safety_score,
                rating: entry.rating.unwrap_or_else(|| UNKNOWN_RATING.to_string()),
                hazards: entry.hazards,
            })
            .collect(),
    })
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct BatchCheckRequest<'a> {
    ingredients: &'a [String],
}

#[derive(Debug, Deserialize)]
struct BatchCheckResponse {
    overall_rating: Option<String>,
    average_score: Option<f64>,
    results: Option<Vec<IngredientResultEntry>>,
}

#[derive(Debug, Deserialize)]
struct IngredientResultEntry {
    ingredient: String,
    safety_score: f64,
    rating: Option<String>,
    #[serde(default)]
    hazards: Vec<String>,
}
