//! Scan session state machine and result model
//!
//! A session progresses through:
//! Idle → ResolvingSource → { ScoringIngredients | Complete | Failed }
//! → { Complete | Failed }
//!
//! `Complete` and `Failed` are terminal; no state is ever re-entered within
//! one session. A scoring failure does not fail the session; it completes
//! without a safety report and records the failure as a warning.

use crate::error::{AcquisitionError, ScoringError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Acquisition path chosen before the session starts; fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    /// Photographed label, resolved via the text-extraction service
    Image,
    /// Barcode string, resolved via the catalog service
    Barcode,
}

/// Session workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    /// Created but not yet started
    Idle,
    /// Acquisition call in flight (extraction or catalog lookup)
    ResolvingSource,
    /// Batch safety-scoring call in flight
    ScoringIngredients,
    /// Terminal: result populated
    Complete,
    /// Terminal: acquisition failed, error populated
    Failed,
}

/// User-supplied input for one lookup attempt
#[derive(Debug, Clone)]
pub enum ScanInput {
    /// Opaque image payload (label photo)
    Image(Vec<u8>),
    /// Barcode identifier, non-empty, validated by the caller
    Barcode(String),
}

impl ScanInput {
    /// Acquisition mode implied by this input
    pub fn mode(&self) -> ScanMode {
        match self {
            ScanInput::Image(_) => ScanMode::Image,
            ScanInput::Barcode(_) => ScanMode::Barcode,
        }
    }
}

/// Product identity returned by a matched catalog lookup
///
/// Fields are optional because the catalog omits them freely; a missing name
/// is not the same as an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub source: Option<String>,
}

/// Safety evaluation of a single ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSafety {
    pub ingredient: String,
    pub safety_score: f64,
    pub rating: String,
    /// Named risk flags, possibly empty
    pub hazards: Vec<String>,
}

/// Batch scoring outcome
///
/// Scores are opaque to the orchestrator: passed through as returned, never
/// recomputed. Entry order is whatever upstream sent and does not
/// necessarily match input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyReport {
    /// Label such as "Safe" / "Moderate"; `"Unknown"` when upstream omitted it
    pub overall_rating: String,
    /// `None` means unscored, distinct from a real score of 0
    pub average_score: Option<f64>,
    pub per_ingredient: Vec<IngredientSafety>,
}

/// Output of the acquisition step, before scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionResult {
    pub extracted_text: String,
    pub ingredients: Vec<String>,
    /// Present only for a matched barcode lookup
    pub product_metadata: Option<ProductMetadata>,
}

/// The merged, displayable outcome of a session; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Raw label text; possibly empty, always present on completion
    pub extracted_text: String,
    /// Ordered ingredient names; may be empty
    pub ingredients: Vec<String>,
    /// Present iff the session was barcode-mode and the catalog matched
    pub product_metadata: Option<ProductMetadata>,
    /// Present iff ingredients were non-empty and the scoring call succeeded
    pub safety_report: Option<SafetyReport>,
}

/// One user-initiated lookup attempt (in-memory snapshot)
#[derive(Debug, Clone)]
pub struct ScanSession {
    /// Unique session identifier
    pub session_id: Uuid,
    /// Monotonically increasing identity; commits from a lower generation
    /// than the currently displayed session are discarded
    pub generation: u64,
    /// Acquisition mode, fixed at start
    pub mode: ScanMode,
    /// Current workflow state
    pub status: ScanStatus,
    /// The input that started the session, fixed at start
    pub input: Arc<ScanInput>,
    /// Populated only when `status == Complete`
    pub result: Option<ScanResult>,
    /// Populated only when `status == Failed`
    pub error: Option<AcquisitionError>,
    /// Non-fatal scoring failure recorded on an otherwise complete session
    pub scoring_warning: Option<ScoringError>,
    /// Session start time
    pub started_at: DateTime<Utc>,
    /// Set when a terminal state is entered
    pub ended_at: Option<DateTime<Utc>>,
}

impl ScanSession {
    /// Create a new session in `Idle` with the given identity
    pub fn new(generation: u64, input: ScanInput) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            generation,
            mode: input.mode(),
            status: ScanStatus::Idle,
            input: Arc::new(input),
            result: None,
            error: None,
            scoring_warning: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to a new state, stamping `ended_at` on terminal states
    pub fn transition_to(&mut self, new_status: ScanStatus) {
        self.status = new_status;
        if self.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
    }

    /// Whether the session has reached `Complete` or `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, ScanStatus::Complete | ScanStatus::Failed)
    }
}

/// Pre-aggregated review sentiment, fetched independently of any session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub total_reviews: u64,
    pub sentiment_distribution: SentimentDistribution,
    pub percentages: SentimentPercentages,
    pub average_sentiment_score: f64,
    pub average_rating: f64,
    pub top_issues: Vec<TopIssue>,
}

/// Review counts per sentiment class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

/// Share of reviews per sentiment class, 0–100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPercentages {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// A frequently reported issue and its report count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopIssue {
    pub issue: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_idle_with_mode_from_input() {
        let session = ScanSession::new(1, ScanInput::Barcode("4005900001504".into()));
        assert_eq!(session.status, ScanStatus::Idle);
        assert_eq!(session.mode, ScanMode::Barcode);
        assert_eq!(session.generation, 1);
        assert!(session.result.is_none());
        assert!(session.error.is_none());
        assert!(session.ended_at.is_none());
    }

    #[test]
    fn terminal_transition_stamps_end_time() {
        let mut session = ScanSession::new(1, ScanInput::Image(vec![0u8; 4]));
        session.transition_to(ScanStatus::ResolvingSource);
        assert!(!session.is_terminal());
        assert!(session.ended_at.is_none());

        session.transition_to(ScanStatus::Complete);
        assert!(session.is_terminal());
        assert!(session.ended_at.is_some());
    }

    #[test]
    fn failed_is_terminal() {
        let mut session = ScanSession::new(2, ScanInput::Barcode("123".into()));
        session.transition_to(ScanStatus::Failed);
        assert!(session.is_terminal());
    }

    #[test]
    fn safety_report_roundtrips_unscored_marker() {
        let report = SafetyReport {
            overall_rating: "Unknown".into(),
            average_score: None,
            per_ingredient: vec![],
        };
        let json = serde_json::to_string(&report).expect("serialize");
        assert!(json.contains("\"average_score\":null"));
        let back: SafetyReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.average_score, None);
    }
}
