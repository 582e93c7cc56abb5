//! # safescan
//!
//! Orchestration core for a consumer product-safety lookup tool:
//! - Two acquisition paths (photographed label, barcode catalog lookup)
//!   resolved into one normalized ingredient list
//! - Conditional batch safety scoring of the resolved ingredients
//! - A race-free merge into a single immutable result snapshot, guarded
//!   against late results from superseded sessions
//! - An independent review-sentiment summary fetcher
//!
//! The rendering layer is a consumer of this crate, not part of it. The
//! four backend services are opaque HTTP collaborators.

pub mod clients;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod orchestrator;
pub mod resolver;
pub mod sentiment;

pub use config::BackendConfig;
pub use error::{AcquisitionError, Error, FetchError, Result, ScoringError};
pub use events::{EventBus, ScanEvent};
pub use models::{
    ScanInput, ScanMode, ScanResult, ScanSession, ScanStatus, SentimentSummary,
};
pub use orchestrator::ScanOrchestrator;
pub use sentiment::{SentimentFetcher, SummaryState};
