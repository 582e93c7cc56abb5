//! Remote service clients
//!
//! One module per backend service. Each defines the service trait the
//! orchestration layer depends on, plus the reqwest implementation and its
//! private wire types. Tests implement the traits directly instead of
//! mocking HTTP.

pub mod catalog;
pub mod extraction;
pub mod scoring;

pub use catalog::{CatalogClient, CatalogLookup, CatalogMatch};
pub use extraction::{ExtractionClient, LabelExtraction, TextExtraction};
pub use scoring::{SafetyScoring, ScoringClient};
