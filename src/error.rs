//! Error types for safescan
//!
//! Acquisition, scoring, and sentiment failures are kept as separate enums
//! because they terminate differently: an acquisition failure ends the
//! session, a scoring failure only degrades it, and a sentiment failure is
//! invisible to the scan flow entirely.
//!
//! Transport errors are flattened to `String` payloads at the client
//! boundary so session snapshots (which carry their error) stay `Clone`.

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of the acquisition step (image extraction or catalog lookup)
///
/// Terminal for the session. `NotFound` is a normal outcome of a barcode
/// lookup, not a transport fault; callers use it to suggest switching to
/// image mode instead of showing a generic error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AcquisitionError {
    /// Text-extraction call failed: transport error, non-success response,
    /// or a response missing the expected fields
    #[error("label extraction failed: {0}")]
    ExtractionFailed(String),

    /// Catalog reported no entry for this barcode
    #[error("no catalog entry for barcode {0}")]
    NotFound(String),
}

/// Failure of the batch safety-scoring call
///
/// Never terminal: the session still completes without a safety report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoringError {
    /// Transport failure or non-success response from the scoring service
    #[error("scoring service unreachable: {0}")]
    Unreachable(String),

    /// Response parsed but the per-ingredient result sequence is missing
    #[error("invalid scoring response: {0}")]
    InvalidResponse(String),
}

/// Failure of the sentiment-summary fetch
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure or non-success response from the sentiment service
    #[error("sentiment service unreachable: {0}")]
    Unreachable(String),

    /// Response body did not carry the expected summary payload
    #[error("invalid sentiment response: {0}")]
    InvalidResponse(String),
}

/// Top-level error for code that sits above the session flow (config
/// loading, the CLI)
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
