//! Scan session orchestrator
//!
//! Drives one lookup end to end: resolve the input through the matching
//! acquisition strategy, conditionally score the resolved ingredients, and
//! merge everything into one immutable `ScanResult`.
//!
//! Concurrency model: all sub-calls for a session run inside that session's
//! own task. The only shared mutable state is the "currently displayed
//! session" slot. Every state transition replaces the whole snapshot through
//! [`ScanOrchestrator::commit`], which compares session generations and
//! drops writes from a superseded session, so a late-arriving resolution or
//! scoring result can never overwrite a newer session's state. Starting a
//! new session is the only cancellation trigger; in-flight calls of the old
//! session are treated as idempotent reads and simply discarded on arrival.
//!
//! The final result is always assembled from values local to the session
//! task, captured after every issued sub-call has settled, never by reading
//! back the shared slot.

use crate::clients::{CatalogLookup, SafetyScoring, TextExtraction};
use crate::config::BackendConfig;
use crate::events::{EventBus, ScanEvent};
use crate::models::{ScanInput, ScanResult, ScanSession, ScanStatus};
use crate::resolver::SourceResolver;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Session orchestrator; cheap to clone, clones share all state
#[derive(Clone)]
pub struct ScanOrchestrator {
    resolver: Arc<SourceResolver>,
    scoring: Arc<dyn SafetyScoring>,
    event_bus: EventBus,
    /// The single "currently displayed session" slot
    current: Arc<RwLock<Option<ScanSession>>>,
    /// Source of monotonically increasing session identities
    next_generation: Arc<AtomicU64>,
}

impl ScanOrchestrator {
    /// Create an orchestrator over explicit service implementations
    pub fn new(
        extraction: Arc<dyn TextExtraction>,
        catalog: Arc<dyn CatalogLookup>,
        scoring: Arc<dyn SafetyScoring>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            resolver: Arc::new(SourceResolver::new(extraction, catalog)),
            scoring,
            event_bus,
            current: Arc::new(RwLock::new(None)),
            next_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create an orchestrator wired to the HTTP clients for a backend
    pub fn with_backend(config: &BackendConfig, event_bus: EventBus) -> Self {
        Self::new(
            Arc::new(crate::clients::ExtractionClient::new(config)),
            Arc::new(crate::clients::CatalogClient::new(config)),
            Arc::new(crate::clients::ScoringClient::new(config)),
            event_bus,
        )
    }

    /// Start a session for a photographed label
    pub async fn start_image_session(&self, image: Vec<u8>) -> Uuid {
        self.start_session(ScanInput::Image(image)).await
    }

    /// Start a session for a barcode lookup
    ///
    /// The barcode is expected non-empty; callers validate before starting.
    pub async fn start_barcode_session(&self, barcode: impl Into<String>) -> Uuid {
        self.start_session(ScanInput::Barcode(barcode.into())).await
    }

    /// Read the currently displayed session state
    pub async fn current_session(&self) -> Option<ScanSession> {
        self.current.read().await.clone()
    }

    /// Subscribe to state-transition events
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.event_bus.subscribe()
    }

    /// The bus events are emitted on
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Create the session, take ownership of the displayed slot, and spawn
    /// its task. Returns the session id immediately; progress is observable
    /// via [`Self::current_session`] and [`Self::subscribe`].
    async fn start_session(&self, input: ScanInput) -> Uuid {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut session = ScanSession::new(generation, input);
        session.transition_to(ScanStatus::ResolvingSource);
        let session_id = session.session_id;

        tracing::info!(
            session_id = %session_id,
            generation = generation,
            mode = ?session.mode,
            "Starting scan session"
        );

        // A fresh session always carries the highest generation, so this
        // write supersedes whatever was displayed before.
        {
            let mut slot = self.current.write().await;
            *slot = Some(session.clone());
        }

        self.event_bus.emit_lossy(ScanEvent::SessionStarted {
            session_id,
            mode: session.mode,
            timestamp: Utc::now(),
        });

        let this = self.clone();
        tokio::spawn(async move {
            this.run_session(session).await;
        });

        session_id
    }

    /// Execute one session to its terminal state
    async fn run_session(&self, mut session: ScanSession) {
        let session_id = session.session_id;
        let input = Arc::clone(&session.input);

        let acquisition = match self.resolver.resolve(&input).await {
            Ok(acquisition) => acquisition,
            Err(error) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %error,
                    "Acquisition failed, session terminal"
                );
                session.error = Some(error.clone());
                session.transition_to(ScanStatus::Failed);
                if self.commit(session).await {
                    self.event_bus.emit_lossy(ScanEvent::SessionFailed {
                        session_id,
                        error: error.to_string(),
                        timestamp: Utc::now(),
                    });
                }
                return;
            }
        };

        let ingredient_count = acquisition.ingredients.len();
        let matched_catalog = acquisition.product_metadata.is_some();

        tracing::info!(
            session_id = %session_id,
            ingredients = ingredient_count,
            matched_catalog = matched_catalog,
            "Source resolved"
        );

        // Empty list: complete without ever issuing a scoring call.
        if acquisition.ingredients.is_empty() {
            session.result = Some(ScanResult {
                extracted_text: acquisition.extracted_text,
                ingredients: Vec::new(),
                product_metadata: acquisition.product_metadata,
                safety_report: None,
            });
            session.transition_to(ScanStatus::Complete);
            if self.commit(session).await {
                self.event_bus.emit_lossy(ScanEvent::SourceResolved {
                    session_id,
                    ingredient_count: 0,
                    matched_catalog,
                    timestamp: Utc::now(),
                });
                self.event_bus.emit_lossy(ScanEvent::SessionCompleted {
                    session_id,
                    ingredient_count: 0,
                    scored: false,
                    timestamp: Utc::now(),
                });
            }
            return;
        }

        session.transition_to(ScanStatus::ScoringIngredients);
        if !self.commit(session.clone()).await {
            // Superseded while resolving; don't issue the scoring call.
            return;
        }
        self.event_bus.emit_lossy(ScanEvent::SourceResolved {
            session_id,
            ingredient_count,
            matched_catalog,
            timestamp: Utc::now(),
        });
        self.event_bus.emit_lossy(ScanEvent::ScoringStarted {
            session_id,
            ingredient_count,
            timestamp: Utc::now(),
        });

        let (safety_report, scoring_warning) =
            match self.scoring.score(&acquisition.ingredients).await {
                Ok(report) => (Some(report), None),
                Err(error) => {
                    tracing::warn!(
                        session_id = %session_id,
                        error = %error,
                        "Scoring unavailable, completing without safety report"
                    );
                    (None, Some(error))
                }
            };

        // Single merge step: one acquisition result and at most one scoring
        // outcome, both owned by this session's task.
        let scored = safety_report.is_some();
        session.result = Some(ScanResult {
            extracted_text: acquisition.extracted_text,
            ingredients: acquisition.ingredients,
            product_metadata: acquisition.product_metadata,
            safety_report,
        });
        session.scoring_warning = scoring_warning.clone();
        session.transition_to(ScanStatus::Complete);

        if self.commit(session).await {
            if let Some(warning) = scoring_warning {
                self.event_bus.emit_lossy(ScanEvent::ScoringUnavailable {
                    session_id,
                    reason: warning.to_string(),
                    timestamp: Utc::now(),
                });
            }
            self.event_bus.emit_lossy(ScanEvent::SessionCompleted {
                session_id,
                ingredient_count,
                scored,
                timestamp: Utc::now(),
            });
        }
    }

    /// Atomically replace the displayed session, unless it has been taken
    /// over by a higher generation. Returns whether the write landed.
    async fn commit(&self, session: ScanSession) -> bool {
        let mut slot = self.current.write().await;
        if let Some(current) = slot.as_ref() {
            if current.generation > session.generation {
                tracing::debug!(
                    session_id = %session.session_id,
                    generation = session.generation,
                    displayed_generation = current.generation,
                    "Discarding stale session update"
                );
                self.event_bus.emit_lossy(ScanEvent::StaleResultDiscarded {
                    session_id: session.session_id,
                    timestamp: Utc::now(),
                });
                return false;
            }
        }
        *slot = Some(session);
        true
    }
}
