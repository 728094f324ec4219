//! External collaborator boundaries
//!
//! Screen-context extraction, rescue-plan generation and system automation are
//! implemented outside this crate. The engine only sees these traits. The
//! simple implementations below are stand-ins for offline runs and replays.

use crate::error::CollaboratorError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Reads what the user is currently working on (e.g. screen OCR)
pub trait ScreenContextExtractor: Send + Sync {
    fn extract(&self) -> Result<String, CollaboratorError>;
}

/// Turns a work context into a short rescue plan (e.g. a text generation service)
pub trait RescuePlanGenerator: Send + Sync {
    /// Implementations should give up after `timeout`; the worker stops waiting
    /// at that point regardless.
    fn generate(&self, context: &str, timeout: Duration) -> Result<String, CollaboratorError>;
}

/// Fire-and-forget ergonomic action for forward head posture (e.g. zoom in).
///
/// Called on the tick thread, so implementations must return promptly.
pub trait PostureAutomation: Send + Sync {
    fn apply_posture_fix(&self);
}

/// The set of collaborators a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn ScreenContextExtractor>,
    pub generator: Arc<dyn RescuePlanGenerator>,
    pub automation: Arc<dyn PostureAutomation>,
}

impl Collaborators {
    pub fn new(
        extractor: Arc<dyn ScreenContextExtractor>,
        generator: Arc<dyn RescuePlanGenerator>,
        automation: Arc<dyn PostureAutomation>,
    ) -> Self {
        Self {
            extractor,
            generator,
            automation,
        }
    }

    /// No context, no plans, logging-only automation
    pub fn offline() -> Self {
        Self::new(
            Arc::new(NoScreenContext),
            Arc::new(NoRescuePlan),
            Arc::new(LoggingAutomation::default()),
        )
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Extractor for environments without screen access
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScreenContext;

impl ScreenContextExtractor for NoScreenContext {
    fn extract(&self) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "screen context extraction is not configured".to_string(),
        ))
    }
}

/// Extractor returning a fixed context string
#[derive(Debug, Clone)]
pub struct StaticScreenContext(pub String);

impl ScreenContextExtractor for StaticScreenContext {
    fn extract(&self) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}

/// Generator for environments without a plan service
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRescuePlan;

impl RescuePlanGenerator for NoRescuePlan {
    fn generate(&self, _context: &str, _timeout: Duration) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "rescue plan generation is not configured".to_string(),
        ))
    }
}

/// Generator returning a fixed plan regardless of context
#[derive(Debug, Clone)]
pub struct CannedRescuePlan(pub String);

impl RescuePlanGenerator for CannedRescuePlan {
    fn generate(&self, _context: &str, _timeout: Duration) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}

/// Automation that only logs and counts requested fixes
#[derive(Debug, Default)]
pub struct LoggingAutomation {
    fired: AtomicU64,
}

impl LoggingAutomation {
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }
}

impl PostureAutomation for LoggingAutomation {
    fn apply_posture_fix(&self) {
        let count = self.fired.fetch_add(1, Ordering::Relaxed) + 1;
        info!(count, "posture fix requested");
    }
}
