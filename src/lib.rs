//! Synheart CogLoad - Real-time cognitive-load fusion and regulation engine
//!
//! CogLoad turns per-frame biometric proxies into an interpretable load score
//! through a deterministic pipeline: blink detection and head posture →
//! load scoring → zone classification → cooldown-governed regulation.
//!
//! ## Modules
//!
//! - **Signal stages**: `blink`, `posture`, `breathing`, `scoring`, `zone`
//! - **Regulation**: `regulation` plus the background `intervention` worker
//!   talking to the external `collaborators`
//! - **Session**: `pipeline` ties the stages together and feeds the `history`
//!   ring and the `event_log` read by presentation consumers
//! - **Input**: `schema` reads recorded frames in the frame.sample.v1 format

pub mod advice;
pub mod blink;
pub mod breathing;
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod event_log;
pub mod history;
pub mod intervention;
pub mod pipeline;
pub mod posture;
pub mod regulation;
pub mod schema;
pub mod scoring;
pub mod stats;
pub mod types;
pub mod zone;

pub use blink::BlinkDetector;
pub use breathing::{BreathingSource, LatestBreathing, SimulatedBreathing};
pub use collaborators::{Collaborators, PostureAutomation, RescuePlanGenerator, ScreenContextExtractor};
pub use config::EngineConfig;
pub use error::{CollaboratorError, EngineError};
pub use event_log::{EventLog, LogEntry, LogEvent};
pub use history::HistoryStore;
pub use intervention::InterventionWorker;
pub use pipeline::{MonitorSession, PresentationSnapshot, SessionSummary, SessionView, TickOutcome};
pub use posture::PostureClassifier;
pub use regulation::{RegulationController, RegulationState};
pub use scoring::LoadScorer;
pub use stats::SessionStats;
pub use types::*;
pub use zone::ZoneClassifier;

// Schema exports
pub use schema::{FrameRecord, FrameRecordAdapter, SCHEMA_VERSION};

/// CogLoad version reported by the CLI and session summaries
pub const COGLOAD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for emitted records
pub const PRODUCER_NAME: &str = "synheart-cogload";
