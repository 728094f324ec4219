//! Error types for Synheart CogLoad

use thiserror::Error;

/// Errors surfaced by the engine's public API.
///
/// Nothing that happens inside a tick is reported through this type; input gaps,
/// collaborator failures and invalid numbers are absorbed and logged instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse frame input: {0}")]
    ParseError(String),

    #[error("Failed to start intervention worker: {0}")]
    WorkerSpawn(String),
}

/// Failures reported by the external collaborators (screen context, rescue plan).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Collaborator call failed: {0}")]
    Failed(String),

    #[error("Collaborator call timed out after {0} ms")]
    Timeout(u64),
}
