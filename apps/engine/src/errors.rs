use std::time::Duration;

use thiserror::Error;

/// Engine-level error type.
///
/// Every failing operation resolves with one of these; nothing is swallowed.
/// `Validation` is raised before any request is sent; `Fetch`/`Dispatch`
/// carry the remote status and body; `Timeout` is the engine's own deadline,
/// not the transport's.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout { operation: String, after: Duration },

    #[error("Missing API credential")]
    MissingCredential,
}

impl EngineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::Timeout { .. })
    }
}
