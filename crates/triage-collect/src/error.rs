//! Error types for collectors

use thiserror::Error;
use triage_core::CoreError;

/// Collector errors.
///
/// Per-image failures never surface here; the image signatures collector
/// records them in the artifact instead. These errors are for problems that
/// stop a whole collector, and for the resolution steps it classifies.
#[derive(Debug, Error)]
pub enum CollectError {
    // ============ Secret Errors ============
    #[error("secret {namespace}/{name} not found")]
    SecretNotFound { namespace: String, name: String },

    #[error("spec not found in secret {name}: no data key {key}")]
    SecretKeyMissing { name: String, key: String },

    #[error("secret type is not supported: {secret_type:?}")]
    UnsupportedSecretType { secret_type: String },

    #[error("no secret source available to resolve image pull secret {name}")]
    NoSecretSource { name: String },

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    // ============ Credential Errors ============
    #[error("invalid docker config: {message}")]
    InvalidDockerConfig { message: String },

    // ============ Registry Errors ============
    #[error("{message}")]
    Registry { message: String },

    #[error("invalid image reference {image}: {message}")]
    ImageReference { image: String, message: String },

    // ============ Host Errors ============
    #[error("failed to execute {command}: {message}")]
    Command { command: String, message: String },

    // ============ Generic Errors ============
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectError {
    pub fn registry(message: impl Into<String>) -> Self {
        CollectError::Registry {
            message: message.into(),
        }
    }

    pub fn invalid_docker_config(message: impl Into<String>) -> Self {
        CollectError::InvalidDockerConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CollectError>;
