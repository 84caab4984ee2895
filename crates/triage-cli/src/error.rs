//! CLI error types with exit code handling

use miette::Diagnostic;
use thiserror::Error;
use triage_analyze::AnalyzeError;
use triage_collect::CollectError;
use triage_core::CoreError;
use triage_loader::LoadError;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("Collection failed: {0}")]
    #[diagnostic(code(triage::cli::collect))]
    Collect(#[from] CollectError),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(triage::cli::config))]
    Config(#[source] CoreError),

    #[error("Failed to read bundle {path}: {source}")]
    #[diagnostic(
        code(triage::cli::bundle),
        help("pass a directory or a .tar.gz written by `triage collect`")
    )]
    Bundle {
        path: String,
        #[source]
        source: CoreError,
    },

    #[error("IO error: {path}: {message}")]
    #[diagnostic(code(triage::cli::io))]
    Io { path: String, message: String },

    #[error("{failed} of {total} analyzer(s) failed")]
    #[diagnostic(code(triage::cli::analysis_failed))]
    AnalysisFailed { failed: usize, total: usize },

    #[error("Internal error: {message}")]
    #[diagnostic(code(triage::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Load(e) => e.exit_code(),
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Bundle { .. } | CliError::Config(_) => exit_codes::IO_ERROR,
            CliError::Analyze(_)
            | CliError::Collect(_)
            | CliError::AnalysisFailed { .. }
            | CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    pub fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
