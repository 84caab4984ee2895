//! Analyzer error types

use miette::Diagnostic;
use thiserror::Error;
use triage_core::CoreError;

use crate::condition::ConditionError;

/// Errors that abort a single analyzer.
///
/// Every variant names the analyzer so a failure in a long list is easy to
/// locate.
#[derive(Error, Debug, Diagnostic)]
pub enum AnalyzeError {
    #[error("{title}: failed to compare conditional")]
    #[diagnostic(code(triage::analyze::condition))]
    Condition {
        title: String,
        #[source]
        #[diagnostic_source]
        source: ConditionError,
    },

    #[error("{title}: failed to read collected data")]
    #[diagnostic(code(triage::analyze::evidence))]
    Evidence {
        title: String,
        #[source]
        source: CoreError,
    },

    #[error("{title}: failed to parse collected data")]
    #[diagnostic(
        code(triage::analyze::invalid_data),
        help("the artifact was not written by a compatible collector")
    )]
    InvalidData {
        title: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{title}: invalid analyzer spec")]
    #[diagnostic(code(triage::analyze::spec))]
    Spec {
        title: String,
        #[source]
        source: CoreError,
    },
}

impl AnalyzeError {
    pub fn title(&self) -> &str {
        match self {
            AnalyzeError::Condition { title, .. }
            | AnalyzeError::Evidence { title, .. }
            | AnalyzeError::InvalidData { title, .. }
            | AnalyzeError::Spec { title, .. } => title,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
