//! Loader error types

use miette::Diagnostic;
use thiserror::Error;
use triage_core::constants::EXIT_CODE_SPEC_ISSUES;

use crate::canonical::CanonicalizeError;

/// Errors returned by a load operation.
///
/// Malformed input is only reported in strict mode and always carries the
/// complete offending document. Invariant violations are reported in every
/// mode.
#[derive(Error, Debug, Diagnostic)]
pub enum LoadError {
    #[error("failed to parse yaml: '{document}'")]
    #[diagnostic(
        code(triage::load::malformed),
        help("check the document for YAML syntax errors")
    )]
    Malformed {
        document: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to decode raw spec: '{document}'")]
    #[diagnostic(
        code(triage::load::wrapper),
        help("Secret and ConfigMap wrappers must be valid v1 objects; Secret data must be base64")
    )]
    WrapperDecode {
        document: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to convert doc to troubleshoot.sh/v1beta2 kind: '\n{document}'")]
    #[diagnostic(code(triage::load::canonicalize))]
    Canonicalize {
        document: String,
        #[source]
        source: CanonicalizeError,
    },

    #[error("failed to decode '{document}'")]
    #[diagnostic(code(triage::load::decode))]
    SpecDecode {
        document: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{kind} type is not a Secret or ConfigMap")]
    #[diagnostic(code(triage::load::invariant))]
    NotAWrapper { kind: String },

    #[error("unknown troubleshoot kind {api_version}/{kind}")]
    #[diagnostic(code(triage::load::invariant))]
    UnknownKind { api_version: String, kind: String },
}

impl LoadError {
    /// True for errors caused by a broken upstream contract rather than input
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            LoadError::NotAWrapper { .. } | LoadError::UnknownKind { .. }
        )
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_invariant_violation() {
            1
        } else {
            EXIT_CODE_SPEC_ISSUES
        }
    }

    /// The raw document that caused the error, if any
    pub fn document(&self) -> Option<&str> {
        match self {
            LoadError::Malformed { document, .. }
            | LoadError::WrapperDecode { document, .. }
            | LoadError::Canonicalize { document, .. }
            | LoadError::SpecDecode { document, .. } => Some(document),
            LoadError::NotAWrapper { .. } | LoadError::UnknownKind { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
