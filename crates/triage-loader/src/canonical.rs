//! Conversion of accepted API versions to `troubleshoot.sh/v1beta2`

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use triage_core::constants::{TROUBLESHOOT_V1BETA1, TROUBLESHOOT_V1BETA2};

use crate::kinds::SpecKind;

#[derive(Error, Debug)]
pub enum CanonicalizeError {
    #[error("failed to parse document: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("document is not a mapping")]
    NotAMapping,

    #[error("unsupported apiVersion '{api_version}'")]
    UnsupportedVersion { api_version: String },

    #[error("unknown troubleshoot kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("failed to serialize converted document: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Rewrites a troubleshoot document of any accepted version into the
/// current one, or reports it as unconvertible.
pub trait Canonicalizer: Send + Sync {
    fn canonicalize(&self, doc: &str) -> Result<String, CanonicalizeError>;
}

/// Default canonicalizer.
///
/// Current-version documents pass through untouched. Legacy documents get
/// their `apiVersion` rewritten; their schema is otherwise identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiVersionRewriter;

impl Canonicalizer for ApiVersionRewriter {
    fn canonicalize(&self, doc: &str) -> Result<String, CanonicalizeError> {
        let value: Value = serde_yaml::from_str(doc).map_err(CanonicalizeError::Parse)?;
        let Value::Mapping(mut mapping) = value else {
            return Err(CanonicalizeError::NotAMapping);
        };

        let kind = string_field(&mapping, "kind");
        if SpecKind::from_name(&kind).is_none() {
            return Err(CanonicalizeError::UnknownKind { kind });
        }

        match string_field(&mapping, "apiVersion").as_str() {
            TROUBLESHOOT_V1BETA2 => Ok(doc.to_string()),
            TROUBLESHOOT_V1BETA1 => {
                mapping.insert(
                    Value::String("apiVersion".to_string()),
                    Value::String(TROUBLESHOOT_V1BETA2.to_string()),
                );
                serde_yaml::to_string(&mapping).map_err(CanonicalizeError::Serialize)
            }
            other => Err(CanonicalizeError::UnsupportedVersion {
                api_version: other.to_string(),
            }),
        }
    }
}

fn string_field(mapping: &Mapping, key: &str) -> String {
    mapping
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_version_untouched() {
        let doc = "apiVersion: troubleshoot.sh/v1beta2\nkind: Collector\n# keep me\n";
        assert_eq!(ApiVersionRewriter.canonicalize(doc).unwrap(), doc);
    }

    #[test]
    fn test_legacy_version_rewritten() {
        let doc = "apiVersion: troubleshoot.replicated.com/v1beta1\nkind: Preflight\nmetadata:\n  name: legacy\n";
        let out = ApiVersionRewriter.canonicalize(doc).unwrap();

        let value: Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(value["apiVersion"].as_str(), Some(TROUBLESHOOT_V1BETA2));
        assert_eq!(value["metadata"]["name"].as_str(), Some("legacy"));
    }

    #[test]
    fn test_unconvertible_documents() {
        assert!(matches!(
            ApiVersionRewriter.canonicalize("apiVersion: troubleshoot.sh/v1beta2\nkind: Bogus\n"),
            Err(CanonicalizeError::UnknownKind { .. })
        ));
        assert!(matches!(
            ApiVersionRewriter.canonicalize("apiVersion: troubleshoot.sh/v1\nkind: Collector\n"),
            Err(CanonicalizeError::UnsupportedVersion { .. })
        ));
        assert!(matches!(
            ApiVersionRewriter.canonicalize("- a\n- b\n"),
            Err(CanonicalizeError::NotAMapping)
        ));
    }
}
