use serde::{Deserialize, Serialize};

use crate::multitype::BoolOrString;

use super::document::OpaqueEntry;

/// Fields shared by every analyzer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub check_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<BoolOrString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<BoolOrString>,
}

/// A single verdict branch of an outcome rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleOutcome {
    /// Condition in `<field> <operator> <value>` form; empty always matches
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub when: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,
}

/// One authored outcome rule. At most one branch is set in practice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<SingleOutcome>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn: Option<SingleOutcome>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<SingleOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSignaturesAnalyze {
    #[serde(flatten)]
    pub meta: AnalyzeMeta,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub collector_name: String,

    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

/// One entry of `spec.analyzers`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_signatures: Option<ImageSignaturesAnalyze>,

    #[serde(flatten)]
    pub other: OpaqueEntry,
}

impl AnalyzerEntry {
    /// Name of the analyzer type, for logging
    pub fn type_name(&self) -> &str {
        if self.image_signatures.is_some() {
            "imageSignatures"
        } else {
            self.other.keys().next().map(String::as_str).unwrap_or("unknown")
        }
    }
}
