//! Lightweight header decoding and document classification

use std::collections::BTreeMap;

use serde::Deserialize;
use triage_core::constants::{
    CONFIGMAP_KIND, CORE_V1, SECRET_KIND, TROUBLESHOOT_V1BETA1, TROUBLESHOOT_V1BETA2,
};

/// The few fields needed to decide what a document is
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub data: Option<BTreeMap<String, serde_yaml::Value>>,

    #[serde(default)]
    pub string_data: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// `v1` Secret carrying embedded specs
    Secret,
    /// `v1` ConfigMap carrying embedded specs
    ConfigMap,
    /// Troubleshoot document in the current or legacy API version
    Troubleshoot,
    /// Anything else; skipped, never an error
    Foreign,
}

impl Classification {
    pub fn is_wrapper(self) -> bool {
        matches!(self, Classification::Secret | Classification::ConfigMap)
    }
}

/// Decode only the header fields of a document.
///
/// A document holding nothing but comments decodes to an empty header.
pub fn decode_header(doc: &str) -> Result<DocumentHeader, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(doc)?;
    if value.is_null() {
        return Ok(DocumentHeader::default());
    }
    serde_yaml::from_value(value)
}

pub fn classify(header: &DocumentHeader) -> Classification {
    let (kind, version) = (header.kind.as_str(), header.api_version.as_str());

    if kind == SECRET_KIND && version == CORE_V1 {
        Classification::Secret
    } else if kind == CONFIGMAP_KIND && version == CORE_V1 {
        Classification::ConfigMap
    } else if version == TROUBLESHOOT_V1BETA2 || version == TROUBLESHOOT_V1BETA1 {
        Classification::Troubleshoot
    } else {
        Classification::Foreign
    }
}
