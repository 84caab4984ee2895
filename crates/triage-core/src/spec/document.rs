use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use super::analyzer::AnalyzerEntry;
use super::collector::{CollectorEntry, HostCollectorEntry};

/// An entry whose schema this workspace does not model; preserved as authored
pub type OpaqueEntry = BTreeMap<String, serde_yaml::Value>;

/// Common envelope of every troubleshoot spec kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "S: Deserialize<'de> + Default"))]
pub struct SpecDocument<S> {
    pub api_version: String,

    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: S,
}

impl<S> SpecDocument<S> {
    /// Name from metadata, or an empty string
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analyzers: Vec<AnalyzerEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_analyzers: Vec<OpaqueEntry>,

    #[serde(flatten)]
    pub extra: OpaqueEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collectors: Vec<CollectorEntry>,

    #[serde(flatten)]
    pub extra: OpaqueEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCollectorSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collectors: Vec<HostCollectorEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analyzers: Vec<OpaqueEntry>,

    #[serde(flatten)]
    pub extra: OpaqueEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPreflightSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collectors: Vec<HostCollectorEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remote_collectors: Vec<HostCollectorEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analyzers: Vec<OpaqueEntry>,

    #[serde(flatten)]
    pub extra: OpaqueEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collectors: Vec<CollectorEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remote_collectors: Vec<HostCollectorEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analyzers: Vec<AnalyzerEntry>,

    #[serde(flatten)]
    pub extra: OpaqueEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactorSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redactors: Vec<OpaqueEntry>,

    #[serde(flatten)]
    pub extra: OpaqueEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCollectorSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collectors: Vec<HostCollectorEntry>,

    #[serde(flatten)]
    pub extra: OpaqueEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportBundleSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collectors: Vec<CollectorEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_collectors: Vec<HostCollectorEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analyzers: Vec<AnalyzerEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_analyzers: Vec<OpaqueEntry>,

    #[serde(flatten)]
    pub extra: OpaqueEntry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{SupportBundle, SupportBundleSpec};

    const BUNDLE: &str = r#"
apiVersion: troubleshoot.sh/v1beta2
kind: SupportBundle
metadata:
  name: example
spec:
  uri: https://example.com/spec.yaml
  collectors:
    - clusterInfo: {}
    - imageSignatures:
        collectorName: app
        images:
          - nginx:latest
  analyzers:
    - imageSignatures:
        checkName: Signed images
        collectorName: app
        outcomes:
          - fail:
              when: "unsigned > 0"
              message: Unsigned images found
          - pass:
              message: All images signed
"#;

    #[test]
    fn test_decode_support_bundle() {
        let bundle: SupportBundle = serde_yaml::from_str(BUNDLE).unwrap();

        assert_eq!(bundle.name(), "example");
        assert_eq!(bundle.spec.collectors.len(), 2);
        assert!(bundle.spec.collectors[0].other.contains_key("clusterInfo"));

        let sigs = bundle.spec.collectors[1].image_signatures.as_ref().unwrap();
        assert_eq!(sigs.meta.collector_name, "app");
        assert_eq!(sigs.images, vec!["nginx:latest"]);

        let analyzer = bundle.spec.analyzers[0].image_signatures.as_ref().unwrap();
        assert_eq!(analyzer.outcomes.len(), 2);
        assert_eq!(
            analyzer.outcomes[0].fail.as_ref().unwrap().when,
            "unsigned > 0"
        );
        assert!(bundle.spec.extra.contains_key("uri"));
    }

    #[test]
    fn test_unmodeled_entries_survive_reserialization() {
        let bundle: SupportBundle = serde_yaml::from_str(BUNDLE).unwrap();
        let yaml = serde_yaml::to_string(&bundle).unwrap();
        let again: SupportBundle = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(bundle, again);
        assert!(yaml.contains("clusterInfo"));
        assert!(yaml.contains("uri: https://example.com/spec.yaml"));
    }

    #[test]
    fn test_missing_spec_defaults() {
        let bundle: SupportBundle = serde_yaml::from_str(
            "apiVersion: troubleshoot.sh/v1beta2\nkind: SupportBundle\n",
        )
        .unwrap();

        assert_eq!(bundle.spec, SupportBundleSpec::default());
        assert_eq!(bundle.name(), "");
    }
}
