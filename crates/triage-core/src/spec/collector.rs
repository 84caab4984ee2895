use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::multitype::BoolOrString;

use super::document::OpaqueEntry;

/// Fields shared by every collector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub collector_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<BoolOrString>,
}

/// Registry credentials attached to an image collector.
///
/// Either `name` refers to an existing `kubernetes.io/dockerconfigjson`
/// secret, or `data` carries the `.dockerconfigjson` payload inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePullSecrets {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub secret_type: String,
}

impl ImagePullSecrets {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.data.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSignatures {
    #[serde(flatten)]
    pub meta: CollectorMeta,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<ImagePullSecrets>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryImages {
    #[serde(flatten)]
    pub meta: CollectorMeta,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<ImagePullSecrets>,
}

/// Collectors that authenticate against image registries
pub trait PullSecretProvider {
    fn namespace(&self) -> &str;
    fn image_pull_secrets(&self) -> Option<&ImagePullSecrets>;
}

impl PullSecretProvider for ImageSignatures {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn image_pull_secrets(&self) -> Option<&ImagePullSecrets> {
        self.image_pull_secrets.as_ref()
    }
}

impl PullSecretProvider for RegistryImages {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn image_pull_secrets(&self) -> Option<&ImagePullSecrets> {
        self.image_pull_secrets.as_ref()
    }
}

/// One entry of `spec.collectors`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_signatures: Option<ImageSignatures>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_images: Option<RegistryImages>,

    #[serde(flatten)]
    pub other: OpaqueEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDevices {
    #[serde(flatten)]
    pub meta: CollectorMeta,
}

/// One entry of a host collector list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCollectorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_devices: Option<BlockDevices>,

    #[serde(flatten)]
    pub other: OpaqueEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_pull_secrets_inline() {
        let yaml = r#"
images: [registry.example.com/app:1.0]
namespace: prod
imagePullSecrets:
  type: kubernetes.io/dockerconfigjson
  data:
    .dockerconfigjson: e30=
"#;
        let sigs: ImageSignatures = serde_yaml::from_str(yaml).unwrap();
        let secrets = sigs.image_pull_secrets().unwrap();

        assert_eq!(sigs.namespace(), "prod");
        assert_eq!(secrets.secret_type, "kubernetes.io/dockerconfigjson");
        assert_eq!(secrets.data[".dockerconfigjson"], "e30=");
        assert!(!secrets.is_empty());
    }

    #[test]
    fn test_host_collector_entry_keeps_unknown() {
        let entry: HostCollectorEntry =
            serde_yaml::from_str("cpu: {}\n").unwrap();
        assert!(entry.block_devices.is_none());
        assert!(entry.other.contains_key("cpu"));

        let entry: HostCollectorEntry =
            serde_yaml::from_str("blockDevices:\n  collectorName: disks\n").unwrap();
        assert_eq!(entry.block_devices.unwrap().meta.collector_name, "disks");
        assert!(entry.other.is_empty());
    }

    #[test]
    fn test_exclude_string_flag() {
        let entry: CollectorEntry =
            serde_yaml::from_str("registryImages:\n  exclude: 'true'\n  images: []\n").unwrap();
        let reg = entry.registry_images.unwrap();
        assert!(reg.meta.exclude.unwrap().as_bool().unwrap());
    }
}
