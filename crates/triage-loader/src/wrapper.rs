//! Extraction of specs embedded in Secrets and ConfigMaps

use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use triage_core::constants::keys;

use crate::split::split_yaml;

/// Specs embedded in a Secret.
///
/// `data` is checked for every well-known key first, then `stringData`.
/// A key present in both contributes both payloads, `data` first.
pub fn specs_from_secret(secret: &Secret) -> Vec<String> {
    let mut specs = Vec::new();

    if let Some(data) = &secret.data {
        for key in keys::ALL {
            if let Some(bytes) = data.get(key) {
                specs.extend(split_yaml(&String::from_utf8_lossy(&bytes.0)));
            }
        }
    }

    if let Some(string_data) = &secret.string_data {
        for key in keys::ALL {
            if let Some(text) = string_data.get(key) {
                specs.extend(split_yaml(text));
            }
        }
    }

    specs
}

/// Specs embedded in a ConfigMap's `data`
pub fn specs_from_configmap(configmap: &ConfigMap) -> Vec<String> {
    let Some(data) = &configmap.data else {
        return Vec::new();
    };

    keys::ALL
        .iter()
        .filter_map(|key| data.get(*key))
        .flat_map(|text| split_yaml(text))
        .collect()
}
