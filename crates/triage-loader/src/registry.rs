//! Typed decoding of wrapper and troubleshoot documents
//!
//! The registry maps `(apiVersion, kind)` to a decoder. It is built once,
//! then shared read-only (typically behind an `Arc`) by every loader.

use std::collections::BTreeMap;
use std::sync::Arc;

use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use thiserror::Error;
use triage_core::constants::{CONFIGMAP_KIND, CORE_V1, SECRET_KIND, TROUBLESHOOT_V1BETA2};

use crate::classify::decode_header;
use crate::kinds::{SpecKind, TroubleshootKind};

/// A fully decoded document
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedObject {
    Secret(Box<Secret>),
    ConfigMap(Box<ConfigMap>),
    Spec(TroubleshootKind),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no decoder registered for {api_version}/{kind}")]
    Unregistered { api_version: String, kind: String },

    #[error(transparent)]
    Decode(#[from] serde_yaml::Error),
}

pub type ObjectDecoder = fn(&str) -> serde_yaml::Result<DecodedObject>;

#[derive(Debug, Clone, Default)]
pub struct SpecRegistry {
    decoders: BTreeMap<(String, String), ObjectDecoder>,
}

impl SpecRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry knowing core `v1` wrappers and every `troubleshoot.sh/v1beta2` kind
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(CORE_V1, SECRET_KIND, |doc| {
            serde_yaml::from_str(doc).map(|s| DecodedObject::Secret(Box::new(s)))
        });
        registry.register(CORE_V1, CONFIGMAP_KIND, |doc| {
            serde_yaml::from_str(doc).map(|c| DecodedObject::ConfigMap(Box::new(c)))
        });

        for kind in SpecKind::ALL {
            registry.register(TROUBLESHOOT_V1BETA2, kind.as_str(), spec_decoder(kind));
        }

        registry
    }

    /// Convenience for `Arc::new(SpecRegistry::with_defaults())`
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::with_defaults())
    }

    pub fn register(&mut self, api_version: &str, kind: &str, decoder: ObjectDecoder) {
        self.decoders
            .insert((api_version.to_string(), kind.to_string()), decoder);
    }

    pub fn is_registered(&self, api_version: &str, kind: &str) -> bool {
        self.decoders
            .contains_key(&(api_version.to_string(), kind.to_string()))
    }

    /// Decode a document into its registered type
    pub fn decode(&self, doc: &str) -> Result<DecodedObject, RegistryError> {
        let header = decode_header(doc)?;
        let key = (header.api_version, header.kind);

        match self.decoders.get(&key) {
            Some(decoder) => Ok(decoder(doc)?),
            None => Err(RegistryError::Unregistered {
                api_version: key.0,
                kind: key.1,
            }),
        }
    }
}

fn spec_decoder(kind: SpecKind) -> ObjectDecoder {
    match kind {
        SpecKind::Analyzer => |doc| {
            serde_yaml::from_str(doc).map(|d| DecodedObject::Spec(TroubleshootKind::Analyzer(d)))
        },
        SpecKind::Collector => |doc| {
            serde_yaml::from_str(doc).map(|d| DecodedObject::Spec(TroubleshootKind::Collector(d)))
        },
        SpecKind::HostCollector => |doc| {
            serde_yaml::from_str(doc)
                .map(|d| DecodedObject::Spec(TroubleshootKind::HostCollector(d)))
        },
        SpecKind::HostPreflight => |doc| {
            serde_yaml::from_str(doc)
                .map(|d| DecodedObject::Spec(TroubleshootKind::HostPreflight(d)))
        },
        SpecKind::Preflight => |doc| {
            serde_yaml::from_str(doc).map(|d| DecodedObject::Spec(TroubleshootKind::Preflight(d)))
        },
        SpecKind::Redactor => |doc| {
            serde_yaml::from_str(doc).map(|d| DecodedObject::Spec(TroubleshootKind::Redactor(d)))
        },
        SpecKind::RemoteCollector => |doc| {
            serde_yaml::from_str(doc)
                .map(|d| DecodedObject::Spec(TroubleshootKind::RemoteCollector(d)))
        },
        SpecKind::SupportBundle => |doc| {
            serde_yaml::from_str(doc)
                .map(|d| DecodedObject::Spec(TroubleshootKind::SupportBundle(d)))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registrations() {
        let registry = SpecRegistry::with_defaults();
        assert!(registry.is_registered("v1", "Secret"));
        assert!(registry.is_registered("v1", "ConfigMap"));
        for kind in SpecKind::ALL {
            assert!(registry.is_registered(TROUBLESHOOT_V1BETA2, kind.as_str()));
        }
        assert!(!registry.is_registered("troubleshoot.replicated.com/v1beta1", "Collector"));
    }

    #[test]
    fn test_decode_spec() {
        let registry = SpecRegistry::with_defaults();
        let decoded = registry
            .decode("apiVersion: troubleshoot.sh/v1beta2\nkind: HostPreflight\nmetadata:\n  name: host\n")
            .unwrap();

        match decoded {
            DecodedObject::Spec(TroubleshootKind::HostPreflight(doc)) => {
                assert_eq!(doc.name(), "host")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_secret() {
        let registry = SpecRegistry::with_defaults();
        let decoded = registry
            .decode("apiVersion: v1\nkind: Secret\nmetadata:\n  name: s\nstringData:\n  a: b\n")
            .unwrap();
        assert!(matches!(decoded, DecodedObject::Secret(_)));
    }

    #[test]
    fn test_decode_unregistered_and_invalid() {
        let registry = SpecRegistry::with_defaults();
        assert!(matches!(
            registry.decode("apiVersion: apps/v1\nkind: Deployment\n"),
            Err(RegistryError::Unregistered { .. })
        ));
        assert!(matches!(
            registry.decode("apiVersion: troubleshoot.sh/v1beta2\nkind: Collector\nspec:\n  collectors: 5\n"),
            Err(RegistryError::Decode(_))
        ));

        let empty = SpecRegistry::new();
        assert!(matches!(
            empty.decode("apiVersion: v1\nkind: Secret\n"),
            Err(RegistryError::Unregistered { .. })
        ));
    }
}
