//! Signature fetching over OCI
//!
//! Cosign stores the signatures of an image manifest `sha256:<hex>` as a
//! separate manifest tagged `sha256-<hex>.sig` in the same repository. Each
//! layer is a simple-signing payload; the signature itself sits in the
//! `dev.cosignproject.cosign/signature` layer annotation.

use std::time::Duration;

use async_trait::async_trait;
use oci_distribution::Reference;
use oci_distribution::client::{Client, ClientConfig, ClientProtocol, ImageLayer};
use oci_distribution::secrets::RegistryAuth;
use serde::Deserialize;
use tracing::debug;
use triage_core::artifacts::Signature;
use triage_core::config::RegistryConfig;

use crate::error::{CollectError, Result};
use crate::image::signature_reference;

pub mod media_types {
    /// Cosign simple-signing payload layer
    pub const SIMPLE_SIGNING: &str = "application/vnd.dev.cosign.simplesigning.v1+json";
}

/// Layer annotation holding the base64 signature
pub const SIGNATURE_ANNOTATION: &str = "dev.cosignproject.cosign/signature";

/// Registry operations the image signatures collector needs
#[async_trait]
pub trait SignatureFetcher: Send + Sync {
    /// Resolve the manifest digest of `image`. Any failure here means the
    /// registry could not be accessed.
    async fn resolve_digest(&self, image: &Reference, auth: &RegistryAuth) -> Result<String>;

    /// Signatures attached to the manifest `digest`. No signature manifest
    /// yields an empty list.
    async fn fetch_signatures(
        &self,
        image: &Reference,
        digest: &str,
        auth: &RegistryAuth,
    ) -> Result<Vec<Signature>>;
}

/// [`SignatureFetcher`] backed by an OCI distribution client
pub struct OciSignatureFetcher {
    client: Client,
    timeout: Duration,
}

impl OciSignatureFetcher {
    pub fn new(config: &RegistryConfig) -> Self {
        let protocol = if config.insecure {
            ClientProtocol::Http
        } else {
            ClientProtocol::Https
        };
        let client = Client::new(ClientConfig {
            protocol,
            ..Default::default()
        });

        Self {
            client,
            timeout: config.timeout,
        }
    }

    async fn with_timeout<T, E: std::fmt::Display>(
        &self,
        fut: impl std::future::Future<Output = std::result::Result<T, E>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| CollectError::registry(e.to_string())),
            Err(_) => Err(CollectError::registry(format!(
                "request timeout after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl SignatureFetcher for OciSignatureFetcher {
    async fn resolve_digest(&self, image: &Reference, auth: &RegistryAuth) -> Result<String> {
        self.with_timeout(self.client.fetch_manifest_digest(image, auth))
            .await
    }

    async fn fetch_signatures(
        &self,
        image: &Reference,
        digest: &str,
        auth: &RegistryAuth,
    ) -> Result<Vec<Signature>> {
        let sig_ref = signature_reference(image, digest)?;

        let pulled = self
            .with_timeout(
                self.client
                    .pull(&sig_ref, auth, vec![media_types::SIMPLE_SIGNING]),
            )
            .await;

        let data = match pulled {
            Ok(data) => data,
            Err(CollectError::Registry { message }) if is_not_found(&message) => {
                debug!(image = %image, "no signature manifest");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        Ok(data
            .layers
            .iter()
            .map(|layer| signature_from_layer(layer, digest))
            .collect())
    }
}

/// Same "not found" detection as a tag existence check
fn is_not_found(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("not found") || lower.contains("manifest unknown") || lower.contains("404")
}

#[derive(Deserialize)]
struct SimpleSigning {
    critical: Critical,
}

#[derive(Deserialize)]
struct Critical {
    image: CriticalImage,
}

#[derive(Deserialize)]
struct CriticalImage {
    #[serde(rename = "docker-manifest-digest")]
    docker_manifest_digest: String,
}

/// Build a [`Signature`] from a simple-signing layer.
///
/// `verified` means the payload is bound to `digest`; the signature itself is
/// not checked against a key.
fn signature_from_layer(layer: &ImageLayer, digest: &str) -> Signature {
    if layer.data.is_empty() {
        return Signature {
            verified: false,
            signature: String::new(),
            error: "empty signature payload".to_string(),
        };
    }

    let signature = layer
        .annotations
        .as_ref()
        .and_then(|a| a.get(SIGNATURE_ANNOTATION))
        .cloned()
        .unwrap_or_else(|| String::from_utf8_lossy(&layer.data).into_owned());

    match serde_json::from_slice::<SimpleSigning>(&layer.data) {
        Ok(payload) if payload.critical.image.docker_manifest_digest == digest => Signature {
            verified: true,
            signature,
            error: String::new(),
        },
        Ok(payload) => Signature {
            verified: false,
            signature,
            error: format!(
                "signature payload references {}, not {}",
                payload.critical.image.docker_manifest_digest, digest
            ),
        },
        Err(e) => Signature {
            verified: false,
            signature,
            error: format!("invalid signature payload: {}", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const DIGEST: &str = "sha256:0123abcd";

    fn layer(payload: &str, signature: Option<&str>) -> ImageLayer {
        ImageLayer {
            data: payload.as_bytes().to_vec(),
            media_type: media_types::SIMPLE_SIGNING.to_string(),
            annotations: signature.map(|s| {
                HashMap::from([(SIGNATURE_ANNOTATION.to_string(), s.to_string())])
            }),
        }
    }

    fn payload(digest: &str) -> String {
        format!(
            r#"{{"critical":{{"identity":{{"docker-reference":"ghcr.io/org/app"}},"image":{{"docker-manifest-digest":"{}"}},"type":"cosign container image signature"}},"optional":null}}"#,
            digest
        )
    }

    #[test]
    fn test_bound_signature_is_verified() {
        let sig = signature_from_layer(&layer(&payload(DIGEST), Some("MEUCIQ==")), DIGEST);
        assert!(sig.verified);
        assert_eq!(sig.signature, "MEUCIQ==");
        assert!(sig.error.is_empty());
    }

    #[test]
    fn test_digest_mismatch() {
        let sig = signature_from_layer(&layer(&payload("sha256:other"), Some("MEUCIQ==")), DIGEST);
        assert!(!sig.verified);
        assert!(sig.error.contains("sha256:other"));
    }

    #[test]
    fn test_empty_payload() {
        let sig = signature_from_layer(&layer("", Some("MEUCIQ==")), DIGEST);
        assert!(!sig.verified);
        assert_eq!(sig.error, "empty signature payload");
    }

    #[test]
    fn test_unparseable_payload_keeps_raw_text() {
        let sig = signature_from_layer(&layer("not json", None), DIGEST);
        assert!(!sig.verified);
        assert_eq!(sig.signature, "not json");
        assert!(sig.error.starts_with("invalid signature payload"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(is_not_found("Registry error: manifest unknown"));
        assert!(is_not_found("HTTP 404"));
        assert!(is_not_found("Not Found"));
        assert!(!is_not_found("connection refused"));
    }
}
