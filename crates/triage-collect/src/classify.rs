//! Error classification for collected images
//!
//! Raw errors from the Kubernetes API and from registries are mapped to a
//! small set of stable messages that end up in the artifact, so analyzers
//! and humans see the same wording whatever client library produced them.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CollectError;

pub const EMPTY_IMAGE_NAME: &str = "empty image name provided";
pub const NO_SIGNATURES_FOUND: &str = "no signatures found for this image";
pub const AIR_GAP_SKIPPED: &str = "signature verification skipped: air-gapped environment detected";
pub const COLLECTION_CANCELLED: &str = "collection cancelled";

static TIMEOUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)timeout|timed out|deadline exceeded").expect("valid regex"));
static CONNECTION_REFUSED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)connection refused").expect("valid regex"));
static UNKNOWN_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)no such host|failed to lookup address|name or service not known|dns error")
        .expect("valid regex")
});
static TLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)certificate|tls|x509|ssl").expect("valid regex"));

/// Message recorded when credentials for an image cannot be resolved
pub fn auth_failure_message(err: &CollectError) -> String {
    let reason = match err {
        CollectError::Kube(e) if CONNECTION_REFUSED.is_match(&e.to_string()) => {
            "unable to connect to Kubernetes API".to_string()
        }
        CollectError::SecretNotFound { .. } => "specified secret not found".to_string(),
        CollectError::UnsupportedSecretType { .. } => "invalid secret format".to_string(),
        other => other.to_string(),
    };
    format!("registry authentication failed: {}", reason)
}

/// Why a registry could not be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryFailure {
    Timeout,
    ConnectionRefused,
    UnknownHost,
    Tls,
    Other(String),
}

impl RegistryFailure {
    /// Classify a raw registry error message; the first matching class wins
    pub fn classify(message: &str) -> Self {
        if TIMEOUT.is_match(message) {
            RegistryFailure::Timeout
        } else if CONNECTION_REFUSED.is_match(message) {
            RegistryFailure::ConnectionRefused
        } else if UNKNOWN_HOST.is_match(message) {
            RegistryFailure::UnknownHost
        } else if TLS.is_match(message) {
            RegistryFailure::Tls
        } else {
            RegistryFailure::Other(message.to_string())
        }
    }
}

impl fmt::Display for RegistryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("registry access failed: ")?;
        match self {
            RegistryFailure::Timeout => f.write_str("connection timeout"),
            RegistryFailure::ConnectionRefused => {
                f.write_str("connection refused (registry may be down or unreachable)")
            }
            RegistryFailure::UnknownHost => f.write_str(
                "registry hostname not found (check network or air-gapped environment)",
            ),
            RegistryFailure::Tls => f.write_str(
                "TLS/certificate error (check registry certificate configuration)",
            ),
            RegistryFailure::Other(message) => f.write_str(message),
        }
    }
}

const AIR_GAPPED_PATTERNS: &[&str] = &[
    "localhost:",
    "127.0.0.1:",
    "internal-registry",
    "harbor.internal",
    "registry.internal",
    "artifactory.internal",
    ".local:",
    ".corp:",
    ".company.com",
    ".internal",
    ".local",
    ".corp",
];

const PRIVATE_IP_PREFIXES: &[&str] = &["10.", "192.168.", "172."];

/// Whether a registry host looks like it sits inside an air-gapped network
pub fn is_air_gapped(registry: &str) -> bool {
    AIR_GAPPED_PATTERNS.iter().any(|p| registry.contains(p))
        || PRIVATE_IP_PREFIXES.iter().any(|p| registry.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_failure_classes() {
        let cases = [
            ("operation timed out", "registry access failed: connection timeout"),
            ("dial tcp: connection refused", "registry access failed: connection refused (registry may be down or unreachable)"),
            ("dns error: failed to lookup address information", "registry access failed: registry hostname not found (check network or air-gapped environment)"),
            ("invalid peer certificate: UnknownIssuer", "registry access failed: TLS/certificate error (check registry certificate configuration)"),
            ("401 unauthorized", "registry access failed: 401 unauthorized"),
        ];

        for (raw, expected) in cases {
            assert_eq!(RegistryFailure::classify(raw).to_string(), expected, "{raw}");
        }
    }

    #[test]
    fn test_timeout_takes_precedence() {
        assert_eq!(
            RegistryFailure::classify("TLS handshake timeout"),
            RegistryFailure::Timeout
        );
    }

    #[test]
    fn test_auth_failure_messages() {
        let not_found = CollectError::SecretNotFound {
            namespace: "default".to_string(),
            name: "regcred".to_string(),
        };
        assert_eq!(
            auth_failure_message(&not_found),
            "registry authentication failed: specified secret not found"
        );

        let bad_type = CollectError::UnsupportedSecretType {
            secret_type: "Opaque".to_string(),
        };
        assert_eq!(
            auth_failure_message(&bad_type),
            "registry authentication failed: invalid secret format"
        );

        let other = CollectError::invalid_docker_config("bad json");
        assert_eq!(
            auth_failure_message(&other),
            "registry authentication failed: invalid docker config: bad json"
        );
    }

    #[test]
    fn test_air_gapped_hosts() {
        for host in [
            "localhost:5000",
            "127.0.0.1:5000",
            "internal-registry",
            "harbor.internal",
            "registry.corp:443",
            "nexus.local",
            "images.company.com",
            "10.0.0.5:5000",
            "192.168.1.10",
            "172.16.0.1",
        ] {
            assert!(is_air_gapped(host), "{host}");
        }

        for host in ["docker.io", "gcr.io", "quay.io", "ghcr.io", "registry.k8s.io"] {
            assert!(!is_air_gapped(host), "{host}");
        }
    }
}
