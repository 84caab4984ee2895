//! Registry credential resolution
//!
//! Credentials come from a `kubernetes.io/dockerconfigjson` payload, either
//! inline on the collector or in a named secret. Entries are matched against
//! the image's registry host, including the usual Docker Hub aliases.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use oci_distribution::secrets::RegistryAuth;
use serde::{Deserialize, Serialize};
use tracing::trace;
use triage_core::constants::{DOCKER_CONFIG_JSON_KEY, DOCKER_CONFIG_JSON_TYPE};
use triage_core::spec::{ImagePullSecrets, PullSecretProvider};

use crate::error::{CollectError, Result};
use crate::secrets::SecretSource;

/// Namespace used when a collector does not name one
pub const DEFAULT_NAMESPACE: &str = "default";

const DOCKER_HUB_ALIASES: &[&str] = &[
    "docker.io",
    "index.docker.io",
    "registry-1.docker.io",
    "https://index.docker.io/v1/",
];

/// Username and password for one registry
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RegistryCredentials {
    pub fn to_registry_auth(&self) -> RegistryAuth {
        RegistryAuth::Basic(self.username.clone(), self.password.clone())
    }
}

/// Registry auth for an optional set of credentials
pub fn registry_auth(credentials: Option<&RegistryCredentials>) -> RegistryAuth {
    credentials
        .map(RegistryCredentials::to_registry_auth)
        .unwrap_or(RegistryAuth::Anonymous)
}

/// `.dockerconfigjson` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: HashMap<String, DockerAuth>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerAuth {
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl DockerAuth {
    /// Credentials from this entry.
    ///
    /// `auth` wins over `username`/`password`. It is either base64 of
    /// `user:pass` or the raw string, and must contain exactly one colon.
    pub fn credentials(&self) -> Result<Option<RegistryCredentials>> {
        if let Some(auth) = self.auth.as_deref().filter(|a| !a.is_empty()) {
            let decoded = STANDARD
                .decode(auth)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .filter(|s| s.contains(':'))
                .unwrap_or_else(|| auth.to_string());

            let parts: Vec<&str> = decoded.split(':').collect();
            let [username, password] = parts.as_slice() else {
                return Err(CollectError::invalid_docker_config(format!(
                    "expected auth in user:password format, found {} parts",
                    parts.len()
                )));
            };

            return Ok(Some(RegistryCredentials {
                username: username.to_string(),
                password: password.to_string(),
            }));
        }

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(Some(RegistryCredentials {
                username: username.clone(),
                password: password.clone(),
            })),
            _ => Ok(None),
        }
    }
}

impl DockerConfig {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| CollectError::invalid_docker_config(e.to_string()))
    }

    /// Credentials for `registry`, or `None` when no entry matches
    pub fn credentials_for(&self, registry: &str) -> Result<Option<RegistryCredentials>> {
        for key in registry_keys(registry) {
            if let Some(entry) = self.auths.get(&key) {
                trace!(registry, key = %key, "selected registry credentials");
                return entry.credentials();
            }
        }
        Ok(None)
    }
}

/// Keys a docker config may use for `registry`, most specific first
pub fn registry_keys(registry: &str) -> Vec<String> {
    let hosts: Vec<&str> = if DOCKER_HUB_ALIASES.contains(&registry) {
        DOCKER_HUB_ALIASES.to_vec()
    } else {
        vec![registry]
    };

    let mut keys = Vec::new();
    for host in hosts {
        if host.contains("://") {
            keys.push(host.to_string());
            continue;
        }
        keys.push(host.to_string());
        keys.push(format!("https://{}", host));
        keys.push(format!("http://{}", host));
    }
    keys
}

/// Resolve credentials for an image hosted on `registry`.
///
/// Returns `Ok(None)` when the collector has no pull secrets configured.
/// Inline data wins over a secret name.
pub async fn resolve_credentials<P>(
    provider: &P,
    registry: &str,
    secrets: Option<&dyn SecretSource>,
) -> Result<Option<RegistryCredentials>>
where
    P: PullSecretProvider + Sync + ?Sized,
{
    let Some(pull_secrets) = provider.image_pull_secrets().filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let config = if !pull_secrets.data.is_empty() {
        docker_config_from_data(pull_secrets)?
    } else {
        let namespace = match provider.namespace() {
            "" => DEFAULT_NAMESPACE,
            ns => ns,
        };
        let source = secrets.ok_or_else(|| CollectError::NoSecretSource {
            name: pull_secrets.name.clone(),
        })?;
        docker_config_from_secret(source, namespace, &pull_secrets.name).await?
    };

    config.credentials_for(registry)
}

/// Decode the inline `.dockerconfigjson` of a collector
pub fn docker_config_from_data(pull_secrets: &ImagePullSecrets) -> Result<DockerConfig> {
    ensure_docker_config_type(&pull_secrets.secret_type)?;

    let encoded = pull_secrets.data.get(DOCKER_CONFIG_JSON_KEY).ok_or_else(|| {
        CollectError::invalid_docker_config(format!("missing {} key", DOCKER_CONFIG_JSON_KEY))
    })?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CollectError::invalid_docker_config(format!("invalid base64: {}", e)))?;

    DockerConfig::from_json(&decoded)
}

async fn docker_config_from_secret(
    source: &dyn SecretSource,
    namespace: &str,
    name: &str,
) -> Result<DockerConfig> {
    let secret = source.get(namespace, name).await?;
    ensure_docker_config_type(secret.type_.as_deref().unwrap_or_default())?;

    let payload = secret
        .data
        .as_ref()
        .and_then(|d| d.get(DOCKER_CONFIG_JSON_KEY))
        .ok_or_else(|| CollectError::SecretKeyMissing {
            name: name.to_string(),
            key: DOCKER_CONFIG_JSON_KEY.to_string(),
        })?;

    DockerConfig::from_json(&payload.0)
}

fn ensure_docker_config_type(secret_type: &str) -> Result<()> {
    if secret_type == DOCKER_CONFIG_JSON_TYPE {
        Ok(())
    } else {
        Err(CollectError::UnsupportedSecretType {
            secret_type: secret_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::StaticSecretSource;
    use crate::secrets::tests::secret;
    use std::collections::BTreeMap;
    use triage_core::spec::ImageSignatures;

    fn inline(config: &str) -> ImagePullSecrets {
        ImagePullSecrets {
            name: String::new(),
            data: BTreeMap::from([(DOCKER_CONFIG_JSON_KEY.to_string(), STANDARD.encode(config))]),
            secret_type: DOCKER_CONFIG_JSON_TYPE.to_string(),
        }
    }

    fn collector(pull_secrets: Option<ImagePullSecrets>) -> ImageSignatures {
        ImageSignatures {
            namespace: "prod".to_string(),
            image_pull_secrets: pull_secrets,
            ..Default::default()
        }
    }

    fn creds(username: &str, password: &str) -> Option<RegistryCredentials> {
        Some(RegistryCredentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    async fn resolve(config: &str, registry: &str) -> Result<Option<RegistryCredentials>> {
        resolve_credentials(&collector(Some(inline(config))), registry, None).await
    }

    #[tokio::test]
    async fn test_raw_auth() {
        let config = r#"{"auths":{"docker.io":{"auth":"username:password"}}}"#;
        assert_eq!(resolve(config, "docker.io").await.unwrap(), creds("username", "password"));
    }

    #[tokio::test]
    async fn test_base64_auth() {
        let config = r#"{"auths":{"proxy.example.com":{"auth":"bGljZW5zZV9pZF8xOmxpY2Vuc2VfaWRfMQ=="}}}"#;
        assert_eq!(
            resolve(config, "proxy.example.com").await.unwrap(),
            creds("license_id_1", "license_id_1")
        );
    }

    #[tokio::test]
    async fn test_multi_colon_auth_is_error() {
        let config = r#"{"auths":{"docker.io":{"auth":"user:name:pass:word"}}}"#;
        assert!(matches!(
            resolve(config, "docker.io").await,
            Err(CollectError::InvalidDockerConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_username_password_fields() {
        let config = r#"{"auths":{"gcr.io":{"username":"_json_key","password":"sa-key"}}}"#;
        assert_eq!(resolve(config, "gcr.io").await.unwrap(), creds("_json_key", "sa-key"));
    }

    #[tokio::test]
    async fn test_scheme_prefixed_key() {
        let config = r#"{"auths":{"https://registry.example.com":{"username":"u","password":"p"}}}"#;
        assert_eq!(resolve(config, "registry.example.com").await.unwrap(), creds("u", "p"));
    }

    #[tokio::test]
    async fn test_docker_hub_alias() {
        let config = r#"{"auths":{"https://index.docker.io/v1/":{"auth":"dGVzdDp0ZXN0"}}}"#;
        assert_eq!(resolve(config, "docker.io").await.unwrap(), creds("test", "test"));
    }

    #[tokio::test]
    async fn test_no_matching_entry_is_anonymous() {
        let config = r#"{"auths":{"gcr.io":{"username":"u","password":"p"}}}"#;
        assert_eq!(resolve(config, "quay.io").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_pull_secrets() {
        let result = resolve_credentials(&collector(None), "docker.io", None).await;
        assert_eq!(result.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unsupported_secret_type() {
        let mut pull_secrets = inline("{}");
        pull_secrets.secret_type = "invalid".to_string();

        let err = resolve_credentials(&collector(Some(pull_secrets)), "docker.io", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[tokio::test]
    async fn test_named_secret() {
        let mut s = secret(
            "prod",
            "regcred",
            &[],
            &[(
                DOCKER_CONFIG_JSON_KEY,
                r#"{"auths":{"private-registry.io":{"username":"testuser","password":"testpass"}}}"#,
            )],
        );
        s.type_ = Some(DOCKER_CONFIG_JSON_TYPE.to_string());
        let source = StaticSecretSource::new().with_secret(s);

        let pull_secrets = ImagePullSecrets {
            name: "regcred".to_string(),
            ..Default::default()
        };
        let result =
            resolve_credentials(&collector(Some(pull_secrets)), "private-registry.io", Some(&source))
                .await
                .unwrap();
        assert_eq!(result, creds("testuser", "testpass"));
    }

    #[tokio::test]
    async fn test_named_secret_not_found() {
        let source = StaticSecretSource::new();
        let pull_secrets = ImagePullSecrets {
            name: "missing".to_string(),
            ..Default::default()
        };

        let err = resolve_credentials(&collector(Some(pull_secrets)), "docker.io", Some(&source))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("secret") && message.contains("not found"));
    }

    #[test]
    fn test_registry_keys() {
        assert_eq!(
            registry_keys("quay.io"),
            vec!["quay.io", "https://quay.io", "http://quay.io"]
        );
        let hub = registry_keys("index.docker.io");
        assert!(hub.contains(&"docker.io".to_string()));
        assert!(hub.contains(&"https://index.docker.io/v1/".to_string()));
    }

    #[test]
    fn test_debug_redacts_password() {
        let c = RegistryCredentials {
            username: "u".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", c).contains("hunter2"));
    }
}
