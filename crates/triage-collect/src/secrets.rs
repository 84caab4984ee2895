//! Cluster secret sources
//!
//! Specs and registry credentials can live in Kubernetes Secrets. The
//! [`SecretSource`] trait hides where they come from: [`KubeSecretSource`]
//! talks to the API server, [`StaticSecretSource`] serves a fixed set and is
//! what tests and offline runs use.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use kube::api::{Api, ListParams};
use tracing::debug;

use crate::error::{CollectError, Result};

/// Read access to Secrets
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch one secret; a missing secret is [`CollectError::SecretNotFound`]
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret>;

    /// Secrets in `namespace` matching `label_selector`
    async fn list(&self, namespace: &str, label_selector: &str) -> Result<Vec<Secret>>;
}

/// Secrets read from the cluster
pub struct KubeSecretSource {
    client: Client,
}

impl KubeSecretSource {
    /// Connect using the ambient kubeconfig or in-cluster config
    pub async fn new() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn secrets_api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl SecretSource for KubeSecretSource {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.secrets_api(namespace)
            .get_opt(name)
            .await?
            .ok_or_else(|| CollectError::SecretNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn list(&self, namespace: &str, label_selector: &str) -> Result<Vec<Secret>> {
        let lp = ListParams::default().labels(label_selector);
        Ok(self.secrets_api(namespace).list(&lp).await?.items)
    }
}

/// A fixed, in-memory set of secrets
#[derive(Debug, Clone, Default)]
pub struct StaticSecretSource {
    secrets: Vec<Secret>,
}

impl StaticSecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.secrets.push(secret);
        self
    }

    fn in_namespace<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a Secret> + 'a {
        self.secrets
            .iter()
            .filter(move |s| s.metadata.namespace.as_deref().unwrap_or("default") == namespace)
    }
}

#[async_trait]
impl SecretSource for StaticSecretSource {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.in_namespace(namespace)
            .find(|s| s.metadata.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| CollectError::SecretNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn list(&self, namespace: &str, label_selector: &str) -> Result<Vec<Secret>> {
        let requirements = parse_selector(label_selector);
        Ok(self
            .in_namespace(namespace)
            .filter(|s| requirements.iter().all(|r| r.matches(s)))
            .cloned()
            .collect())
    }
}

/// One equality-based label requirement
#[derive(Debug, PartialEq, Eq)]
enum Requirement<'a> {
    Exists(&'a str),
    Equals(&'a str, &'a str),
    NotEquals(&'a str, &'a str),
}

impl Requirement<'_> {
    fn matches(&self, secret: &Secret) -> bool {
        let label = |key: &str| {
            secret
                .metadata
                .labels
                .as_ref()
                .and_then(|l| l.get(key))
                .map(String::as_str)
        };

        match *self {
            Requirement::Exists(key) => label(key).is_some(),
            Requirement::Equals(key, value) => label(key) == Some(value),
            Requirement::NotEquals(key, value) => label(key) != Some(value),
        }
    }
}

fn parse_selector(selector: &str) -> Vec<Requirement<'_>> {
    selector
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|term| {
            if let Some((key, value)) = term.split_once("!=") {
                Requirement::NotEquals(key.trim(), value.trim())
            } else if let Some((key, value)) = term.split_once("==") {
                Requirement::Equals(key.trim(), value.trim())
            } else if let Some((key, value)) = term.split_once('=') {
                Requirement::Equals(key.trim(), value.trim())
            } else {
                Requirement::Exists(term)
            }
        })
        .collect()
}

/// Read one spec out of a named secret.
///
/// The secret must carry `key` in its `data`.
pub async fn load_from_secret(
    source: &dyn SecretSource,
    namespace: &str,
    name: &str,
    key: &str,
) -> Result<Vec<u8>> {
    let secret = source.get(namespace, name).await?;

    let spec = secret
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .ok_or_else(|| CollectError::SecretKeyMissing {
            name: name.to_string(),
            key: key.to_string(),
        })?;

    debug!(name, namespace, key, "loaded spec from secret");
    Ok(spec.0.clone())
}

/// Read specs from every secret matching `label_selector`.
///
/// Secrets without `key` are skipped.
pub async fn load_from_secrets_matching_label(
    source: &dyn SecretSource,
    namespace: &str,
    label_selector: &str,
    key: &str,
) -> Result<Vec<String>> {
    let secrets = source.list(namespace, label_selector).await?;

    let mut specs = Vec::new();
    for secret in &secrets {
        let Some(spec) = secret.data.as_ref().and_then(|d| d.get(key)) else {
            continue;
        };

        debug!(
            name = secret.metadata.name.as_deref().unwrap_or_default(),
            namespace,
            key,
            label_selector,
            "loaded spec from secret"
        );
        specs.push(String::from_utf8_lossy(&spec.0).into_owned());
    }

    Ok(specs)
}
