//! Triage Collect - gathering evidence for analyzers
//!
//! Features:
//! - Registry credentials from `kubernetes.io/dockerconfigjson` pull secrets
//! - Cosign signature lookup over the OCI distribution API
//! - Concurrent, cancellable image signature collection with stable output order
//! - Host block device inventory via `lsblk`
//! - Spec loading from cluster Secrets

pub mod auth;
pub mod block_devices;
pub mod classify;
pub mod collector;
pub mod error;
pub mod image;
pub mod image_signatures;
pub mod progress;
pub mod runner;
pub mod secrets;
pub mod signatures;

pub use auth::{DockerConfig, RegistryCredentials, resolve_credentials};
pub use block_devices::{BlockDeviceInfo, BlockDevicesCollector, parse_lsblk};
pub use classify::{RegistryFailure, is_air_gapped};
pub use collector::{CollectContext, Collector};
pub use error::{CollectError, Result};
pub use image_signatures::ImageSignaturesCollector;
pub use progress::{CancelHandle, CancelToken, ProgressEvent, ProgressSender, cancellation};
pub use runner::{CollectFailure, CollectOutput, CollectRunner};
pub use secrets::{
    KubeSecretSource, SecretSource, StaticSecretSource, load_from_secret,
    load_from_secrets_matching_label,
};
pub use signatures::{OciSignatureFetcher, SignatureFetcher};
