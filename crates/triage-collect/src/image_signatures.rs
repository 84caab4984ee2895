//! Image signatures collector
//!
//! For every image listed by an `imageSignatures` collector this records the
//! cosign signatures found in its registry, or the reason none could be
//! read. Failures are per image and land in the artifact; the collector
//! itself only fails when the artifact cannot be written.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, warn};
use triage_core::MemoryEvidence;
use triage_core::artifacts::{
    IMAGE_SIGNATURES_DIR, ImageSignatureData, ImageSignaturesInfo, Signature, image_signatures_path,
};
use triage_core::multitype::is_excluded;
use triage_core::spec::ImageSignatures;

use crate::auth::{registry_auth, resolve_credentials};
use crate::classify::{
    AIR_GAP_SKIPPED, COLLECTION_CANCELLED, EMPTY_IMAGE_NAME, NO_SIGNATURES_FOUND,
    RegistryFailure, auth_failure_message, is_air_gapped,
};
use crate::collector::{CollectContext, Collector};
use crate::error::Result;
use crate::image::{image_error_message, parse_image};
use crate::progress::ProgressEvent;
use crate::secrets::SecretSource;
use crate::signatures::SignatureFetcher;

pub struct ImageSignaturesCollector<'a> {
    spec: &'a ImageSignatures,
    fetcher: Arc<dyn SignatureFetcher>,
    secrets: Option<Arc<dyn SecretSource>>,
}

impl<'a> ImageSignaturesCollector<'a> {
    pub fn new(spec: &'a ImageSignatures, fetcher: Arc<dyn SignatureFetcher>) -> Self {
        Self {
            spec,
            fetcher,
            secrets: None,
        }
    }

    /// Source for pull secrets referenced by name
    pub fn with_secrets(mut self, secrets: Arc<dyn SecretSource>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    async fn collect_image(&self, image: &str) -> ImageSignatureData {
        if image.trim().is_empty() {
            error!("empty image name provided");
            return ImageSignatureData::failed(image, EMPTY_IMAGE_NAME);
        }

        let reference = match parse_image(image) {
            Ok(reference) => reference,
            Err(e) => {
                error!(image, error = %e, "failed to parse image name");
                return ImageSignatureData::failed(image, image_error_message(image, &e));
            }
        };
        let registry = reference.registry().to_string();

        let credentials =
            match resolve_credentials(self.spec, &registry, self.secrets.as_deref()).await {
                Ok(credentials) => credentials,
                Err(e) => {
                    error!(image, error = %e, "failed to resolve registry credentials");
                    return ImageSignatureData::failed(image, auth_failure_message(&e));
                }
            };
        debug!(image, authenticated = credentials.is_some(), "resolved registry auth");
        let auth = registry_auth(credentials.as_ref());

        let digest = match self.fetcher.resolve_digest(&reference, &auth).await {
            Ok(digest) => digest,
            Err(e) if is_air_gapped(&registry) => {
                warn!(image, error = %e, "registry unreachable, assuming air-gapped environment");
                return ImageSignatureData {
                    image: image.to_string(),
                    signatures: vec![Signature {
                        verified: false,
                        signature: String::new(),
                        error: AIR_GAP_SKIPPED.to_string(),
                    }],
                    error: String::new(),
                };
            }
            Err(e) => {
                error!(image, error = %e, "registry access failed");
                let failure = RegistryFailure::classify(&e.to_string());
                return ImageSignatureData::failed(image, failure.to_string());
            }
        };

        let mut signatures = match self.fetcher.fetch_signatures(&reference, &digest, &auth).await {
            Ok(signatures) => signatures,
            Err(e) => {
                error!(image, error = %e, "failed to fetch signatures");
                return ImageSignatureData::failed(image, format!("failed to fetch signatures: {}", e));
            }
        };

        if signatures.is_empty() {
            signatures.push(Signature {
                verified: false,
                signature: String::new(),
                error: NO_SIGNATURES_FOUND.to_string(),
            });
        }
        debug!(image, count = signatures.len(), "processed signatures");

        ImageSignatureData {
            image: image.to_string(),
            signatures,
            error: String::new(),
        }
    }

    async fn collect_one(
        &self,
        index: usize,
        ctx: &CollectContext,
        title: &str,
        completed: &AtomicUsize,
    ) -> ImageSignatureData {
        let image = self.spec.images[index].as_str();

        let data = if ctx.cancel.is_cancelled() {
            ImageSignatureData::failed(image, COLLECTION_CANCELLED)
        } else {
            tokio::select! {
                data = self.collect_image(image) => data,
                _ = ctx.cancel.cancelled() => ImageSignatureData::failed(image, COLLECTION_CANCELLED),
            }
        };

        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        ctx.progress.send(ProgressEvent::ImageCollected {
            collector: title.to_string(),
            image: image.to_string(),
            completed: done,
            total: self.spec.images.len(),
        });

        data
    }
}

#[async_trait]
impl Collector for ImageSignaturesCollector<'_> {
    fn title(&self) -> String {
        match self.spec.meta.collector_name.as_str() {
            "" => IMAGE_SIGNATURES_DIR.to_string(),
            name => format!("{}/{}", IMAGE_SIGNATURES_DIR, name),
        }
    }

    fn is_excluded(&self) -> Result<bool> {
        Ok(is_excluded(self.spec.meta.exclude.as_ref())?)
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<MemoryEvidence> {
        let title = self.title();
        let completed = AtomicUsize::new(0);

        // results keep input order whatever order images finish in
        let images: Vec<ImageSignatureData> = stream::iter(0..self.spec.images.len())
            .map(|index| self.collect_one(index, ctx, &title, &completed))
            .buffered(ctx.concurrency.max(1))
            .collect()
            .await;

        let info = ImageSignaturesInfo { images };
        let json = serde_json::to_vec_pretty(&info)?;

        let mut evidence = MemoryEvidence::new();
        evidence.insert(image_signatures_path(&self.spec.meta.collector_name), json);
        Ok(evidence)
    }
}
