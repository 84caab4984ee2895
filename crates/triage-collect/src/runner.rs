//! Collector dispatch over the loaded specs

use std::sync::Arc;

use tracing::{debug, error};
use triage_core::MemoryEvidence;
use triage_core::spec::{CollectorEntry, HostCollectorEntry};
use triage_loader::TroubleshootKinds;

use crate::block_devices::BlockDevicesCollector;
use crate::collector::{CollectContext, Collector};
use crate::error::Result;
use crate::image_signatures::ImageSignaturesCollector;
use crate::progress::ProgressEvent;
use crate::secrets::SecretSource;
use crate::signatures::SignatureFetcher;

/// A collector that stopped without producing artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectFailure {
    pub collector: String,
    pub message: String,
}

/// Everything one run produced
#[derive(Debug, Default)]
pub struct CollectOutput {
    pub evidence: MemoryEvidence,
    /// Titles of the collectors that ran, in run order
    pub collected: Vec<String>,
    pub failures: Vec<CollectFailure>,
}

/// Runs the collectors declared by a set of specs
pub struct CollectRunner {
    fetcher: Arc<dyn SignatureFetcher>,
    secrets: Option<Arc<dyn SecretSource>>,
    host: bool,
}

impl CollectRunner {
    pub fn new(fetcher: Arc<dyn SignatureFetcher>) -> Self {
        Self {
            fetcher,
            secrets: None,
            host: true,
        }
    }

    pub fn with_secrets(mut self, secrets: Arc<dyn SecretSource>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Whether host collectors run on this machine
    pub fn with_host_collectors(mut self, enabled: bool) -> Self {
        self.host = enabled;
        self
    }

    /// Build a collector for every supported entry, cluster collectors first
    pub fn collectors<'a>(&self, kinds: &'a TroubleshootKinds) -> Vec<Box<dyn Collector + 'a>> {
        let mut collectors: Vec<Box<dyn Collector + 'a>> = Vec::new();

        for entry in collector_entries(kinds) {
            if let Some(spec) = &entry.image_signatures {
                let mut collector = ImageSignaturesCollector::new(spec, self.fetcher.clone());
                if let Some(secrets) = &self.secrets {
                    collector = collector.with_secrets(secrets.clone());
                }
                collectors.push(Box::new(collector));
            } else {
                debug!(collector = ?entry.other.keys().next(), "skipping unsupported collector");
            }
        }

        if self.host {
            for entry in host_collector_entries(kinds) {
                if let Some(spec) = &entry.block_devices {
                    collectors.push(Box::new(BlockDevicesCollector::new(spec)));
                } else {
                    debug!(collector = ?entry.other.keys().next(), "skipping unsupported host collector");
                }
            }
        }

        collectors
    }

    /// Run every non-excluded collector in order.
    ///
    /// A collector that fails is recorded in [`CollectOutput::failures`] and
    /// the run continues; an invalid `exclude` flag aborts the run.
    pub async fn run(&self, kinds: &TroubleshootKinds, ctx: &CollectContext) -> Result<CollectOutput> {
        let mut output = CollectOutput::default();

        for collector in self.collectors(kinds) {
            let title = collector.title();
            if collector.is_excluded()? {
                debug!(title = %title, "skipping excluded collector");
                continue;
            }

            ctx.progress.send(ProgressEvent::CollectorStarted {
                collector: title.clone(),
            });

            match collector.collect(ctx).await {
                Ok(evidence) => {
                    output.evidence.extend(evidence);
                    ctx.progress.send(ProgressEvent::CollectorFinished {
                        collector: title.clone(),
                    });
                    output.collected.push(title);
                }
                Err(e) => {
                    error!(title = %title, error = %e, "collector failed");
                    ctx.progress.send(ProgressEvent::CollectorFailed {
                        collector: title.clone(),
                        message: e.to_string(),
                    });
                    output.failures.push(CollectFailure {
                        collector: title,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(output)
    }
}

/// Cluster collector entries: `Collector`, then `SupportBundle`, then `Preflight`
pub fn collector_entries(kinds: &TroubleshootKinds) -> Vec<&CollectorEntry> {
    let collectors = kinds.collectors.iter().flat_map(|d| &d.spec.collectors);
    let bundles = kinds.support_bundles.iter().flat_map(|d| &d.spec.collectors);
    let preflights = kinds.preflights.iter().flat_map(|d| &d.spec.collectors);

    collectors.chain(bundles).chain(preflights).collect()
}

/// Host collector entries: `HostCollector`, then `SupportBundle`, then `HostPreflight`
pub fn host_collector_entries(kinds: &TroubleshootKinds) -> Vec<&HostCollectorEntry> {
    let host = kinds.host_collectors.iter().flat_map(|d| &d.spec.collectors);
    let bundles = kinds.support_bundles.iter().flat_map(|d| &d.spec.host_collectors);
    let preflights = kinds.host_preflights.iter().flat_map(|d| &d.spec.collectors);

    host.chain(bundles).chain(preflights).collect()
}
