//! Troubleshoot v1beta2 specification model
//!
//! Every spec kind shares the same envelope (`apiVersion`, `kind`, `metadata`,
//! `spec`). Collector and analyzer entries carry typed variants for the
//! collectors and analyzers implemented in this workspace; every other entry
//! is kept verbatim so a load followed by a re-serialization never drops
//! user data.

mod analyzer;
mod collector;
mod document;

pub use analyzer::{AnalyzeMeta, AnalyzerEntry, ImageSignaturesAnalyze, Outcome, SingleOutcome};
pub use collector::{
    BlockDevices, CollectorEntry, CollectorMeta, HostCollectorEntry, ImagePullSecrets,
    ImageSignatures, PullSecretProvider, RegistryImages,
};
pub use document::{
    AnalyzerSpec, CollectorSpec, HostCollectorSpec, HostPreflightSpec, OpaqueEntry,
    PreflightSpec, RedactorSpec, RemoteCollectorSpec, SpecDocument, SupportBundleSpec,
};

/// `kind: Analyzer`
pub type Analyzer = SpecDocument<AnalyzerSpec>;
/// `kind: Collector`
pub type Collector = SpecDocument<CollectorSpec>;
/// `kind: HostCollector`
pub type HostCollector = SpecDocument<HostCollectorSpec>;
/// `kind: HostPreflight`
pub type HostPreflight = SpecDocument<HostPreflightSpec>;
/// `kind: Preflight`
pub type Preflight = SpecDocument<PreflightSpec>;
/// `kind: Redactor`
pub type Redactor = SpecDocument<RedactorSpec>;
/// `kind: RemoteCollector`
pub type RemoteCollector = SpecDocument<RemoteCollectorSpec>;
/// `kind: SupportBundle`
pub type SupportBundle = SpecDocument<SupportBundleSpec>;
