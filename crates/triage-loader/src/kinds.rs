//! The aggregate of every loaded troubleshoot spec, grouped by kind

use std::fmt;

use serde::Serialize;
use triage_core::spec::{
    Analyzer, Collector, HostCollector, HostPreflight, Preflight, Redactor, RemoteCollector,
    SupportBundle,
};

use crate::split::DOCUMENT_SEPARATOR;

/// The closed set of troubleshoot kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecKind {
    Analyzer,
    Collector,
    HostCollector,
    HostPreflight,
    Preflight,
    Redactor,
    RemoteCollector,
    SupportBundle,
}

impl SpecKind {
    /// Every kind, in serialization order
    pub const ALL: [SpecKind; 8] = [
        SpecKind::Analyzer,
        SpecKind::Collector,
        SpecKind::HostCollector,
        SpecKind::HostPreflight,
        SpecKind::Preflight,
        SpecKind::Redactor,
        SpecKind::RemoteCollector,
        SpecKind::SupportBundle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SpecKind::Analyzer => "Analyzer",
            SpecKind::Collector => "Collector",
            SpecKind::HostCollector => "HostCollector",
            SpecKind::HostPreflight => "HostPreflight",
            SpecKind::Preflight => "Preflight",
            SpecKind::Redactor => "Redactor",
            SpecKind::RemoteCollector => "RemoteCollector",
            SpecKind::SupportBundle => "SupportBundle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded troubleshoot document
#[derive(Debug, Clone, PartialEq)]
pub enum TroubleshootKind {
    Analyzer(Analyzer),
    Collector(Collector),
    HostCollector(HostCollector),
    HostPreflight(HostPreflight),
    Preflight(Preflight),
    Redactor(Redactor),
    RemoteCollector(RemoteCollector),
    SupportBundle(SupportBundle),
}

impl TroubleshootKind {
    pub fn kind(&self) -> SpecKind {
        match self {
            TroubleshootKind::Analyzer(_) => SpecKind::Analyzer,
            TroubleshootKind::Collector(_) => SpecKind::Collector,
            TroubleshootKind::HostCollector(_) => SpecKind::HostCollector,
            TroubleshootKind::HostPreflight(_) => SpecKind::HostPreflight,
            TroubleshootKind::Preflight(_) => SpecKind::Preflight,
            TroubleshootKind::Redactor(_) => SpecKind::Redactor,
            TroubleshootKind::RemoteCollector(_) => SpecKind::RemoteCollector,
            TroubleshootKind::SupportBundle(_) => SpecKind::SupportBundle,
        }
    }
}

/// Every spec loaded in one or more load operations.
///
/// Each list keeps the order in which its documents were decoded; collectors
/// and analyzers run in that order. Lists only ever grow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TroubleshootKinds {
    pub analyzers: Vec<Analyzer>,
    pub collectors: Vec<Collector>,
    pub host_collectors: Vec<HostCollector>,
    pub host_preflights: Vec<HostPreflight>,
    pub preflights: Vec<Preflight>,
    pub redactors: Vec<Redactor>,
    pub remote_collectors: Vec<RemoteCollector>,
    pub support_bundles: Vec<SupportBundle>,
}

type KindSerializer = fn(&TroubleshootKinds) -> serde_yaml::Result<Vec<String>>;

/// Order in which `to_yaml` emits kinds
const SERIALIZATION_ORDER: [(SpecKind, KindSerializer); 8] = [
    (SpecKind::Analyzer, |k: &TroubleshootKinds| to_documents(&k.analyzers)),
    (SpecKind::Collector, |k: &TroubleshootKinds| to_documents(&k.collectors)),
    (SpecKind::HostCollector, |k: &TroubleshootKinds| to_documents(&k.host_collectors)),
    (SpecKind::HostPreflight, |k: &TroubleshootKinds| to_documents(&k.host_preflights)),
    (SpecKind::Preflight, |k: &TroubleshootKinds| to_documents(&k.preflights)),
    (SpecKind::Redactor, |k: &TroubleshootKinds| to_documents(&k.redactors)),
    (SpecKind::RemoteCollector, |k: &TroubleshootKinds| to_documents(&k.remote_collectors)),
    (SpecKind::SupportBundle, |k: &TroubleshootKinds| to_documents(&k.support_bundles)),
];

fn to_documents<T: Serialize>(items: &[T]) -> serde_yaml::Result<Vec<String>> {
    items.iter().map(serde_yaml::to_string).collect()
}

impl TroubleshootKinds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one decoded document to the list for its kind
    pub fn push(&mut self, doc: TroubleshootKind) {
        match doc {
            TroubleshootKind::Analyzer(d) => self.analyzers.push(d),
            TroubleshootKind::Collector(d) => self.collectors.push(d),
            TroubleshootKind::HostCollector(d) => self.host_collectors.push(d),
            TroubleshootKind::HostPreflight(d) => self.host_preflights.push(d),
            TroubleshootKind::Preflight(d) => self.preflights.push(d),
            TroubleshootKind::Redactor(d) => self.redactors.push(d),
            TroubleshootKind::RemoteCollector(d) => self.remote_collectors.push(d),
            TroubleshootKind::SupportBundle(d) => self.support_bundles.push(d),
        }
    }

    /// Append every list of `other` after the matching list of `self`
    pub fn add(&mut self, other: TroubleshootKinds) {
        self.analyzers.extend(other.analyzers);
        self.collectors.extend(other.collectors);
        self.host_collectors.extend(other.host_collectors);
        self.host_preflights.extend(other.host_preflights);
        self.preflights.extend(other.preflights);
        self.redactors.extend(other.redactors);
        self.remote_collectors.extend(other.remote_collectors);
        self.support_bundles.extend(other.support_bundles);
    }

    /// Number of documents of one kind
    pub fn count(&self, kind: SpecKind) -> usize {
        match kind {
            SpecKind::Analyzer => self.analyzers.len(),
            SpecKind::Collector => self.collectors.len(),
            SpecKind::HostCollector => self.host_collectors.len(),
            SpecKind::HostPreflight => self.host_preflights.len(),
            SpecKind::Preflight => self.preflights.len(),
            SpecKind::Redactor => self.redactors.len(),
            SpecKind::RemoteCollector => self.remote_collectors.len(),
            SpecKind::SupportBundle => self.support_bundles.len(),
        }
    }

    pub fn len(&self) -> usize {
        SpecKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize every document back into one multi-document YAML text.
    ///
    /// Kinds without documents contribute nothing. The result can be fed
    /// back into the loader.
    pub fn to_yaml(&self) -> serde_yaml::Result<String> {
        let mut docs = Vec::with_capacity(self.len());
        for (kind, serialize) in SERIALIZATION_ORDER {
            let serialized = serialize(self)?;
            tracing::trace!(%kind, count = serialized.len(), "serialized specs");
            docs.extend(serialized);
        }
        Ok(docs.join(DOCUMENT_SEPARATOR))
    }
}
