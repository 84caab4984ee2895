//! Analyzer trait and dispatch over the loaded specs

use tracing::debug;
use triage_core::EvidenceStore;
use triage_core::spec::AnalyzerEntry;
use triage_loader::TroubleshootKinds;

use crate::error::Result;
use crate::image_signatures::ImageSignaturesAnalyzer;
use crate::result::AnalyzeResult;

/// One runnable analyzer
pub trait Analyzer {
    fn title(&self) -> String;

    fn is_excluded(&self) -> Result<bool>;

    fn analyze(&self, evidence: &dyn EvidenceStore) -> Result<Vec<AnalyzeResult>>;
}

/// Build the analyzer for an entry, or `None` for types not implemented here
pub fn analyzer_for(entry: &AnalyzerEntry) -> Option<Box<dyn Analyzer + '_>> {
    if let Some(spec) = &entry.image_signatures {
        return Some(Box::new(ImageSignaturesAnalyzer::new(spec)));
    }
    None
}

/// Every analyzer entry in the aggregate.
///
/// `Analyzer` specs come first, then `SupportBundle`, then `Preflight`; each
/// in load order.
pub fn analyzer_entries(kinds: &TroubleshootKinds) -> Vec<&AnalyzerEntry> {
    let analyzers = kinds.analyzers.iter().flat_map(|d| &d.spec.analyzers);
    let bundles = kinds.support_bundles.iter().flat_map(|d| &d.spec.analyzers);
    let preflights = kinds.preflights.iter().flat_map(|d| &d.spec.analyzers);

    analyzers.chain(bundles).chain(preflights).collect()
}

/// Run every supported, non-excluded analyzer against `evidence`.
///
/// The first analyzer error aborts the run; the error names the analyzer.
pub fn analyze(kinds: &TroubleshootKinds, evidence: &dyn EvidenceStore) -> Result<Vec<AnalyzeResult>> {
    let mut results = Vec::new();

    for entry in analyzer_entries(kinds) {
        let Some(analyzer) = analyzer_for(entry) else {
            debug!(analyzer = entry.type_name(), "skipping unsupported analyzer");
            continue;
        };

        if analyzer.is_excluded()? {
            debug!(title = %analyzer.title(), "skipping excluded analyzer");
            continue;
        }

        results.extend(analyzer.analyze(evidence)?);
    }

    Ok(results)
}
