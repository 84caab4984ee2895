//! Analyze command - run analyzers against a collected bundle

use std::path::{Path, PathBuf};

use triage_core::archive::{is_archive, read_archive};
use triage_core::{DirectoryEvidence, EvidenceStore};

use crate::display::{self, AnalysisReport};
use crate::error::{CliError, Result};

fn open_bundle(bundle: &Path) -> Result<Box<dyn EvidenceStore>> {
    let to_error = |source| CliError::Bundle {
        path: bundle.display().to_string(),
        source,
    };

    if is_archive(bundle) {
        Ok(Box::new(read_archive(bundle).map_err(to_error)?))
    } else {
        Ok(Box::new(DirectoryEvidence::new(bundle).map_err(to_error)?))
    }
}

pub fn run(files: &[PathBuf], bundle: &Path, json: bool, strict: bool) -> Result<()> {
    let kinds = super::load(files, strict)?;
    let evidence = open_bundle(bundle)?;

    let results = triage_analyze::analyze(&kinds, evidence.as_ref())?;

    if json {
        let report = AnalysisReport::new(&results);
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::internal(format!("failed to serialize results: {}", e)))?;
        println!("{}", out);
    } else if results.is_empty() {
        println!("No analyzers ran");
    } else {
        display::print_results(&results);
    }

    let failed = results.iter().filter(|r| r.is_fail()).count();
    if failed > 0 {
        return Err(CliError::AnalysisFailed {
            failed,
            total: results.len(),
        });
    }

    Ok(())
}
