//! CLI subcommands

pub mod analyze;
pub mod collect;
pub mod lint;
pub mod show;

use std::path::PathBuf;

use triage_loader::{LoadOptions, TroubleshootKinds, load_specs};

use crate::error::Result;
use crate::input::read_specs;

/// Read and load every spec named on the command line
pub(crate) fn load(files: &[PathBuf], strict: bool) -> Result<TroubleshootKinds> {
    let raw = read_specs(files)?;
    Ok(load_specs(LoadOptions::new(raw).strict(strict))?)
}
