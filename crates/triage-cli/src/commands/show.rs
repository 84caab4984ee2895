//! Show command - print the loaded specs as canonical YAML

use std::path::PathBuf;

use crate::error::{CliError, Result};

pub fn run(files: &[PathBuf], strict: bool) -> Result<()> {
    let kinds = super::load(files, strict)?;

    let yaml = kinds
        .to_yaml()
        .map_err(|e| CliError::internal(format!("failed to serialize specs: {}", e)))?;
    print!("{}", yaml);

    Ok(())
}
