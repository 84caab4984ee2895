//! Reading spec files from disk or stdin

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CliError, Result};

const STDIN: &str = "-";

/// Read every input; `-` reads stdin, at most once
pub fn read_specs(files: &[PathBuf]) -> Result<Vec<String>> {
    let mut specs = Vec::with_capacity(files.len());
    let mut stdin_read = false;

    for file in files {
        if file == Path::new(STDIN) {
            if stdin_read {
                continue;
            }
            stdin_read = true;

            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .map_err(|e| CliError::io("<stdin>", e))?;
            specs.push(content);
            continue;
        }

        let content = std::fs::read_to_string(file)
            .map_err(|e| CliError::io(file.display().to_string(), e))?;
        debug!(file = %file.display(), bytes = content.len(), "read spec file");
        specs.push(content);
    }

    Ok(specs)
}
