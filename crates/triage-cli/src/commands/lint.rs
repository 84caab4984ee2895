//! Lint command - load specs and report what was found

use console::style;
use std::path::PathBuf;

use crate::display;
use crate::error::Result;

pub fn run(files: &[PathBuf], strict: bool) -> Result<()> {
    println!(
        "{} Loading {} file(s){}",
        style("→").blue(),
        files.len(),
        if strict { " (strict)" } else { "" }
    );

    let kinds = super::load(files, strict)?;

    display::print_kind_counts(&kinds);
    println!();

    if kinds.is_empty() {
        println!("{} No troubleshoot specs found", style("⚠").yellow());
    } else {
        println!(
            "{} Loaded {} spec(s)",
            style("✓").green().bold(),
            kinds.len()
        );
    }

    Ok(())
}
