//! Display formatting for CLI output

use std::time::Duration;

use chrono::{DateTime, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use triage_analyze::{AnalyzeResult, Status};
use triage_collect::ProgressEvent;
use triage_loader::{SpecKind, TroubleshootKinds};

/// Per-kind counts, zero counts included
pub fn print_kind_counts(kinds: &TroubleshootKinds) {
    for kind in SpecKind::ALL {
        let count = kinds.count(kind);
        let icon = if count > 0 {
            style("✓").green()
        } else {
            style("·").dim()
        };
        println!("  {} {}: {}", icon, kind, count);
    }
}

fn status_icon(status: Status) -> console::StyledObject<&'static str> {
    match status {
        Status::Pass => style("✓").green(),
        Status::Warn => style("⚠").yellow(),
        Status::Fail => style("✗").red(),
    }
}

pub fn print_results(results: &[AnalyzeResult]) {
    for result in results {
        println!(
            "{} {}: {}",
            status_icon(result.status),
            style(&result.title).bold(),
            result.message
        );
        if !result.uri.is_empty() {
            println!("    {}", style(&result.uri).dim());
        }
    }
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
}

impl Summary {
    pub fn of(results: &[AnalyzeResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.status {
                Status::Pass => summary.pass += 1,
                Status::Warn => summary.warn += 1,
                Status::Fail => summary.fail += 1,
            }
        }
        summary
    }
}

/// JSON document printed by `analyze --json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport<'a> {
    pub analyzed_at: DateTime<Utc>,
    pub results: &'a [AnalyzeResult],
    pub summary: Summary,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(results: &'a [AnalyzeResult]) -> Self {
        Self {
            analyzed_at: Utc::now(),
            results,
            summary: Summary::of(results),
        }
    }
}

/// Spinner fed by collector progress events; hidden when stderr is not a terminal
pub struct CollectProgress {
    bar: ProgressBar,
}

impl CollectProgress {
    pub fn new() -> Self {
        let bar = if console::Term::stderr().is_term() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };

        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            bar.set_style(spinner);
        }
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar }
    }

    pub fn handle(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::CollectorStarted { collector } => {
                self.bar.set_message(format!("{}...", collector));
            }
            ProgressEvent::ImageCollected {
                collector,
                image,
                completed,
                total,
            } => {
                self.bar
                    .set_message(format!("{} [{}/{}] {}", collector, completed, total, image));
            }
            ProgressEvent::CollectorFinished { collector } => {
                self.bar
                    .println(format!("  {} {}", style("✓").green(), collector));
            }
            ProgressEvent::CollectorFailed { collector, message } => {
                self.bar
                    .println(format!("  {} {}: {}", style("✗").red(), collector, message));
            }
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
