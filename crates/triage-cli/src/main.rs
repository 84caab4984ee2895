//! Triage CLI - load troubleshoot specs, collect evidence and analyze it

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use triage_core::TriageConfig;

mod commands;
mod display;
mod error;
mod exit_codes;
mod input;

use error::CliError;

#[derive(Parser)]
#[command(name = "triage")]
#[command(author = "Triage Contributors")]
#[command(version)]
#[command(about = "Load troubleshoot specs, collect evidence and analyze it", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Configuration file (default: ~/.config/triage/config.yaml)
    #[arg(long, global = true, env = "TRIAGE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load specs and report what was found
    Lint {
        /// Spec files, `-` for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Fail on malformed documents instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Print the loaded specs as canonical YAML
    Show {
        /// Spec files, `-` for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Fail on malformed documents instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Run the collectors declared by the specs
    Collect {
        /// Spec files, `-` for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory, or a .tar.gz path
        #[arg(short, long)]
        output: PathBuf,

        /// Fail on malformed documents instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Images collected in parallel (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Skip host collectors
        #[arg(long)]
        no_host: bool,
    },

    /// Run the analyzers declared by the specs against a bundle
    Analyze {
        /// Spec files, `-` for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Bundle directory or .tar.gz
        #[arg(short, long)]
        bundle: PathBuf,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Fail on malformed documents instead of skipping them
        #[arg(long)]
        strict: bool,
    },
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    let config = TriageConfig::load(cli.config.as_deref()).map_err(CliError::Config)?;

    match cli.command {
        Commands::Lint { files, strict } => {
            commands::lint::run(&files, strict || config.load.strict)
        }

        Commands::Show { files, strict } => {
            commands::show::run(&files, strict || config.load.strict)
        }

        Commands::Collect {
            files,
            output,
            strict,
            concurrency,
            no_host,
        } => commands::collect::run(
            &files,
            &output,
            strict || config.load.strict,
            concurrency.unwrap_or(config.collect.concurrency),
            !no_host,
            &config,
        ),

        Commands::Analyze {
            files,
            bundle,
            json,
            strict,
        } => commands::analyze::run(&files, &bundle, json, strict || config.load.strict),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli) {
        let code = e.exit_code();
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(code);
    }
}
