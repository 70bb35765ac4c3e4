//! CLI entry point for pkgcheck.
//!
//! Resolves configuration, finds the files to check (from the argument or an
//! interactive prompt), checks them one by one and sets the exit status.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use pkgcheck::batch::check_files;
use pkgcheck::config::Config;
use pkgcheck::discover::{list_candidate_files, prompt_for_files, TerminalPrompt};
use pkgcheck::report::Reporter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::from(2)
        }
    }
}

/// Log to stderr. `RUST_LOG` applies unless `-v` was given.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref(), cli.overrides())?;
    tracing::debug!(?config, "resolved configuration");

    let files = match &cli.dir {
        Some(dir) => list_candidate_files(dir, &config.pattern)
            .with_context(|| format!("Cannot check {}", dir.display()))?,
        None => {
            let (dir, files) = prompt_for_files(&mut TerminalPrompt::new(), &config.pattern)?;
            tracing::info!(dir = %dir.display(), "using directory");
            files
        }
    };

    let reporter = Reporter::new(config.output, config.explain);
    let summary = check_files(&files, config.encoding, &reporter);

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
