//! CLI argument definitions for pkgcheck.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use pkgcheck::config::PartialConfig;
use pkgcheck::parse::Encoding;
use pkgcheck::report::OutputMode;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "pkgcheck")]
#[command(version = VERSION)]
#[command(about = "Check package manifests for dependency consistency", long_about = None)]
#[command(
    after_help = "EXIT STATUS:\n    0  every file passed\n    1  at least one file failed or could not be parsed\n    2  usage, configuration or directory error"
)]
pub struct Cli {
    /// Directory containing the manifests to check (prompted for when omitted)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Config file (defaults to .pkgcheck.yaml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only check files whose names match this glob
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Manifest encoding
    #[arg(long, value_enum)]
    pub encoding: Option<Encoding>,

    /// Output one JSON object per file
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// Only print files that did not pass
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the reason behind each verdict
    #[arg(long)]
    pub explain: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Flag values that override the config file.
    pub fn overrides(&self) -> PartialConfig {
        let output = if self.json {
            Some(OutputMode::Json)
        } else if self.quiet {
            Some(OutputMode::Quiet)
        } else {
            None
        };

        PartialConfig {
            pattern: self.pattern.clone(),
            encoding: self.encoding,
            output,
            explain: self.explain.then_some(true),
        }
    }
}
