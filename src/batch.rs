//! Checks a list of files one at a time, isolating failures per file.

use crate::check::evaluate;
use crate::discover::CandidateFile;
use crate::parse::{parse_with, Encoding};
use crate::report::{FileOutcome, Reporter, Summary};

/// Parse and check one document.
pub fn check_document(name: &str, content: &str, encoding: Encoding) -> FileOutcome {
    match parse_with(content, encoding) {
        Ok(set) => FileOutcome::Checked {
            name: name.to_string(),
            verdict: evaluate(&set),
            warnings: set.warnings,
        },
        Err(e) => {
            tracing::debug!(file = %name, "unparseable: {}", e);
            FileOutcome::Unparseable {
                name: name.to_string(),
                error: e.to_string(),
            }
        }
    }
}

/// Read and check one file. Read failures become an error outcome.
pub fn check_file(file: &CandidateFile, encoding: Encoding) -> FileOutcome {
    match file.read() {
        Ok(content) => check_document(&file.name, &content, encoding),
        Err(e) => {
            tracing::warn!(file = %file.path.display(), "failed to read: {}", e);
            FileOutcome::Unparseable {
                name: file.name.clone(),
                error: format!("failed to read file: {}", e),
            }
        }
    }
}

/// Check every file in order and report each outcome as it is produced.
pub fn check_files(files: &[CandidateFile], encoding: Encoding, reporter: &Reporter) -> Summary {
    let mut summary = Summary::default();
    for file in files {
        let outcome = check_file(file, encoding);
        summary.record(&outcome);
        reporter.file(&outcome);
    }

    tracing::info!(
        total = summary.total(),
        passed = summary.passed,
        failed = summary.failed,
        errors = summary.errors,
        "batch complete"
    );
    summary
}
