//! Per-file result reporting.
//!
//! Supports three modes:
//! - Human: `File <name> Pass: <bool>` lines, colored on a TTY
//! - Json: one JSON object per file for programmatic consumption
//! - Quiet: only files that did not pass
//!
//! The writer can be swapped for test capture.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::check::Verdict;
use crate::package::FormatWarning;

/// Output mode selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Human-readable lines
    #[default]
    Human,
    /// One JSON object per line
    Json,
    /// Only failures and errors
    Quiet,
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Parsed and checked
    Checked {
        name: String,
        verdict: Verdict,
        warnings: Vec<FormatWarning>,
    },
    /// Could not be read or parsed
    Unparseable { name: String, error: String },
}

impl FileOutcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Checked { name, .. } | Self::Unparseable { name, .. } => name,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Self::Checked { verdict, .. } if verdict.passed())
    }

    fn status(&self) -> &'static str {
        match self {
            Self::Checked { verdict, .. } if verdict.passed() => "pass",
            Self::Checked { .. } => "fail",
            Self::Unparseable { .. } => "error",
        }
    }
}

/// Totals over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Checked { verdict, .. } if verdict.passed() => self.passed += 1,
            FileOutcome::Checked { .. } => self.failed += 1,
            FileOutcome::Unparseable { .. } => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

/// Report writer with mode-aware formatting
#[derive(Clone)]
pub struct Reporter {
    mode: OutputMode,
    explain: bool,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    is_tty: bool,
}

impl Reporter {
    /// Create a reporter writing to stdout
    pub fn new(mode: OutputMode, explain: bool) -> Self {
        Self {
            mode,
            explain,
            writer: Arc::new(Mutex::new(Box::new(io::stdout()))),
            is_tty: atty::is(atty::Stream::Stdout),
        }
    }

    /// Create a reporter with a custom writer (for testing)
    pub fn with_writer(mode: OutputMode, explain: bool, writer: Box<dyn Write + Send>) -> Self {
        Self {
            mode,
            explain,
            writer: Arc::new(Mutex::new(writer)),
            is_tty: false,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Report one file.
    pub fn file(&self, outcome: &FileOutcome) {
        match self.mode {
            OutputMode::Json => self.write_json(outcome),
            OutputMode::Quiet if outcome.passed() => {}
            OutputMode::Human | OutputMode::Quiet => self.write_human(outcome),
        }
    }

    fn write_human(&self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Checked { name, verdict, .. } => {
                let pass = verdict.passed().to_string();
                let pass = match (self.is_tty, verdict.passed()) {
                    (false, _) => pass,
                    (true, true) => pass.green().to_string(),
                    (true, false) => pass.red().to_string(),
                };
                self.write_line(&format!("File {} Pass: {}", name, pass));
                if self.explain {
                    self.write_line(&format!("  {}", verdict));
                }
            }
            FileOutcome::Unparseable { name, error } => {
                let label = if self.is_tty {
                    "Error:".red().to_string()
                } else {
                    "Error:".to_string()
                };
                self.write_line(&format!("File {} {} {}", name, label, error));
            }
        }
    }

    fn write_json(&self, outcome: &FileOutcome) {
        let mut obj = json!({
            "file": outcome.name(),
            "status": outcome.status(),
        });

        match outcome {
            FileOutcome::Checked {
                verdict, warnings, ..
            } => {
                obj["pass"] = json!(verdict.passed());
                obj["reason"] = json!(verdict);
                obj["message"] = json!(verdict.to_string());
                if !warnings.is_empty() {
                    obj["warnings"] = json!(warnings);
                }
            }
            FileOutcome::Unparseable { error, .. } => {
                obj["pass"] = serde_json::Value::Null;
                obj["error"] = json!(error);
            }
        }

        self.write_line(&obj.to_string());
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageId;

    struct TestWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl TestWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buffer = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    buffer: buffer.clone(),
                },
                buffer,
            )
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.buffer.lock().unwrap().flush()
        }
    }

    fn capture(mode: OutputMode, explain: bool, outcomes: &[FileOutcome]) -> String {
        let (writer, buffer) = TestWriter::new();
        let reporter = Reporter::with_writer(mode, explain, Box::new(writer));
        for outcome in outcomes {
            reporter.file(outcome);
        }
        let data = buffer.lock().unwrap();
        String::from_utf8(data.clone()).unwrap()
    }

    fn passing(name: &str) -> FileOutcome {
        FileOutcome::Checked {
            name: name.to_string(),
            verdict: Verdict::Unconstrained,
            warnings: vec![],
        }
    }

    fn failing(name: &str) -> FileOutcome {
        FileOutcome::Checked {
            name: name.to_string(),
            verdict: Verdict::DuplicateDependency {
                name: Some("C".to_string()),
            },
            warnings: vec![FormatWarning::AmbiguousCountLine { line: 4 }],
        }
    }

    fn broken(name: &str) -> FileOutcome {
        FileOutcome::Unparseable {
            name: name.to_string(),
            error: "line 1: expected a count, found 'x'".to_string(),
        }
    }

    #[test]
    fn test_human_mode_output() {
        let result = capture(
            OutputMode::Human,
            false,
            &[passing("a.txt"), failing("b.txt"), broken("c.txt")],
        );
        assert_eq!(
            result,
            "File a.txt Pass: true\n\
             File b.txt Pass: false\n\
             File c.txt Error: line 1: expected a count, found 'x'\n"
        );
    }

    #[test]
    fn test_human_mode_explain() {
        let result = capture(OutputMode::Human, true, &[failing("b.txt")]);
        assert!(result.contains("File b.txt Pass: false\n"));
        assert!(result.contains("  dependency 'C' is declared more than once"));
    }

    #[test]
    fn test_json_mode_output() {
        let result = capture(
            OutputMode::Json,
            false,
            &[passing("a.txt"), failing("b.txt"), broken("c.txt")],
        );
        let lines: Vec<serde_json::Value> = result
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["file"], "a.txt");
        assert_eq!(lines[0]["status"], "pass");
        assert_eq!(lines[0]["pass"], true);
        assert_eq!(lines[0]["reason"]["rule"], "unconstrained");

        assert_eq!(lines[1]["status"], "fail");
        assert_eq!(lines[1]["reason"]["name"], "C");
        assert_eq!(lines[1]["warnings"][0]["kind"], "ambiguous_count_line");

        assert_eq!(lines[2]["status"], "error");
        assert!(lines[2]["pass"].is_null());
        assert!(lines[2]["error"].as_str().unwrap().contains("expected a count"));
    }

    #[test]
    fn test_quiet_mode_skips_passing_files() {
        let result = capture(
            OutputMode::Quiet,
            false,
            &[passing("a.txt"), failing("b.txt"), broken("c.txt")],
        );
        assert!(!result.contains("a.txt"));
        assert!(result.contains("File b.txt Pass: false"));
        assert!(result.contains("File c.txt Error:"));
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = Summary::default();
        for outcome in [passing("a"), failing("b"), broken("c"), passing("d")] {
            summary.record(&outcome);
        }
        assert_eq!(
            summary,
            Summary {
                passed: 2,
                failed: 1,
                errors: 1
            }
        );
        assert_eq!(summary.total(), 4);
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_version_match_outcome_passes() {
        let outcome = FileOutcome::Checked {
            name: "x".to_string(),
            verdict: Verdict::VersionMatch {
                package: PackageId::new("A", "1.0"),
                dependency: PackageId::new("B", "1.0"),
            },
            warnings: vec![],
        };
        assert!(outcome.passed());
        assert_eq!(outcome.status(), "pass");
    }
}
