//! Candidate file discovery.
//!
//! Lists the manifests to check in a directory and, when no directory was
//! supplied, keeps asking for one until a directory with at least one
//! matching file is given. The prompt sits behind [`DirectoryPrompt`] so the
//! loop can be driven without a terminal.

use anyhow::Result;
use glob::Pattern;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Text shown when asking for a directory.
pub const PROMPT_TEXT: &str = "Please inform the path with package dependencies to be analyzed";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("no files matching '{pattern}' in {}", .path.display())]
    Empty { path: PathBuf, pattern: String },

    #[error("failed to read directory {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A file to be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// File name used in reports
    pub name: String,
    pub path: PathBuf,
}

impl CandidateFile {
    /// Read the whole file as UTF-8 text.
    pub fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

/// List regular files directly inside `dir` whose names match `pattern`,
/// sorted by name. An existing directory without matches is an error.
pub fn list_candidate_files(
    dir: &Path,
    pattern: &Pattern,
) -> Result<Vec<CandidateFile>, DiscoveryError> {
    if !dir.exists() {
        return Err(DiscoveryError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
    }

    let io_err = |source| DiscoveryError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if pattern.matches(&name) {
            files.push(CandidateFile { name, path });
        } else {
            tracing::trace!(file = %name, "skipping file not matching pattern");
        }
    }

    if files.is_empty() {
        return Err(DiscoveryError::Empty {
            path: dir.to_path_buf(),
            pattern: pattern.as_str().to_string(),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(dir = %dir.display(), count = files.len(), "discovered candidate files");
    Ok(files)
}

/// Source of directory paths for the interactive loop.
pub trait DirectoryPrompt {
    /// Ask for a path. `None` means no more input is available.
    fn ask(&mut self) -> Result<Option<String>>;

    /// Tell the user the last answer was not usable.
    fn reject(&mut self, reason: &DiscoveryError);
}

/// Ask until a directory with at least one matching file is given.
pub fn prompt_for_files(
    prompt: &mut dyn DirectoryPrompt,
    pattern: &Pattern,
) -> Result<(PathBuf, Vec<CandidateFile>)> {
    loop {
        let Some(answer) = prompt.ask()? else {
            anyhow::bail!("No directory given");
        };

        let dir = PathBuf::from(answer.trim());
        match list_candidate_files(&dir, pattern) {
            Ok(files) => return Ok((dir, files)),
            Err(e) => {
                tracing::debug!("rejected directory: {}", e);
                prompt.reject(&e);
            }
        }
    }
}

/// Prompt on the terminal, or read answers line by line from a piped stdin.
pub struct TerminalPrompt {
    interactive: bool,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            interactive: atty::is(atty::Stream::Stdin),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryPrompt for TerminalPrompt {
    fn ask(&mut self) -> Result<Option<String>> {
        if self.interactive {
            let answer: String = dialoguer::Input::new()
                .with_prompt(PROMPT_TEXT)
                .allow_empty(true)
                .interact_text()?;
            return Ok(Some(answer));
        }

        eprintln!("{}: ", PROMPT_TEXT);
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn reject(&mut self, reason: &DiscoveryError) {
        use colored::Colorize;
        eprintln!("{} {}\n", "Path is invalid!".red(), reason);
    }
}
