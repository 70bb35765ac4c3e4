//! Manifest parsing.
//!
//! Two encodings are understood. The legacy encoding locates its two count
//! lines by searching for lines without a comma:
//!
//! ```text
//! 2            <- first comma-free line: package count
//! A,1.0
//! B,1.0,C,2.0  <- a line may declare several packages
//! 1            <- last comma-free line: dependency count
//! A,1.0,B,1.0
//! ```
//!
//! The sectioned encoding carries an explicit, versioned header and labelled
//! section counts, which are enforced:
//!
//! ```text
//! #pkgcheck v1
//! packages 2
//! A,1.0
//! B,1.0
//! dependencies 1
//! A,1.0,B,1.0
//! ```
//!
//! Both produce the same [`PackageSet`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::package::{Dependency, FormatWarning, Package, PackageId, PackageSet};

/// First token of a sectioned document.
pub const SECTIONED_MAGIC: &str = "#pkgcheck";
/// Sectioned format version this parser understands.
pub const SECTIONED_VERSION: &str = "v1";

/// Manifest encoding selection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Sniff the header: sectioned when it starts with `#pkgcheck`, legacy otherwise
    #[default]
    Auto,
    Legacy,
    Sectioned,
}

impl Encoding {
    /// Resolve `Auto` against the document content.
    pub fn resolve(self, raw: &str) -> Encoding {
        match self {
            Encoding::Auto => {
                let first = source_lines(raw).into_iter().next();
                match first {
                    Some(line) if line.text.trim_start().starts_with(SECTIONED_MAGIC) => {
                        Encoding::Sectioned
                    }
                    _ => Encoding::Legacy,
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Legacy => write!(f, "legacy"),
            Self::Sectioned => write!(f, "sectioned"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Packages,
    Dependencies,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Packages => write!(f, "packages"),
            Self::Dependencies => write!(f, "dependencies"),
        }
    }
}

/// Reasons a document cannot be turned into a [`PackageSet`].
///
/// Line numbers are 1-based positions in the original text, blank lines
/// included.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("document is empty")]
    Empty,

    #[error("no count line found (every line contains a comma)")]
    MissingCount,

    #[error("line {line}: expected a count, found '{value}'")]
    InvalidCount { line: usize, value: String },

    #[error(
        "line {line}: {section} section declares {declared} lines but only {available} follow"
    )]
    SectionOutOfBounds {
        section: Section,
        line: usize,
        declared: usize,
        available: usize,
    },

    #[error("line {line}: package line has an odd number of fields ({fields})")]
    OddPackageFields { line: usize, fields: usize },

    #[error("line {line}: invalid header '{text}', expected '#pkgcheck v1'")]
    InvalidHeader { line: usize, text: String },

    #[error("unsupported format version '{0}' (supported: v1)")]
    UnsupportedVersion(String),

    #[error("line {line}: expected '{expected} <count>', found '{found}'")]
    MissingSection {
        line: usize,
        expected: Section,
        found: String,
    },

    #[error("{section} section declares {declared} lines but contains {found}")]
    SectionCountMismatch {
        section: Section,
        declared: usize,
        found: usize,
    },
}

/// A non-blank source line with its original line number.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

impl<'a> Line<'a> {
    fn fields(&self) -> Vec<&'a str> {
        self.text.split(',').collect()
    }

    fn is_count_line(&self) -> bool {
        !self.text.contains(',')
    }
}

fn source_lines(raw: &str) -> Vec<Line<'_>> {
    raw.split('\n')
        .enumerate()
        .map(|(i, text)| Line {
            number: i + 1,
            text: text.strip_suffix('\r').unwrap_or(text),
        })
        .filter(|line| !line.text.trim().is_empty())
        .collect()
}

/// Parse a document, detecting its encoding.
pub fn parse(raw: &str) -> Result<PackageSet, FormatError> {
    parse_with(raw, Encoding::Auto)
}

/// Parse a document with an explicit encoding.
pub fn parse_with(raw: &str, encoding: Encoding) -> Result<PackageSet, FormatError> {
    let lines = source_lines(raw);
    if lines.is_empty() {
        return Err(FormatError::Empty);
    }

    let set = match encoding.resolve(raw) {
        Encoding::Sectioned => parse_sectioned(&lines)?,
        _ => parse_legacy(&lines)?,
    };

    tracing::debug!(
        packages = set.packages.len(),
        dependencies = set.dependency_count(),
        "parsed manifest"
    );
    Ok(set)
}

fn parse_legacy(lines: &[Line<'_>]) -> Result<PackageSet, FormatError> {
    let package_idx = lines
        .iter()
        .position(Line::is_count_line)
        .ok_or(FormatError::MissingCount)?;
    let dependency_idx = lines
        .iter()
        .rposition(Line::is_count_line)
        .ok_or(FormatError::MissingCount)?;

    let declared_package_count = parse_count(&lines[package_idx])?;
    let declared_dependency_count = parse_count(&lines[dependency_idx])?;

    let package_lines = section(lines, package_idx, declared_package_count, Section::Packages)?;
    let packages = read_packages(package_lines)?;

    let dependency_lines = section(
        lines,
        dependency_idx,
        declared_dependency_count,
        Section::Dependencies,
    )?;

    let mut set = PackageSet {
        declared_package_count,
        declared_dependency_count,
        packages,
        warnings: Vec::new(),
    };

    // The sentinel search only agrees with the declared layout when the
    // dependency count line directly follows the package block.
    if dependency_idx != package_idx + 1 + declared_package_count {
        let warning = FormatWarning::AmbiguousCountLine {
            line: lines[dependency_idx].number,
        };
        tracing::warn!("{}", warning);
        set.warnings.push(warning);
    }

    attach_dependencies(&mut set, dependency_lines);
    Ok(set)
}

fn parse_sectioned(lines: &[Line<'_>]) -> Result<PackageSet, FormatError> {
    let header = lines[0];
    let tokens: Vec<&str> = header.text.split_whitespace().collect();
    match tokens.as_slice() {
        [SECTIONED_MAGIC, SECTIONED_VERSION] => {}
        [SECTIONED_MAGIC, version] => {
            return Err(FormatError::UnsupportedVersion(version.to_string()));
        }
        _ => {
            return Err(FormatError::InvalidHeader {
                line: header.number,
                text: header.text.to_string(),
            });
        }
    }

    let declared_package_count = section_header(lines, 1, Section::Packages)?;

    let package_end = lines[2..]
        .iter()
        .position(Line::is_count_line)
        .map(|offset| offset + 2)
        .unwrap_or(lines.len());
    let package_lines = &lines[2..package_end];
    if package_lines.len() != declared_package_count {
        return Err(FormatError::SectionCountMismatch {
            section: Section::Packages,
            declared: declared_package_count,
            found: package_lines.len(),
        });
    }

    let declared_dependency_count = section_header(lines, package_end, Section::Dependencies)?;
    let dependency_lines = &lines[package_end + 1..];
    if dependency_lines.len() != declared_dependency_count {
        return Err(FormatError::SectionCountMismatch {
            section: Section::Dependencies,
            declared: declared_dependency_count,
            found: dependency_lines.len(),
        });
    }

    let mut set = PackageSet {
        declared_package_count,
        declared_dependency_count,
        packages: read_packages(package_lines)?,
        warnings: Vec::new(),
    };
    attach_dependencies(&mut set, dependency_lines);
    Ok(set)
}

/// Read a `<section> <count>` line at `idx`.
fn section_header(lines: &[Line<'_>], idx: usize, expected: Section) -> Result<usize, FormatError> {
    let Some(line) = lines.get(idx) else {
        let last = lines.last().map(|l| l.number).unwrap_or(0);
        return Err(FormatError::MissingSection {
            line: last + 1,
            expected,
            found: String::new(),
        });
    };

    let label = expected.to_string();
    match line.text.split_whitespace().collect::<Vec<_>>().as_slice() {
        [name, count] if *name == label => count.parse().map_err(|_| FormatError::InvalidCount {
            line: line.number,
            value: count.to_string(),
        }),
        _ => Err(FormatError::MissingSection {
            line: line.number,
            expected,
            found: line.text.to_string(),
        }),
    }
}

fn parse_count(line: &Line<'_>) -> Result<usize, FormatError> {
    line.text
        .trim()
        .parse()
        .map_err(|_| FormatError::InvalidCount {
            line: line.number,
            value: line.text.trim().to_string(),
        })
}

/// The `count` lines following the count line at `idx`.
fn section<'l, 'a>(
    lines: &'l [Line<'a>],
    idx: usize,
    count: usize,
    section: Section,
) -> Result<&'l [Line<'a>], FormatError> {
    let start = idx + 1;
    start
        .checked_add(count)
        .and_then(|end| lines.get(start..end))
        .ok_or(FormatError::SectionOutOfBounds {
            section,
            line: lines[idx].number,
            declared: count,
            available: lines.len().saturating_sub(start),
        })
}

/// Each line is a flattened list of `(name, version)` pairs.
fn read_packages(lines: &[Line<'_>]) -> Result<Vec<Package>, FormatError> {
    let mut packages = Vec::new();
    for line in lines {
        let fields = line.fields();
        if fields.len() % 2 != 0 {
            return Err(FormatError::OddPackageFields {
                line: line.number,
                fields: fields.len(),
            });
        }
        packages.extend(fields.chunks(2).map(|pair| Package::new(pair[0], pair[1])));
    }
    Ok(packages)
}

fn attach_dependencies(set: &mut PackageSet, lines: &[Line<'_>]) {
    for line in lines {
        let Some((owner, dependency)) = parse_dependency_line(line.text) else {
            tracing::debug!(line = line.number, "dependency line names no package, skipped");
            continue;
        };

        match set.find_mut(&owner.name, &owner.version) {
            Some(package) => package.dependencies.push(dependency),
            None => tracing::debug!(
                line = line.number,
                owner = %owner,
                "dependency declared by unknown package, dropped"
            ),
        }
    }
}

/// Split one dependency line into its owning package and the record it declares.
///
/// Exactly two fields declare a placeholder, exactly four a concrete edge;
/// any other shape yields an invalid record. Returns `None` when the line has
/// fewer than two fields and so cannot name its owner.
pub fn parse_dependency_line(text: &str) -> Option<(PackageId, Dependency)> {
    let fields: Vec<&str> = text.split(',').collect();
    let dependency = match fields.as_slice() {
        [_] | [] => return None,
        [_, _] => Dependency::placeholder(),
        [_, _, name, version] => Dependency::on(*name, *version),
        _ => Dependency::malformed(),
    };
    Some((PackageId::new(fields[0], fields[1]), dependency))
}
