//! Consistency rules applied to a parsed [`PackageSet`].
//!
//! Two rules, combined with logical AND:
//!
//! - **Unique dependency names.** Every dependency record in the whole set is
//!   grouped by target name (version ignored, declaring package ignored). Any
//!   group with more than one record fails the set. Records without a target
//!   fall into a single unnamed group.
//! - **First resolved dependency decides.** Dependencies are scanned in package
//!   order, then declaration order. An invalid record fails the set. The first
//!   record whose name matches a declared package ends the scan: equal versions
//!   pass, different versions fail. Records that match nothing impose no
//!   constraint, and a scan that finds no match passes.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::package::{Package, PackageId, PackageSet};

/// Outcome of checking one document, with the reason for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Verdict {
    /// No dependency resolved to a package in the set
    Unconstrained,
    /// The first resolved dependency matched the declared version
    VersionMatch {
        package: PackageId,
        dependency: PackageId,
    },
    /// More than one dependency record shares this name (`None` for records without a target)
    DuplicateDependency { name: Option<String> },
    /// A dependency line of `package` was malformed
    MalformedDependency { package: PackageId, index: usize },
    /// The first resolved dependency asked for a version other than the declared one
    VersionMismatch {
        package: PackageId,
        dependency: PackageId,
        declared_version: String,
    },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Unconstrained | Self::VersionMatch { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => write!(f, "no dependency resolves to a declared package"),
            Self::VersionMatch {
                package,
                dependency,
            } => write!(f, "{} requires {}, which is declared", package, dependency),
            Self::DuplicateDependency { name: Some(name) } => {
                write!(f, "dependency '{}' is declared more than once", name)
            }
            Self::DuplicateDependency { name: None } => {
                write!(f, "more than one dependency record has no target")
            }
            Self::MalformedDependency { package, index } => {
                write!(f, "dependency #{} of {} is malformed", index + 1, package)
            }
            Self::VersionMismatch {
                package,
                dependency,
                declared_version,
            } => write!(
                f,
                "{} requires {}, but {} is declared at {}",
                package, dependency, dependency.name, declared_version
            ),
        }
    }
}

/// Returns whether the set is internally consistent.
pub fn check(set: &PackageSet) -> bool {
    evaluate(set).passed()
}

/// Apply both rules and explain the outcome.
pub fn evaluate(set: &PackageSet) -> Verdict {
    let verdict = duplicate_dependency(set).unwrap_or_else(|| first_resolved_dependency(set));
    tracing::debug!(passed = verdict.passed(), reason = %verdict, "evaluated package set");
    verdict
}

fn duplicate_dependency(set: &PackageSet) -> Option<Verdict> {
    let mut seen: HashMap<Option<&str>, usize> = HashMap::new();
    for (_, dependency) in set.dependencies() {
        let count = seen.entry(dependency.name()).or_insert(0);
        *count += 1;
        if *count > 1 {
            return Some(Verdict::DuplicateDependency {
                name: dependency.name().map(str::to_string),
            });
        }
    }
    None
}

fn first_resolved_dependency(set: &PackageSet) -> Verdict {
    // First package per name, matching a front-to-back scan.
    let mut by_name: HashMap<&str, &Package> = HashMap::new();
    for package in &set.packages {
        by_name.entry(package.name.as_str()).or_insert(package);
    }

    for package in &set.packages {
        for (index, dependency) in package.dependencies.iter().enumerate() {
            if !dependency.valid {
                return Verdict::MalformedDependency {
                    package: package.id(),
                    index,
                };
            }

            let Some(target) = &dependency.target else {
                continue;
            };
            let Some(declared) = by_name.get(target.name.as_str()) else {
                continue;
            };

            // Probable defect carried for compatibility: the first dependency
            // that resolves settles the verdict and everything after it is
            // never looked at. Aggregating over all dependencies would change
            // observable results.
            return if declared.version == target.version {
                Verdict::VersionMatch {
                    package: package.id(),
                    dependency: target.clone(),
                }
            } else {
                Verdict::VersionMismatch {
                    package: package.id(),
                    dependency: target.clone(),
                    declared_version: declared.version.clone(),
                }
            };
        }
    }

    Verdict::Unconstrained
}
