//! Package and dependency model produced by the parser.
//!
//! A [`PackageSet`] is one parsed document. Packages are identified by the
//! `(name, version)` pair; the name alone is not unique. Dependencies are
//! owned by the package that declares them and refer to their target only by
//! [`PackageId`], which may or may not resolve to a package in the same set.

use serde::Serialize;
use std::fmt;

/// A `(name, version)` pair identifying a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageId {
    pub name: String,
    pub version: String,
}

impl PackageId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A single declared dependency record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Required package, absent for placeholder and malformed records
    pub target: Option<PackageId>,
    /// Whether the dependency line was well-formed
    pub valid: bool,
}

impl Dependency {
    /// A two-field line: the package declares a dependency with no named target.
    pub fn placeholder() -> Self {
        Self {
            target: None,
            valid: true,
        }
    }

    /// A four-field line naming a concrete target.
    pub fn on(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            target: Some(PackageId::new(name, version)),
            valid: true,
        }
    }

    /// A line with any other field count.
    pub fn malformed() -> Self {
        Self {
            target: None,
            valid: false,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.name.as_str())
    }

    pub fn version(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.version.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<Dependency>,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: Vec::new(),
        }
    }

    /// Returns true when this package is exactly `(name, version)`.
    pub fn is(&self, name: &str, version: &str) -> bool {
        self.name == name && self.version == version
    }

    pub fn id(&self) -> PackageId {
        PackageId::new(self.name.clone(), self.version.clone())
    }
}

/// Non-fatal observations made while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatWarning {
    /// The dependency count was read from a line that does not directly
    /// follow the package block.
    AmbiguousCountLine { line: usize },
}

impl fmt::Display for FormatWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousCountLine { line } => write!(
                f,
                "dependency count taken from line {} which does not follow the package block",
                line
            ),
        }
    }
}

/// The fully parsed representation of one input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageSet {
    /// Package count as declared by the document
    pub declared_package_count: usize,
    /// Dependency count as declared by the document
    pub declared_dependency_count: usize,
    /// Packages in declaration order
    pub packages: Vec<Package>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FormatWarning>,
}

impl PackageSet {
    /// First package equal to `(name, version)`.
    pub fn find_mut(&mut self, name: &str, version: &str) -> Option<&mut Package> {
        self.packages.iter_mut().find(|p| p.is(name, version))
    }

    /// Every dependency record in package order, then declaration order.
    pub fn dependencies(&self) -> impl Iterator<Item = (&Package, &Dependency)> {
        self.packages
            .iter()
            .flat_map(|p| p.dependencies.iter().map(move |d| (p, d)))
    }

    pub fn dependency_count(&self) -> usize {
        self.packages.iter().map(|p| p.dependencies.len()).sum()
    }
}
