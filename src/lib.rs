//! # pkgcheck - package manifest consistency checks
//!
//! pkgcheck reads flat, line-oriented descriptions of packages and the
//! dependencies they declare, and answers one question per document: is this
//! package/dependency set internally consistent?
//!
//! It is not a resolver. It never selects versions or walks transitive
//! chains; it only judges a fixed set of packages-with-versions.
//!
//! ## Modules
//!
//! - [`package`] - Package, dependency and package set model
//! - [`parse`] - Legacy and sectioned manifest parsing
//! - [`check`] - Consistency rules and verdicts
//! - [`discover`] - Candidate file listing and the directory prompt
//! - [`batch`] - Per-file check loop with failure isolation
//! - [`report`] - Human, JSON and quiet output
//! - [`config`] - Config file, environment and flag merging
//!
//! ## Example
//!
//! ```
//! use pkgcheck::{check, parse};
//!
//! let set = parse("2\nA,1.0\nB,1.0\n1\nA,1.0,B,2.0\n").unwrap();
//! assert!(!check(&set));
//! ```

pub mod batch;
pub mod check;
pub mod config;
pub mod discover;
pub mod package;
pub mod parse;
pub mod report;

pub use check::{check, evaluate, Verdict};
pub use package::{Dependency, Package, PackageId, PackageSet};
pub use parse::{parse, parse_with, Encoding, FormatError};
