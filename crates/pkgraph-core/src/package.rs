//! Value types describing packages, versions and version requirements.

use serde::{Serialize, Deserialize};

mod semantic_version;
pub use semantic_version::SemanticVersion;

mod version_specifier;
pub use version_specifier::VersionSpecifier;
pub use version_specifier::MatchBehavior;

mod import;
pub(crate) use import::CatalogEntry;

/// A declared requirement of a release: some version of `name` matching `version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageDependency {
	pub name: String,
	pub version: VersionSpecifier,
}

impl PackageDependency {
	pub fn new(name: impl Into<String>, version: VersionSpecifier) -> Self {
		Self { name: name.into(), version }
	}
}

/// Describes a range of releases of one package.
///
/// Used both as a query input and as a dependency edge rendered back to caller form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageSpecifier {
	pub name: String,
	pub version: VersionSpecifier,
}

impl PackageSpecifier {
	pub fn new(name: impl Into<String>, version: VersionSpecifier) -> Self {
		Self { name: name.into(), version }
	}
}

impl std::fmt::Display for PackageSpecifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.name, self.version)
	}
}

/// One concrete release and its declared dependencies.
///
/// This is the unit both graph loaders consume and [`DependencyGraph::package_defs`]
/// re-emits. Definitions produced by the graph are severely limited compared to a real
/// catalog entry and should only be used for testing or for building another graph.
///
/// [`DependencyGraph::package_defs`]: crate::DependencyGraph::package_defs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDef {
	pub name: String,
	pub version: SemanticVersion,
	pub dependencies: Vec<PackageDependency>,
}

impl PackageDef {
	pub fn new(name: impl Into<String>, version: SemanticVersion) -> Self {
		Self { name: name.into(), version, dependencies: Vec::new() }
	}
}

impl std::fmt::Display for PackageDef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}-{}", self.name, self.version)
	}
}
