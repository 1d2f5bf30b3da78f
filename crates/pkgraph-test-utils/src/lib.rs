//! Various helper fixtures for testing
//!
//! Functions in this module panic with a message on bad fixture data; they are only
//! ever driven by tests.

use pkgraph_core::package::*;
use pkgraph_core::DependencyGraph;

/// Builds a package definition from plain strings.
pub fn package_def(name: &str, version: &str, dependencies: &[(&str, &str)]) -> PackageDef {
	PackageDef {
		name: name.to_string(),
		version: version.parse().expect("fixture version should parse"),
		dependencies: dependencies.iter()
			.map(|&(dep_name, dep_version)| PackageDependency::new(
				dep_name,
				VersionSpecifier::parse(dep_version).expect("fixture specifier should parse"),
			))
			.collect(),
	}
}

/// Builds a package specifier from plain strings.
pub fn package_specifier(name: &str, version: &str) -> PackageSpecifier {
	PackageSpecifier::new(name, VersionSpecifier::parse(version).expect("fixture specifier should parse"))
}

/// A small catalog document with a handful of interdependent packages, one malformed
/// version and one entry missing its version field.
pub fn sample_catalog_json() -> serde_json::Value {
	serde_json::json!({ "packages": [
		{ "name": "Editor", "version": "1.0.0" },
		{ "name": "Editor", "version": "1.5.0" },
		{ "name": "Editor", "version": "2.0.0", "dependencies": [
			{ "name": "Runtime", "version": "^2.0.0" },
		]},
		{ "name": "Runtime", "version": "2.1.0" },
		{ "name": "Runtime", "version": "not.a.version" },
		{ "name": "Broken" },
	]})
}

/// The number of well-formed releases in [`sample_catalog_json`].
pub const SAMPLE_CATALOG_COUNT: usize = 4;

/// A graph preloaded from [`sample_catalog_json`].
pub fn sample_graph() -> DependencyGraph {
	let mut graph = DependencyGraph::new();
	graph.load_from_json(&sample_catalog_json());
	graph
}

/// A scratch directory for cache round-trip tests.
pub fn temp_dir() -> tempfile::TempDir {
	tempfile::tempdir().expect("failed to create temporary directory")
}
