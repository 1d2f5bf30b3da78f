//! Image specifications and a simple resolution pass over the dependency graph.
//!
//! An image is a desired set of packages to end up installed together. The resolver
//! here is a greedy newest-first walk driven entirely by the graph's query
//! primitives; it reports every requirement it cannot reconcile instead of stopping
//! at the first.

use std::collections::VecDeque;

use pkgraph_core::DependencyGraph;
use pkgraph_core::package::*;

/// A description of a desired installation: package requirements plus where to look
/// for them.
#[derive(Debug, Default, Clone)]
pub struct ImageSpecifier {
	pub packages: Vec<PackageSpecifier>,
	pub repositories: Vec<String>,
	pub os: Option<String>,
	pub architecture: Option<String>,
}

impl ImageSpecifier {
	/// Parses a JSON image document, or an inline comma-separated
	/// `Name[:specifier]` list such as `REST-API,TUI:^1.0.0-beta`.
	pub fn from_string(s: &str) -> Result<Self, crate::Error> {
		if s.trim_start().starts_with('{') {
			Self::from_json(s)
		} else {
			Self::from_inline(s)
		}
	}

	fn from_json(s: &str) -> Result<Self, crate::Error> {
		let doc: serde_json::Value = serde_json::from_str(s)
			.map_err(|e| crate::Error::ImageSpec(format!("not valid JSON: {}", e)))?;

		let mut image = ImageSpecifier::default();
		if let Some(packages) = doc.get("packages") {
			let packages = packages.as_array()
				.ok_or_else(|| crate::Error::ImageSpec("packages must be an array".to_string()))?;
			for elem in packages {
				let name = elem.get("name")
					.and_then(|v| v.as_str())
					.ok_or_else(|| crate::Error::ImageSpec("package entry has no name".to_string()))?;
				let version = match elem.get("version").and_then(|v| v.as_str()) {
					Some(spec) => VersionSpecifier::parse(spec)
						.map_err(|e| crate::Error::ImageSpec(format!("package {}: {}", name, e)))?,
					None => VersionSpecifier::ANY,
				};
				image.packages.push(PackageSpecifier::new(name, version));
			}
		}
		if let Some(repositories) = doc.get("repositories").and_then(|v| v.as_array()) {
			for repo in repositories {
				if let Some(url) = repo.as_str() {
					image.repositories.push(url.to_string());
				}
			}
		}
		image.os = doc.get("os").and_then(|v| v.as_str()).map(str::to_string);
		image.architecture = doc.get("architecture").and_then(|v| v.as_str()).map(str::to_string);
		Ok(image)
	}

	fn from_inline(s: &str) -> Result<Self, crate::Error> {
		let mut image = ImageSpecifier::default();
		for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
			let (name, version) = match part.split_once(':') {
				Some((name, spec)) => (
					name,
					VersionSpecifier::parse(spec)
						.map_err(|e| crate::Error::ImageSpec(format!("package {}: {}", name, e)))?,
				),
				None => (part, VersionSpecifier::ANY),
			};
			image.packages.push(PackageSpecifier::new(name, version));
		}
		if image.packages.is_empty() {
			return Err(crate::Error::ImageSpec("image names no packages".to_string()));
		}
		Ok(image)
	}
}

/// One release picked by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
	pub name: String,
	pub version: SemanticVersion,
}

/// Every requirement the resolver could not reconcile, one diagnostic per line.
#[derive(Debug, thiserror::Error)]
#[error("unable to resolve image")]
pub struct ResolveError {
	pub errors: Vec<String>,
}

/// Picks one concrete release per required package, newest first.
///
/// Requirements and the dependencies they pull in are worked breadth-first; every
/// candidate is vetted with `could_satisfy` against the working selection and the
/// `fixed` packages of an existing installation before it is accepted.
pub fn resolve(
	graph: &mut DependencyGraph,
	requirements: &[PackageSpecifier],
	fixed: &[PackageSpecifier],
) -> Result<Vec<ResolvedPackage>, ResolveError> {
	let mut queue: VecDeque<PackageSpecifier> = requirements.iter().cloned().collect();
	let mut proposed: Vec<PackageSpecifier> = requirements.to_vec();
	let mut chosen: Vec<ResolvedPackage> = Vec::new();
	let mut errors: Vec<String> = Vec::new();

	while let Some(requirement) = queue.pop_front() {
		if let Some(existing) = chosen.iter().find(|p| p.name == requirement.name) {
			if !requirement.version.is_any() && !requirement.version.is_compatible(&existing.version) {
				errors.push(format!(
					"{} is required as {} but {} was already selected",
					requirement.name, requirement.version, existing.version
				));
			}
			continue;
		}

		let mut candidates = graph.packages_satisfying(&requirement);
		candidates.sort();

		let pick = candidates.into_iter().rev().find(|candidate| {
			let exact = VersionSpecifier::exact(candidate);
			graph.could_satisfy(&requirement.name, &exact, &proposed, fixed)
		});
		let version = match pick {
			Some(version) => version,
			None => {
				errors.push(format!("no package satisfies {}", requirement));
				continue;
			}
		};

		log::debug!("selected {}:{}", requirement.name, version);
		let dependencies: Vec<_> = graph.get_dependencies(&requirement.name, &version).collect();

		/* pin the selection so later feasibility checks see it */
		if let Some(entry) = proposed.iter_mut().find(|p| p.name == requirement.name) {
			entry.version = VersionSpecifier::exact(&version);
		} else {
			proposed.push(PackageSpecifier::new(requirement.name.clone(), VersionSpecifier::exact(&version)));
		}
		chosen.push(ResolvedPackage { name: requirement.name.clone(), version });

		for dependency in dependencies {
			if !proposed.iter().any(|p| p.name == dependency.name) {
				proposed.push(dependency.clone());
			}
			queue.push_back(dependency);
		}
	}

	if errors.is_empty() {
		chosen.sort_by(|lhs, rhs| lhs.name.cmp(&rhs.name));
		Ok(chosen)
	} else {
		Err(ResolveError { errors })
	}
}
