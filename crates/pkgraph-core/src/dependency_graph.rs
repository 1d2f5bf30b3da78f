//! # The package dependency graph
//!
//! Describes every known version of every package in a memory-efficient way. Each
//! unique name, version and version specifier is stored once and referred to by a
//! small id; the relations between them are a couple of maps over those ids.
//!
//! The graph can be merged from any number of sources, local catalog files as well as
//! remote indexes, by loading them one after another into the same instance. The
//! source of each entry is lost in the process; when provenance is needed it has to
//! come from a separate lookup, this code is not concerned with it.

use std::collections::{HashMap, HashSet};

use serde::{Serialize, Deserialize};

use crate::package::*;

/// Strategy for broadening the graph when a query asks for a pre-release channel
/// that has not been loaded yet.
///
/// For example if only release packages of one specific name have been loaded, the
/// graph calls this to pull in e.g. the beta builds before answering. The extender is
/// expected to load additional entries into the graph it is handed and return; the
/// query resumes afterwards and naturally includes whatever was added.
pub trait PrereleaseExtender {
	fn extend(&mut self, graph: &mut DependencyGraph, name: &str, prerelease: &str);
}

impl<F> PrereleaseExtender for F
where F: FnMut(&mut DependencyGraph, &str, &str)
{
	fn extend(&mut self, graph: &mut DependencyGraph, name: &str, prerelease: &str) {
		self(graph, name, prerelease)
	}
}

/// The interned catalog of package releases and their dependency edges.
///
/// Grows monotonically for its whole lifetime: ids are append-only indexes into the
/// lookup tables and are never reassigned, loaded releases are never removed.
#[derive(Default, Serialize, Deserialize)]
pub struct DependencyGraph {
	/* id -> value. ids are indexes into these tables. */
	name_lookup: Vec<String>,
	version_lookup: Vec<SemanticVersion>,
	specifier_lookup: Vec<VersionSpecifier>,

	/* value -> id */
	name_ids: HashMap<String, usize>,
	version_ids: HashMap<SemanticVersion, usize>,
	specifier_ids: HashMap<VersionSpecifier, usize>,

	/* string -> parsed value, avoids re-parsing identical strings across sources. */
	version_cache: HashMap<String, SemanticVersion>,
	specifier_cache: HashMap<String, VersionSpecifier>,

	/* name id -> every known version id of that name. */
	versions: HashMap<usize, HashSet<usize>>,

	/* (name id, version id) -> dependency edges. absent means "no dependencies". */
	dependencies: HashMap<(usize, usize), Vec<(usize, usize)>>,

	/* most recent pre-release channel requested per name. updated on strict advance
	 * only, so repeated or older requests don't re-trigger the extender. */
	current_prereleases: HashMap<String, String>,

	#[serde(skip)]
	prerelease_extender: Option<Box<dyn PrereleaseExtender>>,
}

impl DependencyGraph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_prerelease_extender(extender: Box<dyn PrereleaseExtender>) -> Self {
		Self { prerelease_extender: Some(extender), ..Default::default() }
	}

	pub fn set_prerelease_extender(&mut self, extender: Option<Box<dyn PrereleaseExtender>>) {
		self.prerelease_extender = extender;
	}

	/// The total number of releases contained in this graph.
	pub fn count(&self) -> usize {
		self.versions.values().map(|set| set.len()).sum()
	}

	fn name_id(&mut self, name: &str) -> usize {
		if let Some(&id) = self.name_ids.get(name) {
			return id;
		}
		let id = self.name_lookup.len();
		self.name_ids.insert(name.to_string(), id);
		self.versions.insert(id, HashSet::new());
		self.name_lookup.push(name.to_string());
		id
	}

	fn version_id(&mut self, version: &SemanticVersion) -> usize {
		if let Some(&id) = self.version_ids.get(version) {
			return id;
		}
		let id = self.version_lookup.len();
		self.version_ids.insert(version.clone(), id);
		self.version_lookup.push(version.clone());
		id
	}

	fn specifier_id(&mut self, specifier: &VersionSpecifier) -> usize {
		if let Some(&id) = self.specifier_ids.get(specifier) {
			return id;
		}
		let id = self.specifier_lookup.len();
		self.specifier_ids.insert(specifier.clone(), id);
		self.specifier_lookup.push(specifier.clone());
		id
	}

	fn cached_version(&mut self, s: &str) -> crate::Result<SemanticVersion> {
		if let Some(version) = self.version_cache.get(s) {
			return Ok(version.clone());
		}
		let version: SemanticVersion = s.parse()?;
		self.version_cache.insert(s.to_string(), version.clone());
		Ok(version)
	}

	fn cached_specifier(&mut self, s: &str) -> crate::Result<VersionSpecifier> {
		if let Some(specifier) = self.specifier_cache.get(s) {
			return Ok(specifier.clone());
		}
		let specifier = VersionSpecifier::parse(s)?;
		self.specifier_cache.insert(s.to_string(), specifier.clone());
		Ok(specifier)
	}

	/// Loads package definitions into the graph. Returns how many releases were new.
	///
	/// Loading is a pure insertion and safe to repeat with overlapping inputs, which
	/// is also how graphs from independent sources are merged. A definition carrying
	/// dependencies overwrites the stored edge list for that exact release; a later,
	/// possibly more complete, update for the same version supersedes the earlier one.
	pub fn load_from_package_defs<I>(&mut self, packages: I) -> usize
	where I: IntoIterator<Item = PackageDef>
	{
		let mut added = 0;
		for def in packages {
			let id = self.name_id(&def.name);
			let vid = self.version_id(&def.version);
			if self.versions.entry(id).or_default().insert(vid) {
				added += 1;
			}
			if !def.dependencies.is_empty() {
				let edges = def.dependencies.iter()
					.map(|dep| (self.name_id(&dep.name), self.specifier_id(&dep.version)))
					.collect();
				self.dependencies.insert((id, vid), edges);
			}
		}
		log::debug!("loaded {} new releases from package definitions", added);
		added
	}

	/// Loads a catalog document into the graph. Returns how many releases were new.
	///
	/// The document is either an array of package entries or an object with a
	/// `packages` array; each entry has string fields `name`/`version` and an optional
	/// `dependencies` array of the same shape. Entries that don't match the schema or
	/// carry an unparseable version are skipped whole, partially-corrupt catalogs
	/// still contribute their good entries. Entries for an already loaded release are
	/// skipped too.
	pub fn load_from_json(&mut self, document: &serde_json::Value) -> usize {
		let packages = match document.get("packages").unwrap_or(document).as_array() {
			Some(array) => array,
			None => {
				log::warn!("catalog document has no packages array, nothing loaded");
				return 0;
			}
		};

		let mut added = 0;
		'entry: for (i, elem) in packages.iter().enumerate() {
			let entry = match CatalogEntry::read_from_json(elem) {
				Ok(entry) => entry,
				Err(e) => {
					log::debug!("skipping catalog entry {}: {}", i, e);
					continue;
				}
			};
			let version = match self.cached_version(&entry.version) {
				Ok(version) => version,
				Err(e) => {
					log::debug!("skipping catalog entry {} ({}): {}", i, entry.name, e);
					continue;
				}
			};
			/* parse every dependency before touching the tables so a bad entry leaves no trace */
			let mut deps = Vec::with_capacity(entry.dependencies.len());
			for dep in &entry.dependencies {
				match self.cached_specifier(&dep.version) {
					Ok(specifier) => deps.push((dep.name.clone(), specifier)),
					Err(e) => {
						log::debug!("skipping catalog entry {} ({}): {}", i, entry.name, e);
						continue 'entry;
					}
				}
			}

			let id = self.name_id(&entry.name);
			let vid = self.version_id(&version);
			if !self.versions.entry(id).or_default().insert(vid) {
				continue; /* release already known */
			}
			added += 1;
			if !deps.is_empty() {
				let edges = deps.into_iter()
					.map(|(name, specifier)| (self.name_id(&name), self.specifier_id(&specifier)))
					.collect();
				self.dependencies.insert((id, vid), edges);
			}
		}
		log::debug!("loaded {} new releases from catalog document", added);
		added
	}

	/// Every loaded version of the specified package that the specifier accepts, in
	/// the catalog's internal (unordered) enumeration order.
	///
	/// An unknown name yields an empty list rather than an error. When the specifier
	/// requests a pre-release channel the graph may first call the configured
	/// [`PrereleaseExtender`] to pull additional builds in, which is why this query
	/// takes `&mut self` and returns a snapshot rather than a borrowed iterator.
	pub fn packages_satisfying(&mut self, specifier: &PackageSpecifier) -> Vec<SemanticVersion> {
		self.extend_prereleases_for(specifier);

		let id = match self.name_ids.get(&specifier.name) {
			Some(&id) => id,
			None => return Vec::new(),
		};
		let versions = match self.versions.get(&id) {
			Some(set) => set,
			None => return Vec::new(),
		};
		versions.iter()
			.map(|&vid| &self.version_lookup[vid])
			.filter(|version| specifier.version.is_any() || specifier.version.is_compatible(version))
			.cloned()
			.collect()
	}

	fn extend_prereleases_for(&mut self, specifier: &PackageSpecifier) {
		let requested = if specifier.version.matches_any_prerelease() {
			/* the wildcard maps to the channel below every real one */
			Some("alpha".to_string())
		} else {
			specifier.version.prerelease_channel().map(str::to_string)
		};
		let requested = match requested {
			Some(channel) => channel,
			None => return,
		};

		if let Some(current) = self.current_prereleases.get(&specifier.name) {
			if requested.as_str() <= current.as_str() {
				return;
			}
		}
		self.current_prereleases.insert(specifier.name.clone(), requested.clone());

		/* the extender is taken out for the duration of the call so it can load into
		 * this same graph re-entrantly. */
		if let Some(mut extender) = self.prerelease_extender.take() {
			extender.extend(self, &specifier.name, &requested);
			self.prerelease_extender = Some(extender);
		}
	}

	/// Whether this exact release has been loaded.
	pub fn has_package(&self, name: &str, version: &SemanticVersion) -> bool {
		let id = match self.name_ids.get(name) {
			Some(&id) => id,
			None => return false,
		};
		let vid = match self.version_ids.get(version) {
			Some(&vid) => vid,
			None => return false,
		};
		self.versions.get(&id).map(|set| set.contains(&vid)).unwrap_or(false)
	}

	/// The dependency edges of one exact release, rendered back to caller form.
	///
	/// Empty both for a dependency-free release and for a release that was never
	/// loaded; callers must not distinguish the two here.
	pub fn get_dependencies<'a>(&'a self, name: &str, version: &SemanticVersion) -> impl Iterator<Item = PackageSpecifier> + 'a {
		let key = match (self.name_ids.get(name), self.version_ids.get(version)) {
			(Some(&id), Some(&vid)) => Some((id, vid)),
			_ => None,
		};
		key.and_then(|key| self.dependencies.get(&key))
			.map(|edges| edges.as_slice())
			.unwrap_or(&[])
			.iter()
			.map(|&(name_id, specifier_id)| PackageSpecifier::new(
				self.name_lookup[name_id].clone(),
				self.specifier_lookup[specifier_id].clone(),
			))
	}

	/// A conservative feasibility pre-check: can choosing a version of `name` matching
	/// `version` still be reconciled with the tentative selection in `proposed` and the
	/// locked packages in `fixed`?
	///
	/// Only a specifier that pins one exact, loaded release can be disproved; open
	/// ranges and unknown packages optimistically pass. Each dependency edge of the
	/// pinned release is tested for mutual satisfiability against a same-named entry
	/// in `proposed` and, independently, in `fixed`; the check then recurses into the
	/// dependency itself. Locked-package constraints are not re-checked past the first
	/// hop. A release revisited through a dependency cycle is treated as satisfiable
	/// rather than recursed into again.
	pub fn could_satisfy(
		&self,
		name: &str,
		version: &VersionSpecifier,
		proposed: &[PackageSpecifier],
		fixed: &[PackageSpecifier],
	) -> bool {
		let mut visited = HashSet::new();
		self.could_satisfy_inner(name, version, proposed, fixed, &mut visited)
	}

	fn could_satisfy_inner(
		&self,
		name: &str,
		version: &VersionSpecifier,
		proposed: &[PackageSpecifier],
		fixed: &[PackageSpecifier],
		visited: &mut HashSet<(usize, usize)>,
	) -> bool {
		/* we can only check when the specifier pins an exact known release. if it is
		 * open or incomplete we just assume it 'could' satisfy the others. */
		let id = match self.name_ids.get(name) {
			Some(&id) => id,
			None => return true,
		};
		let exact = match version.try_as_exact_version() {
			Some(exact) => exact,
			None => return true,
		};
		let vid = match self.version_ids.get(&exact) {
			Some(&vid) => vid,
			None => return true,
		};
		if !visited.insert((id, vid)) {
			return true; /* cycle, optimistically break */
		}
		let deps = match self.dependencies.get(&(id, vid)) {
			Some(deps) => deps,
			None => return true, /* no dependencies, so yes */
		};

		for &(dep_name_id, dep_specifier_id) in deps {
			let dep_name = &self.name_lookup[dep_name_id];
			let dep_version = &self.specifier_lookup[dep_specifier_id];

			if let Some(other) = proposed.iter().find(|p| &p.name == dep_name) {
				if !dep_version.is_satisfied_by(&other.version) && !other.version.is_satisfied_by(dep_version) {
					return false;
				}
			}
			if let Some(locked) = fixed.iter().find(|p| &p.name == dep_name) {
				if !dep_version.is_satisfied_by(&locked.version) && !locked.version.is_satisfied_by(dep_version) {
					return false;
				}
			}

			/* locked constraints only apply to the first hop */
			if !self.could_satisfy_inner(dep_name, dep_version, proposed, &[], visited) {
				return false;
			}
		}
		true
	}

	/// Turns the whole graph back into package definitions.
	pub fn package_defs(&self) -> impl Iterator<Item = PackageDef> + '_ {
		self.versions.iter().flat_map(move |(&id, versions)| {
			versions.iter().map(move |&vid| {
				let dependencies = self.dependencies.get(&(id, vid))
					.map(|edges| edges.iter()
						.map(|&(name_id, specifier_id)| PackageDependency::new(
							self.name_lookup[name_id].clone(),
							self.specifier_lookup[specifier_id].clone(),
						))
						.collect())
					.unwrap_or_default();
				PackageDef {
					name: self.name_lookup[id].clone(),
					version: self.version_lookup[vid].clone(),
					dependencies,
				}
			})
		})
	}

	/// Absorbs another graph into this one.
	///
	/// Merging is always a replay of the other graph's contents through the normal
	/// loader, never a splice of internal tables.
	pub fn absorb(&mut self, other: &DependencyGraph) {
		self.load_from_package_defs(other.package_defs());
	}

	/// Writes the graph to a cache file.
	pub fn save_to_disk(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
		let data = bincode::serialize(self)?;
		std::fs::write(path, data)?;
		Ok(())
	}

	/// Reads a graph back from a cache file. The pre-release extender is not part of
	/// the cache and has to be installed again.
	pub fn load_from_disk(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
		let data = std::fs::read(path)?;
		Ok(bincode::deserialize(&data)?)
	}
}
