use pkgraph_core::DependencyGraph;
use pkgraph_core::package::*;
use pkgraph_test_utils::*;

fn v(s: &str) -> SemanticVersion { s.parse().unwrap() }

#[test]
fn loading_is_idempotent() {
	let mut graph = DependencyGraph::new();
	let def = package_def("Editor", "1.0.0", &[("Runtime", "^2.0.0")]);

	graph.load_from_package_defs([def.clone()]);
	let deps_first: Vec<_> = graph.get_dependencies("Editor", &v("1.0.0")).collect();

	let added = graph.load_from_package_defs([def]);
	assert_eq!(added, 0);
	assert_eq!(graph.count(), 1);
	let deps_second: Vec<_> = graph.get_dependencies("Editor", &v("1.0.0")).collect();
	assert_eq!(deps_first, deps_second);
}

#[test]
fn merge_of_disjoint_sets_is_their_union() {
	let set_a = [package_def("A1", "1.0.0", &[]), package_def("A2", "1.1.0", &[])];
	let set_b = [package_def("B1", "2.0.0", &[]), package_def("B2", "0.9.0", &[])];

	let mut forward = DependencyGraph::new();
	forward.load_from_package_defs(set_a.clone());
	forward.load_from_package_defs(set_b.clone());

	let mut backward = DependencyGraph::new();
	backward.load_from_package_defs(set_b.clone());
	backward.load_from_package_defs(set_a.clone());

	assert_eq!(forward.count(), 4);
	assert_eq!(backward.count(), 4);
	for def in set_a.iter().chain(set_b.iter()) {
		assert!(forward.has_package(&def.name, &def.version));
		assert!(backward.has_package(&def.name, &def.version));
	}
}

#[test]
fn json_load_skips_malformed_entries() {
	let mut graph = DependencyGraph::new();
	let added = graph.load_from_json(&sample_catalog_json());

	assert_eq!(added, SAMPLE_CATALOG_COUNT);
	assert!(graph.has_package("Editor", &v("2.0.0")));
	assert!(graph.has_package("Runtime", &v("2.1.0")));
	/* the entries with a malformed or missing version left no trace */
	assert_eq!(graph.count(), SAMPLE_CATALOG_COUNT);
	assert!(!graph.has_package("Broken", &v("0.0.0")));
}

#[test]
fn json_load_skips_already_loaded_releases() {
	let mut graph = sample_graph();
	let added = graph.load_from_json(&sample_catalog_json());
	assert_eq!(added, 0);
	assert_eq!(graph.count(), SAMPLE_CATALOG_COUNT);
}

#[test]
fn round_trip_through_package_defs() {
	let original = sample_graph();

	let mut rebuilt = DependencyGraph::new();
	rebuilt.absorb(&original);

	assert_eq!(rebuilt.count(), original.count());
	for def in original.package_defs() {
		assert!(rebuilt.has_package(&def.name, &def.version));
		let original_deps: Vec<_> = original.get_dependencies(&def.name, &def.version).collect();
		let rebuilt_deps: Vec<_> = rebuilt.get_dependencies(&def.name, &def.version).collect();
		assert_eq!(original_deps, rebuilt_deps);
	}
}

#[test]
fn dependency_absence_vs_emptiness() {
	let mut graph = DependencyGraph::new();
	graph.load_from_package_defs([package_def("Loner", "1.0.0", &[])]);

	assert_eq!(graph.get_dependencies("Loner", &v("1.0.0")).count(), 0);
	assert_eq!(graph.get_dependencies("NeverLoaded", &v("1.0.0")).count(), 0);
	assert!(graph.has_package("Loner", &v("1.0.0")));
	assert!(!graph.has_package("NeverLoaded", &v("1.0.0")));
}

#[test]
fn later_definition_supersedes_dependency_list() {
	let mut graph = DependencyGraph::new();
	graph.load_from_package_defs([package_def("Editor", "1.0.0", &[("Runtime", "^1.0.0")])]);
	graph.load_from_package_defs([package_def("Editor", "1.0.0", &[("Runtime", "^2.0.0"), ("Sdk", "any")])]);

	assert_eq!(graph.count(), 1);
	let deps: Vec<_> = graph.get_dependencies("Editor", &v("1.0.0")).collect();
	assert_eq!(deps.len(), 2);
	assert_eq!(deps[0], package_specifier("Runtime", "^2.0.0"));
	assert_eq!(deps[1], package_specifier("Sdk", "any"));
}

#[test]
fn graph_cache_round_trips() {
	let dir = temp_dir();
	let path = dir.path().join("catalog.bin");

	let original = sample_graph();
	original.save_to_disk(&path).unwrap();
	let restored = DependencyGraph::load_from_disk(&path).unwrap();

	assert_eq!(restored.count(), original.count());
	for def in original.package_defs() {
		assert!(restored.has_package(&def.name, &def.version));
	}
}
