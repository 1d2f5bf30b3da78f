use std::cell::RefCell;
use std::rc::Rc;

use pkgraph_core::DependencyGraph;
use pkgraph_core::package::*;
use pkgraph_test_utils::*;

#[test]
fn specifier_filtering_matches_expected_versions() {
	let mut graph = DependencyGraph::new();
	graph.load_from_package_defs([
		package_def("Editor", "1.0.0", &[]),
		package_def("Editor", "1.5.0", &[]),
		package_def("Editor", "2.0.0", &[]),
	]);

	let mut hits = graph.packages_satisfying(&package_specifier("Editor", "^1.0.0"));
	hits.sort();
	assert_eq!(hits, vec!["1.0.0".parse().unwrap(), "1.5.0".parse().unwrap()]);

	let hits = graph.packages_satisfying(&package_specifier("Editor", "any"));
	assert_eq!(hits.len(), 3);
}

#[test]
fn release_queries_never_trigger_the_extender() {
	let calls = Rc::new(RefCell::new(Vec::<(String, String)>::new()));
	let recorder = calls.clone();
	let mut graph = DependencyGraph::with_prerelease_extender(Box::new(
		move |_graph: &mut DependencyGraph, name: &str, channel: &str| {
			recorder.borrow_mut().push((name.to_string(), channel.to_string()));
		},
	));
	graph.load_from_package_defs([package_def("Editor", "1.0.0", &[])]);

	graph.packages_satisfying(&package_specifier("Editor", "^1.0.0"));
	graph.packages_satisfying(&package_specifier("Editor", "any"));
	assert!(calls.borrow().is_empty());
}

#[test]
fn channel_requests_only_advance() {
	let calls = Rc::new(RefCell::new(Vec::<(String, String)>::new()));
	let recorder = calls.clone();
	let mut graph = DependencyGraph::with_prerelease_extender(Box::new(
		move |_graph: &mut DependencyGraph, name: &str, channel: &str| {
			recorder.borrow_mut().push((name.to_string(), channel.to_string()));
		},
	));
	graph.load_from_package_defs([package_def("Editor", "1.0.0", &[])]);

	graph.packages_satisfying(&package_specifier("Editor", "^1.0.0-beta"));
	graph.packages_satisfying(&package_specifier("Editor", "^1.0.0-beta"));
	graph.packages_satisfying(&package_specifier("Editor", "^1.0.0-alpha"));
	graph.packages_satisfying(&package_specifier("Editor", "^1.0.0-rc"));
	/* beta triggered, the repeat and the older alpha did not, rc advanced */
	assert_eq!(
		*calls.borrow(),
		vec![
			("Editor".to_string(), "beta".to_string()),
			("Editor".to_string(), "rc".to_string()),
		]
	);
}

#[test]
fn channels_are_tracked_per_name() {
	let calls = Rc::new(RefCell::new(Vec::<(String, String)>::new()));
	let recorder = calls.clone();
	let mut graph = DependencyGraph::with_prerelease_extender(Box::new(
		move |_graph: &mut DependencyGraph, name: &str, channel: &str| {
			recorder.borrow_mut().push((name.to_string(), channel.to_string()));
		},
	));

	graph.packages_satisfying(&package_specifier("Editor", "^1.0.0-beta"));
	graph.packages_satisfying(&package_specifier("Runtime", "^2.0.0-beta"));
	assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn wildcard_maps_to_the_lowest_channel() {
	let calls = Rc::new(RefCell::new(Vec::<(String, String)>::new()));
	let recorder = calls.clone();
	let mut graph = DependencyGraph::with_prerelease_extender(Box::new(
		move |_graph: &mut DependencyGraph, name: &str, channel: &str| {
			recorder.borrow_mut().push((name.to_string(), channel.to_string()));
		},
	));

	graph.packages_satisfying(&package_specifier("Editor", "^1.0.0-any"));
	assert_eq!(*calls.borrow(), vec![("Editor".to_string(), "alpha".to_string())]);
}

#[test]
fn extender_loads_are_visible_to_the_triggering_query() {
	let mut graph = DependencyGraph::with_prerelease_extender(Box::new(
		|graph: &mut DependencyGraph, name: &str, _channel: &str| {
			if name == "Editor" {
				graph.load_from_package_defs([package_def("Editor", "1.2.0-beta.1", &[])]);
			}
		},
	));
	graph.load_from_package_defs([package_def("Editor", "1.0.0", &[])]);

	let hits = graph.packages_satisfying(&package_specifier("Editor", "^1.0.0-beta"));
	assert!(hits.contains(&"1.2.0-beta.1".parse().unwrap()));
	assert!(graph.has_package("Editor", &"1.2.0-beta.1".parse().unwrap()));
}
