//! Loading package catalogs from repositories.
//!
//! A repository is anything that can produce a JSON package index: an http(s) url or
//! a file on disk. Every index funnels through [`DependencyGraph::load_from_json`],
//! so loading several repositories into one graph is also how they are merged.

use crate::dependency_graph::DependencyGraph;

/// Fetches a package index from a remote repository.
pub async fn fetch_index(url: &str) -> crate::Result<serde_json::Value> {
	Ok(reqwest::get(url).await?.json::<serde_json::Value>().await?)
}

/// Reads a package index from a local catalog file.
pub fn read_index_file(path: impl AsRef<std::path::Path>) -> crate::Result<serde_json::Value> {
	let data = std::fs::read(path)?;
	Ok(serde_json::from_slice(&data)?)
}

/// Appends index query parameters, e.g. os/architecture/pre-release filters, to a
/// repository url. Local file sources are returned unchanged.
pub fn index_url_with_filters(source: &str, filters: &[(&str, &str)]) -> String {
	if !is_remote(source) || filters.is_empty() {
		return source.to_string();
	}
	let mut url = source.to_string();
	for (i, (key, value)) in filters.iter().enumerate() {
		url.push(if i == 0 && !source.contains('?') { '?' } else { '&' });
		url.push_str(key);
		url.push('=');
		url.push_str(value);
	}
	url
}

fn is_remote(source: &str) -> bool {
	source.starts_with("http://") || source.starts_with("https://")
}

/// Loads every listed source into `graph`. Returns how many releases were new.
///
/// A source that cannot be fetched or read at all is an error; data problems inside a
/// source remain tolerated by the loader, which skips the offending entries.
pub async fn load_sources(graph: &mut DependencyGraph, sources: &[String]) -> crate::Result<usize> {
	let mut added = 0;
	for source in sources {
		let index = if is_remote(source) {
			fetch_index(source).await?
		} else {
			read_index_file(source)?
		};
		let new = graph.load_from_json(&index);
		log::info!("loaded {} releases from {}", new, source);
		added += new;
	}
	Ok(added)
}

/// Builds a fresh graph from every listed source.
pub async fn build_graph(sources: &[String]) -> crate::Result<DependencyGraph> {
	let mut graph = DependencyGraph::new();
	load_sources(&mut graph, sources).await?;
	Ok(graph)
}
