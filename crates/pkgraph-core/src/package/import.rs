//! Reading package catalog documents.

use serde::Deserialize;

/// One entry of a catalog document's `packages` array.
///
/// Version fields stay strings at this boundary; the dependency graph parses them
/// through its string caches and drops the whole entry when one fails to parse.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogEntry {
	pub name: String,
	pub version: String,
	#[serde(default)]
	pub dependencies: Vec<CatalogDependency>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogDependency {
	pub name: String,
	pub version: String,
}

impl CatalogEntry {
	pub(crate) fn read_from_json(v: &serde_json::Value) -> crate::Result<Self> {
		serde_json::from_value(v.clone())
			.map_err(|e| crate::Error::Parse(format!("catalog entry does not match schema: {}", e)))
	}
}
