//! User configuration: default repositories and the catalog cache location.

use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	repositories: Vec<String>,
	cache_dir: std::path::PathBuf,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			repositories: Vec::new(),
			cache_dir: {
				#[cfg(target_os = "windows")]
				let path = std::path::PathBuf::from(std::env::var("APPDATA").expect("APPDATA missing."));

				#[cfg(not(target_os = "windows"))]
				let path = if let Ok(e) = std::env::var("XDG_CACHE_HOME") {
					std::path::PathBuf::from(e)
				} else {
					std::path::PathBuf::from(std::env::var("HOME").expect("HOME environment variable not set.")).join(".cache")
				};

				path.join("pkgraph")
			},
		}
	}
}

impl Config {
	pub fn load_from_disk() -> crate::Result<Self> {
		let data = std::fs::read(Self::file_path())?;
		Ok(serde_json::from_slice(&data)?)
	}

	pub fn save_to_disk(&self) -> crate::Result<()> {
		let path = Self::file_path();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
		Ok(())
	}

	fn file_path() -> std::path::PathBuf {
		#[cfg(target_os = "windows")]
		let path = std::path::PathBuf::from(std::env::var("APPDATA").expect("APPDATA missing."));

		#[cfg(not(target_os = "windows"))]
		let path = if let Ok(e) = std::env::var("XDG_CONFIG_HOME") {
			std::path::PathBuf::from(e)
		} else {
			std::path::PathBuf::from(std::env::var("HOME").expect("HOME environment variable not set.")).join(".config")
		};

		path.join("pkgraph").join("config.json")
	}

	/// Repositories consulted when neither the image specification nor the command
	/// line names any.
	pub fn repositories(&self) -> &[String] {
		&self.repositories
	}

	pub fn set_repositories(&mut self, repositories: Vec<String>) {
		self.repositories = repositories;
	}

	pub fn add_repository(&mut self, repository: String) {
		self.repositories.push(repository);
	}

	pub fn cache_dir(&self) -> &std::path::Path {
		&self.cache_dir
	}

	/// Returns if the directory is valid or not.
	pub fn set_cache_dir(&mut self, cache_dir: std::path::PathBuf) -> bool {
		if cache_dir.is_dir() {
			self.cache_dir = cache_dir;
			true
		} else {
			false
		}
	}
}
