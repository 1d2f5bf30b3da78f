use serde::{Serialize, Deserialize};

/// A `major.minor.patch` version with optional pre-release and build metadata tags.
///
/// Ordering follows semantic versioning precedence: a pre-release sorts below its
/// release, dotted pre-release identifiers compare numerically when both are numbers
/// and lexically otherwise. Build metadata never affects ordering or equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticVersion {
	pub major: u64,
	pub minor: u64,
	pub patch: u64,
	pub prerelease: Option<String>,
	pub build_metadata: Option<String>,
}

impl SemanticVersion {
	pub fn new(major: u64, minor: u64, patch: u64) -> Self {
		Self { major, minor, patch, prerelease: None, build_metadata: None }
	}

	/// The pre-release channel, the first identifier of the pre-release tag.
	///
	/// `1.0.0-beta.3` is on channel `beta`.
	pub fn prerelease_channel(&self) -> Option<&str> {
		self.prerelease.as_deref().and_then(|p| p.split('.').next())
	}
}

impl std::str::FromStr for SemanticVersion {
	type Err = crate::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let input = s.trim();

		let (rest, build_metadata) = match input.split_once('+') {
			Some((rest, build)) => (rest, Some(build.to_string())),
			None => (input, None),
		};
		let (rest, prerelease) = match rest.split_once('-') {
			Some((rest, pre)) => (rest, Some(pre.to_string())),
			None => (rest, None),
		};

		if let Some(pre) = &prerelease {
			if pre.is_empty() || pre.split('.').any(|ident| ident.is_empty()) {
				return Err(crate::Error::Parse(format!("invalid pre-release tag in version: {}", s)));
			}
		}

		let mut fields = rest.split('.');
		let mut number = |field: &str| -> crate::Result<u64> {
			fields.next()
				.ok_or_else(|| crate::Error::Parse(format!("version missing {} field: {}", field, s)))?
				.parse()
				.map_err(|_| crate::Error::Parse(format!("version {} field is not a number: {}", field, s)))
		};

		let major = number("major")?;
		let minor = number("minor")?;
		let patch = number("patch")?;
		if fields.next().is_some() {
			return Err(crate::Error::Parse(format!("version has too many fields: {}", s)));
		}

		Ok(SemanticVersion { major, minor, patch, prerelease, build_metadata })
	}
}

impl std::fmt::Display for SemanticVersion {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
		if let Some(pre) = &self.prerelease {
			write!(f, "-{}", pre)?;
		}
		if let Some(build) = &self.build_metadata {
			write!(f, "+{}", build)?;
		}
		Ok(())
	}
}

impl PartialEq for SemanticVersion {
	fn eq(&self, other: &Self) -> bool {
		self.major == other.major &&
		self.minor == other.minor &&
		self.patch == other.patch &&
		self.prerelease == other.prerelease
	}
}

impl Eq for SemanticVersion {}

impl std::hash::Hash for SemanticVersion {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.major.hash(state);
		self.minor.hash(state);
		self.patch.hash(state);
		self.prerelease.hash(state);
	}
}

impl Ord for SemanticVersion {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.major.cmp(&other.major)
			.then_with(|| self.minor.cmp(&other.minor))
			.then_with(|| self.patch.cmp(&other.patch))
			.then_with(|| match (&self.prerelease, &other.prerelease) {
				(None, None) => std::cmp::Ordering::Equal,
				(None, Some(_)) => std::cmp::Ordering::Greater,
				(Some(_), None) => std::cmp::Ordering::Less,
				(Some(lhs), Some(rhs)) => compare_prerelease(lhs, rhs),
			})
	}
}

impl PartialOrd for SemanticVersion {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

fn compare_prerelease(lhs: &str, rhs: &str) -> std::cmp::Ordering {
	use std::cmp::Ordering;

	let mut lhs = lhs.split('.');
	let mut rhs = rhs.split('.');
	loop {
		match (lhs.next(), rhs.next()) {
			(None, None) => return Ordering::Equal,
			(None, Some(_)) => return Ordering::Less,
			(Some(_), None) => return Ordering::Greater,
			(Some(l), Some(r)) => {
				/* numeric identifiers compare as numbers and rank below alphanumeric ones */
				let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
					(Ok(ln), Ok(rn)) => ln.cmp(&rn),
					(Ok(_), Err(_)) => Ordering::Less,
					(Err(_), Ok(_)) => Ordering::Greater,
					(Err(_), Err(_)) => l.cmp(r),
				};
				match ord {
					Ordering::Equal => continue,
					_ => return ord,
				}
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn v(s: &str) -> SemanticVersion { s.parse().unwrap() }

	#[test] fn version_fields_are_not_compared_lexically() { assert!(v("1.2.4") < v("1.2.10")) }
	#[test] fn version_identical_are_eq() { assert!(v("1.2.3") == v("1.2.3")) }
	#[test] fn version_higher_patch_is_gt() { assert!(v("1.2.3") < v("1.2.4")) }
	#[test] fn version_prerelease_sorts_below_release() { assert!(v("2.0.0-beta.1") < v("2.0.0")) }
	#[test] fn version_prerelease_identifiers_compare_numerically() { assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11")) }
	#[test] fn version_prerelease_channels_compare_lexically() { assert!(v("1.0.0-alpha") < v("1.0.0-beta")) }
	#[test] fn version_numeric_identifier_below_alphanumeric() { assert!(v("1.0.0-1") < v("1.0.0-rc")) }
	#[test] fn version_build_metadata_ignored_for_equality() { assert!(v("1.0.0+linux") == v("1.0.0+windows")) }
	#[test] fn version_channel_accessor() { assert_eq!(v("1.0.0-beta.3").prerelease_channel(), Some("beta")) }
	#[test] fn version_display_round_trips() { assert_eq!(v("1.2.3-rc.1+build.5").to_string(), "1.2.3-rc.1+build.5") }
	#[test] fn version_rejects_missing_fields() { assert!("1.2".parse::<SemanticVersion>().is_err()) }
	#[test] fn version_rejects_garbage() { assert!("not-a-version".parse::<SemanticVersion>().is_err()) }
	#[test] fn version_rejects_empty_prerelease() { assert!("1.2.3-".parse::<SemanticVersion>().is_err()) }
}
