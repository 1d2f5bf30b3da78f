use serde::{Serialize, Deserialize};

use super::SemanticVersion;

/// How a [`VersionSpecifier`] matches versions against its stated fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchBehavior {
	/// Matches any version at all.
	AnyVersion,
	/// Matches exactly the stated version.
	Exact,
	/// Matches versions with the stated major that are at least the stated lower bound.
	Compatible,
}

/// A predicate over versions expressing a compatibility constraint.
///
/// Parsed forms:
/// - `any` (or an empty string): the [`VersionSpecifier::ANY`] sentinel.
/// - `1.2.3`: exactly that version.
/// - `^1.2.3`, `^1.2`, `1.2`, `1`: compatible, same major and at least the stated bound.
///
/// A pre-release tag narrows matching to that channel or newer; releases always
/// qualify. The special tag `any` accepts every pre-release channel, e.g. `^1.0.0-any`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionSpecifier {
	behavior: MatchBehavior,
	major: Option<u64>,
	minor: Option<u64>,
	patch: Option<u64>,
	prerelease: Option<String>,
	any_prerelease: bool,
}

impl VersionSpecifier {
	/// The specifier matching every version.
	pub const ANY: VersionSpecifier = VersionSpecifier {
		behavior: MatchBehavior::AnyVersion,
		major: None,
		minor: None,
		patch: None,
		prerelease: None,
		any_prerelease: false,
	};

	pub fn parse(spec: &str) -> crate::Result<Self> {
		let s = spec.trim();
		if s.is_empty() || s.eq_ignore_ascii_case("any") {
			return Ok(Self::ANY);
		}

		let (s, caret) = match s.strip_prefix('^') {
			Some(rest) => (rest, true),
			None => (s, false),
		};
		let (s, prerelease) = match s.split_once('-') {
			Some((rest, pre)) => (rest, Some(pre.to_string())),
			None => (s, None),
		};

		let any_prerelease = prerelease.as_deref() == Some("any");
		let prerelease = if any_prerelease { None } else { prerelease };
		if let Some(pre) = &prerelease {
			if pre.is_empty() || pre.split('.').any(|ident| ident.is_empty()) {
				return Err(crate::Error::Parse(format!("invalid pre-release tag in specifier: {}", spec)));
			}
		}

		let mut numbers = Vec::new();
		for field in s.split('.') {
			numbers.push(
				field.parse::<u64>()
					.map_err(|_| crate::Error::Parse(format!("invalid version specifier: {}", spec)))?
			);
		}
		if numbers.len() > 3 {
			return Err(crate::Error::Parse(format!("version specifier has too many fields: {}", spec)));
		}

		Ok(VersionSpecifier {
			/* a partial version can never pin one release, so it matches compatibly */
			behavior: if caret || numbers.len() < 3 { MatchBehavior::Compatible } else { MatchBehavior::Exact },
			major: numbers.first().copied(),
			minor: numbers.get(1).copied(),
			patch: numbers.get(2).copied(),
			prerelease,
			any_prerelease,
		})
	}

	/// A specifier matching exactly `version`.
	pub fn exact(version: &SemanticVersion) -> Self {
		VersionSpecifier {
			behavior: MatchBehavior::Exact,
			major: Some(version.major),
			minor: Some(version.minor),
			patch: Some(version.patch),
			prerelease: version.prerelease.clone(),
			any_prerelease: false,
		}
	}

	pub fn behavior(&self) -> MatchBehavior {
		self.behavior
	}

	pub fn is_any(&self) -> bool {
		self.behavior == MatchBehavior::AnyVersion
	}

	/// The requested pre-release channel, the first identifier of the tag.
	pub fn prerelease_channel(&self) -> Option<&str> {
		self.prerelease.as_deref().and_then(|p| p.split('.').next())
	}

	/// Whether this specifier accepts every pre-release channel.
	pub fn matches_any_prerelease(&self) -> bool {
		self.any_prerelease
	}

	/// The one version this specifier pins, when it pins one at all.
	///
	/// Open specifiers (`any`, caret and partial forms) return `None`.
	pub fn try_as_exact_version(&self) -> Option<SemanticVersion> {
		if self.behavior != MatchBehavior::Exact {
			return None;
		}
		match (self.major, self.minor, self.patch) {
			(Some(major), Some(minor), Some(patch)) => Some(SemanticVersion {
				major,
				minor,
				patch,
				prerelease: self.prerelease.clone(),
				build_metadata: None,
			}),
			_ => None,
		}
	}

	/// Whether the single `version` satisfies this specifier.
	pub fn is_compatible(&self, version: &SemanticVersion) -> bool {
		match self.behavior {
			MatchBehavior::AnyVersion => true,
			MatchBehavior::Exact => {
				self.major == Some(version.major) &&
				self.minor == Some(version.minor) &&
				self.patch == Some(version.patch) &&
				(self.any_prerelease || self.prerelease == version.prerelease)
			}
			MatchBehavior::Compatible => {
				if let Some(major) = self.major {
					if major != version.major {
						return false;
					}
				}
				self.allows_prerelease_of(version) && *version >= self.lower_bound()
			}
		}
	}

	/// Whether a version chosen to satisfy `other` can also satisfy this specifier.
	///
	/// This is the one-direction half of the mutual-satisfaction test used during
	/// resolution; a contradiction exists only when neither direction holds.
	pub fn is_satisfied_by(&self, other: &VersionSpecifier) -> bool {
		if self.behavior == MatchBehavior::AnyVersion {
			return true;
		}
		if let Some(version) = other.try_as_exact_version() {
			return self.is_compatible(&version);
		}
		if other.behavior == MatchBehavior::AnyVersion {
			return false;
		}
		/* both sides are open ranges, accept when they overlap on the same major */
		match (self.major, other.major) {
			(Some(lhs), Some(rhs)) => lhs == rhs,
			_ => true,
		}
	}

	fn allows_prerelease_of(&self, version: &SemanticVersion) -> bool {
		if self.any_prerelease {
			return true;
		}
		match (self.prerelease_channel(), version.prerelease_channel()) {
			/* releases always qualify */
			(_, None) => true,
			(None, Some(_)) => false,
			(Some(wanted), Some(channel)) => channel >= wanted,
		}
	}

	fn lower_bound(&self) -> SemanticVersion {
		SemanticVersion {
			major: self.major.unwrap_or(0),
			minor: self.minor.unwrap_or(0),
			patch: self.patch.unwrap_or(0),
			prerelease: self.prerelease.clone(),
			build_metadata: None,
		}
	}
}

impl std::str::FromStr for VersionSpecifier {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl std::fmt::Display for VersionSpecifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.behavior == MatchBehavior::AnyVersion {
			return write!(f, "any");
		}
		if self.behavior == MatchBehavior::Compatible {
			write!(f, "^")?;
		}
		let mut fields = Vec::new();
		if let Some(major) = self.major { fields.push(major.to_string()) }
		if let Some(minor) = self.minor { fields.push(minor.to_string()) }
		if let Some(patch) = self.patch { fields.push(patch.to_string()) }
		write!(f, "{}", fields.join("."))?;
		if self.any_prerelease {
			write!(f, "-any")?;
		} else if let Some(pre) = &self.prerelease {
			write!(f, "-{}", pre)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn v(s: &str) -> SemanticVersion { s.parse().unwrap() }
	fn spec(s: &str) -> VersionSpecifier { VersionSpecifier::parse(s).unwrap() }

	#[test] fn spec_any_matches_everything() { assert!(spec("any").is_compatible(&v("0.0.1-alpha"))) }
	#[test] fn spec_empty_string_is_any() { assert!(spec("").is_any()) }
	#[test] fn spec_exact_matches_itself() { assert!(spec("1.2.3").is_compatible(&v("1.2.3"))) }
	#[test] fn spec_exact_rejects_other_versions() { assert!(!spec("1.2.3").is_compatible(&v("1.2.4"))) }
	#[test] fn spec_exact_rejects_prerelease_of_itself() { assert!(!spec("1.2.3").is_compatible(&v("1.2.3-beta"))) }
	#[test] fn spec_exact_with_prerelease_matches() { assert!(spec("1.2.3-beta.1").is_compatible(&v("1.2.3-beta.1"))) }
	#[test] fn spec_caret_matches_same_major_above_bound() { assert!(spec("^1.2.0").is_compatible(&v("1.5.0"))) }
	#[test] fn spec_caret_rejects_below_bound() { assert!(!spec("^1.2.0").is_compatible(&v("1.1.9"))) }
	#[test] fn spec_caret_rejects_other_major() { assert!(!spec("^1.2.0").is_compatible(&v("2.0.0"))) }
	#[test] fn spec_partial_version_is_compatible_match() { assert!(spec("1.2").is_compatible(&v("1.4.0"))) }
	#[test] fn spec_release_range_rejects_prereleases() { assert!(!spec("^2.0.0").is_compatible(&v("2.1.0-beta.1"))) }
	#[test] fn spec_channel_matches_same_channel() { assert!(spec("^2.0.0-beta").is_compatible(&v("2.1.0-beta.1"))) }
	#[test] fn spec_channel_matches_newer_channel() { assert!(spec("^2.0.0-beta").is_compatible(&v("2.1.0-rc.1"))) }
	#[test] fn spec_channel_rejects_older_channel() { assert!(!spec("^2.0.0-beta").is_compatible(&v("2.1.0-alpha.1"))) }
	#[test] fn spec_channel_matches_releases() { assert!(spec("^2.0.0-beta").is_compatible(&v("2.1.0"))) }
	#[test] fn spec_any_prerelease_flag() { assert!(spec("^2.0.0-any").matches_any_prerelease()) }
	#[test] fn spec_any_prerelease_matches_all_channels() { assert!(spec("^2.0.0-any").is_compatible(&v("2.1.0-alpha.1"))) }
	#[test] fn spec_exact_pins_a_version() { assert_eq!(spec("1.2.3").try_as_exact_version(), Some(v("1.2.3"))) }
	#[test] fn spec_caret_pins_nothing() { assert_eq!(spec("^1.2.3").try_as_exact_version(), None) }
	#[test] fn spec_any_pins_nothing() { assert_eq!(VersionSpecifier::ANY.try_as_exact_version(), None) }
	#[test] fn spec_satisfied_by_overlapping_caret() { assert!(spec("^2.0.0").is_satisfied_by(&spec("^2.1.0"))) }
	#[test] fn spec_not_satisfied_by_other_major_caret() { assert!(!spec("^2.0.0").is_satisfied_by(&spec("^1.0.0"))) }
	#[test] fn spec_satisfied_by_exact_inside_range() { assert!(spec("^2.0.0").is_satisfied_by(&spec("2.4.0"))) }
	#[test] fn spec_not_satisfied_by_exact_outside_range() { assert!(!spec("^2.0.0").is_satisfied_by(&spec("1.4.0"))) }
	#[test] fn spec_any_satisfied_by_all() { assert!(VersionSpecifier::ANY.is_satisfied_by(&spec("^1.0.0"))) }
	#[test] fn spec_rejects_garbage() { assert!(VersionSpecifier::parse("one.two").is_err()) }
	#[test] fn spec_rejects_too_many_fields() { assert!(VersionSpecifier::parse("1.2.3.4").is_err()) }
	#[test] fn spec_display_round_trips() { assert_eq!(spec("^1.2.0-beta").to_string(), "^1.2.0-beta") }
	#[test] fn spec_exact_constructor_round_trips() { assert!(VersionSpecifier::exact(&v("1.2.3-rc.1")).is_compatible(&v("1.2.3-rc.1"))) }
}
