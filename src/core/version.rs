//! core::version
//!
//! Semantic version parsing and precedence.
//!
//! # Grammar
//!
//! Versions follow semver 2.0.0 with an optional leading `v`:
//!
//! ```text
//! v?MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]
//! ```
//!
//! The grammar itself is delegated to the `semver` crate; this module adds
//! the `v` prefix, a length bound, and keeps the spelling the version was
//! parsed from.
//!
//! Anything else is not a version. Parsing returns `None` rather than an
//! error because "not a version" is an expected outcome when walking a ref
//! namespace that also holds `latest`, `v3`, or arbitrary branch names.
//!
//! # Precedence
//!
//! `Ord` is semver precedence as computed by
//! [`semver::Version::cmp_precedence`]: build metadata never participates, so
//! `1.0.0+a == 1.0.0+b`. (`semver::Version`'s own `Ord` breaks such ties on
//! the build string, which would make two spellings of one release differ.)
//!
//! # Example
//!
//! ```
//! use reftagger::core::version::Version;
//!
//! let a = Version::parse("v1.0.0-alpha").unwrap();
//! let b = Version::parse("1.0.0").unwrap();
//! assert!(a < b);
//! assert_eq!(b.major(), 1);
//! assert!(Version::parse("v1.0.0.alpha").is_none());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use semver::{BuildMetadata, Prerelease};

/// Longest input accepted, matching common semver tooling.
pub const MAX_LENGTH: usize = 256;

/// A parsed semantic version.
///
/// Equality and hashing follow precedence, so build metadata and the raw
/// spelling (`v1.2.3` vs `1.2.3`) are ignored.
#[derive(Debug, Clone)]
pub struct Version {
    inner: semver::Version,
    raw: String,
}

impl Version {
    /// Parse a raw tag or ref name into a version.
    ///
    /// Surrounding whitespace is ignored. Returns `None` when the input is
    /// not a semantic version.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() > MAX_LENGTH {
            return None;
        }

        let trimmed = raw.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let inner = semver::Version::parse(body).ok()?;

        Some(Self {
            inner,
            raw: raw.to_string(),
        })
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    pub fn pre(&self) -> &Prerelease {
        &self.inner.pre
    }

    pub fn build(&self) -> &BuildMetadata {
        &self.inner.build
    }

    /// The underlying `semver` value.
    pub fn as_semver(&self) -> &semver::Version {
        &self.inner
    }

    /// The string this version was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether this version carries prerelease identifiers.
    pub fn is_prerelease(&self) -> bool {
        !self.inner.pre.is_empty()
    }

    /// A plain release: no prerelease and no build metadata.
    ///
    /// Only stable versions take part in latest computations.
    pub fn is_stable(&self) -> bool {
        self.inner.pre.is_empty() && self.inner.build.is_empty()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp_precedence(&other.inner)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.major.hash(state);
        self.inner.minor.hash(state);
        self.inner.patch.hash(state);
        self.inner.pre.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// Capability for turning raw ref names into versions.
///
/// The engine takes this as a dependency so tests can substitute a parser
/// without touching global state.
pub trait VersionParser: Send + Sync {
    fn parse(&self, raw: &str) -> Option<Version>;
}

/// The standard semver 2.0.0 parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverParser;

impl VersionParser for SemverParser {
    fn parse(&self, raw: &str) -> Option<Version> {
        Version::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    mod parse {
        use super::*;

        #[test]
        fn plain_and_prefixed() {
            let plain = v("3.2.1");
            assert_eq!((plain.major(), plain.minor(), plain.patch()), (3, 2, 1));
            assert_eq!(v("v3.2.1"), plain);
            assert_eq!(v("v3.2.1").raw(), "v3.2.1");
        }

        #[test]
        fn prerelease_and_build() {
            let ver = v("1.0.0-alpha.1+build.5");
            assert_eq!(ver.pre().as_str(), "alpha.1");
            assert_eq!(ver.build().as_str(), "build.5");
            assert!(ver.is_prerelease());
            assert!(!ver.is_stable());
        }

        #[test]
        fn hyphens_inside_prerelease() {
            let ver = v("1.0.0-x-y-z.--");
            assert_eq!(ver.pre().as_str().split('.').count(), 2);
        }

        #[test]
        fn build_only_is_not_stable() {
            let ver = v("1.0.0+20130313144700");
            assert!(!ver.is_prerelease());
            assert!(!ver.is_stable());
        }

        #[test]
        fn surrounding_whitespace_is_ignored() {
            assert_eq!(v("  v1.2.3 "), v("1.2.3"));
        }

        #[test]
        fn rejects_malformed() {
            for raw in [
                "",
                "v",
                "1",
                "1.2",
                "1.2.3.4",
                "v1.0.0.alpha",
                "01.2.3",
                "1.02.3",
                "1.2.03",
                "1.2.3-",
                "1.2.3-01",
                "1.2.3-alpha..1",
                "1.2.3+",
                "1.2.3+build+again",
                "1.2.3-al_pha",
                "latest",
                "v3",
                "V1.2.3",
                "vv1.2.3",
                "a.b.c",
                "-1.2.3",
                "1.2.3 4",
            ] {
                assert!(Version::parse(raw).is_none(), "{raw:?} should be invalid");
            }
        }

        #[test]
        fn rejects_overflow_and_oversize() {
            assert!(Version::parse("99999999999999999999.0.0").is_none());
            let long = format!("1.0.0-{}", "a".repeat(MAX_LENGTH));
            assert!(Version::parse(&long).is_none());
        }

        #[test]
        fn leading_zero_allowed_in_build() {
            assert!(Version::parse("1.0.0+001").is_some());
        }
    }

    mod precedence {
        use super::*;

        #[test]
        fn semver_spec_chain() {
            let chain = [
                "1.0.0-alpha",
                "1.0.0-alpha.1",
                "1.0.0-alpha.beta",
                "1.0.0-beta",
                "1.0.0-beta.2",
                "1.0.0-beta.11",
                "1.0.0-rc.1",
                "1.0.0",
                "1.0.1",
                "1.1.0",
                "2.0.0",
            ];
            for pair in chain.windows(2) {
                assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
            }
        }

        #[test]
        fn numeric_components_compare_numerically() {
            assert!(v("1.10.0") > v("1.9.0"));
            assert!(v("10.0.0") > v("9.99.99"));
        }

        #[test]
        fn build_metadata_is_ignored() {
            assert_eq!(v("1.0.0+a"), v("1.0.0+b"));
            assert_eq!(v("1.0.0+a").cmp(&v("1.0.0")), Ordering::Equal);
            assert_ne!(v("1.0.0+a").as_semver(), v("1.0.0+b").as_semver());
        }

        #[test]
        fn prefix_does_not_matter() {
            assert_eq!(v("v2.3.0").cmp(&v("2.3.0")), Ordering::Equal);
        }

        #[test]
        fn hash_agrees_with_equality() {
            let set: HashSet<Version> = ["v1.0.0", "1.0.0", "1.0.0+ci.7"]
                .into_iter()
                .map(v)
                .collect();
            assert_eq!(set.len(), 1);
        }
    }

    #[test]
    fn display_normalizes() {
        assert_eq!(v("v1.2.3").to_string(), "1.2.3");
        assert_eq!(v("1.2.3-rc.1+sha.abc").to_string(), "1.2.3-rc.1+sha.abc");
    }

    #[test]
    fn semver_parser_delegates() {
        let parser = SemverParser;
        assert_eq!(parser.parse("v4.0.0"), Some(v("4.0.0")));
        assert!(parser.parse("nope").is_none());
    }
}
