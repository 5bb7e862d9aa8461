//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`Namespace`] - The ref namespace pointers live in (tags or branches)
//! - [`RefName`] - Validated ref name relative to `refs/` (e.g. `tags/v3`)
//! - [`RefRecord`] - A ref together with its target commit and version
//! - [`LatestState`] - Resolved repository-wide and major-line latest refs
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use reftagger::core::types::{Namespace, Oid, RefName};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let major = RefName::major(Namespace::Tags, 3);
//! assert_eq!(major.as_str(), "tags/v3");
//! assert_eq!(major.full(), "refs/tags/v3");
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! assert!(RefName::new("tags/bad..name").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::version::Version;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use reftagger::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Check if this is the zero/null OID.
    ///
    /// Push payloads use it as the `after` value of a deleted ref.
    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| c == '0')
    }

    /// Get an abbreviated form of the OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ref namespace that version refs and pointers live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    /// `refs/tags/`
    #[default]
    Tags,
    /// `refs/heads/`
    Heads,
}

impl Namespace {
    /// Select the namespace from the branch-release preference.
    pub fn preferred(prefer_branch_release: bool) -> Self {
        if prefer_branch_release {
            Namespace::Heads
        } else {
            Namespace::Tags
        }
    }

    /// Short prefix as used by the REST refs API (`tags` / `heads`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Tags => "tags",
            Namespace::Heads => "heads",
        }
    }

    /// Fully-qualified prefix including the trailing slash.
    pub fn full_prefix(&self) -> &'static str {
        match self {
            Namespace::Tags => "refs/tags/",
            Namespace::Heads => "refs/heads/",
        }
    }

    /// Split a fully-qualified ref into its namespace and short name.
    ///
    /// ```
    /// use reftagger::core::types::Namespace;
    ///
    /// assert_eq!(
    ///     Namespace::split_full("refs/tags/v1.2.3"),
    ///     Some((Namespace::Tags, "v1.2.3"))
    /// );
    /// assert_eq!(Namespace::split_full("refs/pull/1/head"), None);
    /// ```
    pub fn split_full(full: &str) -> Option<(Namespace, &str)> {
        [Namespace::Tags, Namespace::Heads]
            .into_iter()
            .find_map(|ns| full.strip_prefix(ns.full_prefix()).map(|rest| (ns, rest)))
            .filter(|(_, rest)| !rest.is_empty())
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated ref name relative to `refs/`, such as `tags/v3`.
///
/// This is the form GitHub's REST refs endpoints take in their URL path.
/// Use [`RefName::full`] for the fully-qualified `refs/...` spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Name of the floating pointer to the newest release.
    pub const LATEST: &'static str = "latest";

    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// The major-line pointer for `major` (`<ns>/v<major>`).
    ///
    /// A pure function of namespace and major number; minor and patch never
    /// influence the name.
    pub fn major(namespace: Namespace, major: u64) -> Self {
        Self(format!("{}/v{}", namespace.as_str(), major))
    }

    /// The floating latest pointer (`<ns>/latest`).
    pub fn latest(namespace: Namespace) -> Self {
        Self(format!("{}/{}", namespace.as_str(), Self::LATEST))
    }

    /// The fully-qualified name (`refs/<name>`).
    pub fn full(&self) -> String {
        format!("refs/{}", self.0)
    }

    /// Whether a fully-qualified ref returned by the API is exactly this ref.
    ///
    /// Prefix listings return `tags/v1` alongside `tags/v10`, so only exact
    /// equality counts as a match.
    pub fn matches_full(&self, full: &str) -> bool {
        full.strip_prefix("refs/") == Some(self.0.as_str())
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }
        if name.starts_with("refs/") {
            return Err(TypeError::InvalidRefName(
                "ref name must be relative to 'refs/'".into(),
            ));
        }
        if name.starts_with('/') || name.ends_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot start or end with '/'".into(),
            ));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }
        for bad in ["..", "@{", "//"] {
            if name.contains(bad) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{bad}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{c}'"
                )));
            }
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }
        if name.split('/').any(|c| c.starts_with('.')) {
            return Err(TypeError::InvalidRefName(
                "path component cannot start with '.'".into(),
            ));
        }

        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One versioned ref: its short name, target commit and parsed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRecord {
    pub name: String,
    pub commit: Oid,
    pub version: Version,
}

impl RefRecord {
    pub fn new(name: impl Into<String>, commit: Oid, version: Version) -> Self {
        Self {
            name: name.into(),
            commit,
            version,
        }
    }
}

/// Result of latest resolution.
///
/// `major_latest`, when present, always shares the event's major number, and
/// `repo_latest` is never below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestState {
    pub repo_latest: Option<RefRecord>,
    pub major_latest: Option<RefRecord>,
}

impl LatestState {
    /// Whether the major-line latest is also the repository-wide latest.
    ///
    /// Compared by version precedence; false when either side is missing.
    pub fn major_is_repo_latest(&self) -> bool {
        match (&self.repo_latest, &self.major_latest) {
            (Some(repo), Some(major)) => repo.version == major.version,
            _ => false,
        }
    }
}
