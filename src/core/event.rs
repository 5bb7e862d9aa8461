//! core::event
//!
//! Classification of the triggering repository event.
//!
//! # Overview
//!
//! The hosting platform hands us an event name plus a loosely-shaped JSON
//! payload whose fields depend on the event. [`RawEvent`] captures that
//! payload as-is; [`classify`] narrows it once into an [`Event`], a tagged
//! union carrying exactly the fields each variant needs.
//!
//! Events this tool has no business acting on classify to `None`:
//!
//! - pushes that neither created nor deleted a ref
//! - pushes to refs outside `refs/tags/` and `refs/heads/`
//! - release events for prereleases, or with an action other than
//!   `published`, `released` or `edited`
//! - any other event name
//!
//! # Example
//!
//! ```
//! use reftagger::core::event::{classify, Event, RawEvent};
//!
//! let payload = r#"{"ref": "refs/tags/v3.2.0", "created": true}"#;
//! let raw = RawEvent::from_payload(
//!     "push",
//!     payload,
//!     "abc123def4567890abc123def4567890abc12345",
//! ).unwrap();
//!
//! let event = classify(&raw).unwrap();
//! assert!(matches!(event, Event::TagPush(_)));
//! assert_eq!(event.candidate(), "v3.2.0");
//! ```

use serde::Deserialize;
use thiserror::Error;

use super::types::{Namespace, Oid, TypeError};

/// Errors from reading an event.
///
/// These are malformed inputs, not inapplicable events.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to parse event payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("invalid commit id: {0}")]
    InvalidCommit(#[from] TypeError),
}

/// The `release` object of a release event payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRelease {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
}

/// The subset of a webhook payload the classifier looks at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "ref")]
    pub ref_name: Option<String>,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub deleted: bool,
    /// Commit the ref pointed at before the push.
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub release: Option<RawRelease>,
}

/// An unclassified event: the platform's event name, its payload, and the
/// commit the run was triggered for.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub event_name: String,
    pub payload: EventPayload,
    pub commit: Oid,
    /// The payload's `before`, validated.
    pub before: Option<Oid>,
}

impl RawEvent {
    /// Build a raw event from its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `EventError` if the payload is not valid JSON, or if the commit
    /// id or a present `before` is not a valid object id.
    pub fn from_payload(
        event_name: impl Into<String>,
        payload_json: &str,
        commit: &str,
    ) -> Result<Self, EventError> {
        let payload: EventPayload = serde_json::from_str(payload_json)?;
        let before = payload.before.as_deref().map(Oid::new).transpose()?;
        Ok(Self {
            event_name: event_name.into(),
            payload,
            commit: Oid::new(commit)?,
            before,
        })
    }
}

/// A ref created by a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedRef {
    /// Short name with the namespace prefix stripped (`v3.2.0`).
    pub name: String,
    pub commit: Oid,
}

/// A ref removed by a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedRef {
    /// Short name with the namespace prefix stripped.
    pub name: String,
    /// The commit the ref pointed at before it was deleted.
    pub commit: Oid,
}

/// A published or edited release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag_name: String,
    pub commit: Oid,
}

/// A classified, applicable event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TagPush(PushedRef),
    BranchPush(PushedRef),
    TagDelete(DeletedRef),
    BranchDelete(DeletedRef),
    ReleasePublished(Release),
    ReleaseEdited(Release),
}

impl Event {
    /// The string the candidate version is parsed from.
    pub fn candidate(&self) -> &str {
        match self {
            Event::TagPush(r) | Event::BranchPush(r) => &r.name,
            Event::TagDelete(r) | Event::BranchDelete(r) => &r.name,
            Event::ReleasePublished(r) | Event::ReleaseEdited(r) => &r.tag_name,
        }
    }

    /// The commit associated with the event.
    ///
    /// For deletions this is the commit the removed ref used to point at.
    pub fn commit(&self) -> &Oid {
        match self {
            Event::TagPush(r) | Event::BranchPush(r) => &r.commit,
            Event::TagDelete(r) | Event::BranchDelete(r) => &r.commit,
            Event::ReleasePublished(r) | Event::ReleaseEdited(r) => &r.commit,
        }
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self, Event::TagDelete(_) | Event::BranchDelete(_))
    }

    /// The namespace a push or delete happened in; `None` for releases.
    pub fn namespace(&self) -> Option<Namespace> {
        match self {
            Event::TagPush(_) | Event::TagDelete(_) => Some(Namespace::Tags),
            Event::BranchPush(_) | Event::BranchDelete(_) => Some(Namespace::Heads),
            Event::ReleasePublished(_) | Event::ReleaseEdited(_) => None,
        }
    }

    /// Stable kebab-case name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TagPush(_) => "tag-push",
            Event::BranchPush(_) => "branch-push",
            Event::TagDelete(_) => "tag-delete",
            Event::BranchDelete(_) => "branch-delete",
            Event::ReleasePublished(_) => "release-published",
            Event::ReleaseEdited(_) => "release-edited",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.candidate())
    }
}

/// Narrow a raw event into an applicable [`Event`].
///
/// Returns `None` for events this tool should not act on.
pub fn classify(raw: &RawEvent) -> Option<Event> {
    match raw.event_name.as_str() {
        "push" => classify_push(raw),
        "release" => classify_release(raw),
        _ => None,
    }
}

fn classify_push(raw: &RawEvent) -> Option<Event> {
    let payload = &raw.payload;
    let full = payload.ref_name.as_deref()?;
    let (namespace, name) = Namespace::split_full(full)?;
    let name = name.to_string();

    if payload.created {
        let pushed = PushedRef {
            name,
            commit: raw.commit.clone(),
        };
        Some(match namespace {
            Namespace::Tags => Event::TagPush(pushed),
            Namespace::Heads => Event::BranchPush(pushed),
        })
    } else if payload.deleted {
        let commit = raw
            .before
            .clone()
            .filter(|oid| !oid.is_zero())
            .unwrap_or_else(|| raw.commit.clone());
        let deleted = DeletedRef { name, commit };
        Some(match namespace {
            Namespace::Tags => Event::TagDelete(deleted),
            Namespace::Heads => Event::BranchDelete(deleted),
        })
    } else {
        None
    }
}

fn classify_release(raw: &RawEvent) -> Option<Event> {
    let payload = &raw.payload;
    let release = payload.release.as_ref()?;
    if release.prerelease {
        return None;
    }
    // A missing tag is left for version parsing to reject.
    let tag_name = release.tag_name.clone().unwrap_or_default();
    let release_event = Release {
        tag_name,
        commit: raw.commit.clone(),
    };

    match payload.action.as_deref()? {
        "published" | "released" => Some(Event::ReleasePublished(release_event)),
        "edited" => Some(Event::ReleaseEdited(release_event)),
        _ => None,
    }
}
