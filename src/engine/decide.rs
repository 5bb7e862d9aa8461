//! engine::decide
//!
//! The decision state machine and the [`Tagger`] that drives a run.
//!
//! # Decision Table
//!
//! After resolution, with `major` the resolved latest of the event's major
//! line:
//!
//! | situation                         | outcome                                     |
//! |-----------------------------------|---------------------------------------------|
//! | deletion, `major` empty           | unlink `latest` if it holds the removed commit |
//! | event > `major` (deletion)        | roll the major ref back to `major`          |
//! | event == `major`                  | point the major ref at `major`              |
//! | event < `major`                   | stale, no mutation                          |
//!
//! `latest` is published alongside the major ref when `major` is also the
//! repository-wide latest and the preference allows it. After a deletion
//! that did not republish `latest`, any `latest` still holding the removed
//! commit is unlinked.

use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

use super::mutate::{RefMutator, StoreMutator};
use super::resolve::{LatestResolver, SinglePassResolver};
use super::scan::{RefScanner, StoreScanner};
use super::TaggerError;
use crate::core::config::Preferences;
use crate::core::event::{classify, Event, RawEvent};
use crate::core::types::{LatestState, Namespace, Oid, RefName, RefRecord};
use crate::core::version::{SemverParser, Version, VersionParser};
use crate::forge::RefStore;

/// What a run should do, given the resolved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The deletion emptied its major line.
    UnlinkOnly { deleted_commit: Oid },

    /// Point the major ref at `target`.
    Point {
        major_ref: RefName,
        target: RefRecord,
        publish_latest: bool,
        /// Commit whose `latest` pointer should be unlinked afterwards.
        unlink_stale: Option<Oid>,
    },

    /// The event trails its major line.
    Stale {
        version: Version,
        major_latest: Version,
    },
}

/// Externally visible outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    /// The major-line ref that was created or moved.
    ///
    /// `None` when a deletion left the major line empty.
    pub major_ref: Option<RefName>,
    /// The ref the major pointer now follows.
    pub target: Option<RefRecord>,
    /// Whether `latest` was created or moved.
    pub published_latest: bool,
    /// Whether a stale `latest` was removed.
    pub unlinked_latest: bool,
}

/// Pick the mutations for `event` at `version`.
///
/// Pure; all I/O happens before and after.
pub fn decide(
    event: &Event,
    version: &Version,
    state: &LatestState,
    namespace: Namespace,
    preferences: Preferences,
) -> Decision {
    let Some(major_latest) = &state.major_latest else {
        return Decision::UnlinkOnly {
            deleted_commit: event.commit().clone(),
        };
    };

    if version.cmp(&major_latest.version) == Ordering::Less {
        return Decision::Stale {
            version: version.clone(),
            major_latest: major_latest.version.clone(),
        };
    }

    let publish_latest = preferences.publish_latest && state.major_is_repo_latest();
    let unlink_stale = (event.is_deletion()
        && !publish_latest
        && event.commit() != &major_latest.commit)
        .then(|| event.commit().clone());

    Decision::Point {
        major_ref: RefName::major(namespace, major_latest.version.major()),
        target: major_latest.clone(),
        publish_latest,
        unlink_stale,
    }
}

/// Drives one run against injected components.
pub struct Tagger {
    parser: Arc<dyn VersionParser>,
    scanner: Box<dyn RefScanner>,
    resolver: Box<dyn LatestResolver>,
    mutator: Box<dyn RefMutator>,
    preferences: Preferences,
}

impl Tagger {
    /// Build a tagger with the standard components over `store`.
    pub fn new(store: Arc<dyn RefStore>, preferences: Preferences) -> Self {
        let parser: Arc<dyn VersionParser> = Arc::new(SemverParser);
        Self {
            scanner: Box::new(StoreScanner::new(Arc::clone(&store), Arc::clone(&parser))),
            resolver: Box::new(SinglePassResolver),
            mutator: Box::new(StoreMutator::new(store)),
            parser,
            preferences,
        }
    }

    /// Build a tagger from explicit components.
    pub fn from_parts(
        parser: Arc<dyn VersionParser>,
        scanner: Box<dyn RefScanner>,
        resolver: Box<dyn LatestResolver>,
        mutator: Box<dyn RefMutator>,
        preferences: Preferences,
    ) -> Self {
        Self {
            parser,
            scanner,
            resolver,
            mutator,
            preferences,
        }
    }

    /// The namespace pointer refs live in for this run.
    pub fn namespace(&self) -> Namespace {
        Namespace::preferred(self.preferences.prefer_branch_release)
    }

    /// Classify the event and check it belongs to the active namespace.
    ///
    /// # Errors
    ///
    /// `TaggerError::Context` if the event is not one to act on.
    pub fn check_context(&self, raw: &RawEvent) -> Result<Event, TaggerError> {
        let event = classify(raw).ok_or(TaggerError::Context)?;
        match event.namespace() {
            Some(ns) if ns != self.namespace() => {
                debug!(event = %event, active = %self.namespace(), "ref outside active namespace");
                Err(TaggerError::Context)
            }
            _ => Ok(event),
        }
    }

    /// Parse the event's candidate version.
    ///
    /// Prerelease and build-tagged candidates never move pointers, so they
    /// are treated like any other inapplicable event.
    ///
    /// # Errors
    ///
    /// `TaggerError::Semver` if the candidate is not a version,
    /// `TaggerError::Context` if it is not a stable one.
    pub fn check_semver(&self, event: &Event) -> Result<Version, TaggerError> {
        let version = self
            .parser
            .parse(event.candidate())
            .ok_or_else(|| TaggerError::Semver {
                raw: event.candidate().to_string(),
            })?;
        if !version.is_stable() {
            debug!(version = %version, "unstable version");
            return Err(TaggerError::Context);
        }
        Ok(version)
    }

    /// Execute the full run for `raw`.
    ///
    /// # Errors
    ///
    /// Validation conditions return before any ref store call. Ref store
    /// failures propagate as `TaggerError::Forge`; mutations already applied
    /// stay in place.
    pub async fn run(&self, raw: &RawEvent) -> Result<MutationResult, TaggerError> {
        let event = self.check_context(raw)?;
        let version = self.check_semver(&event)?;
        let namespace = self.namespace();
        info!(event = %event, version = %version, namespace = %namespace, "processing event");

        let record = RefRecord::new(event.candidate(), event.commit().clone(), version.clone());
        let state = {
            let mut refs = self.scanner.scan(namespace);
            self.resolver
                .resolve(&record, !event.is_deletion(), refs.as_mut())
                .await?
        };
        debug!(
            repo_latest = ?state.repo_latest.as_ref().map(|r| r.version.to_string()),
            major_latest = ?state.major_latest.as_ref().map(|r| r.version.to_string()),
            "resolved latest refs"
        );

        match decide(&event, &version, &state, namespace, self.preferences) {
            Decision::Stale {
                version,
                major_latest,
            } => Err(TaggerError::StaleRef {
                version,
                major_latest,
            }),
            Decision::UnlinkOnly { deleted_commit } => {
                info!(major = version.major(), "major line is now empty");
                let unlinked = self
                    .mutator
                    .unlink_latest_if_matching(namespace, &deleted_commit)
                    .await?;
                Ok(MutationResult {
                    major_ref: None,
                    target: None,
                    published_latest: false,
                    unlinked_latest: unlinked,
                })
            }
            Decision::Point {
                major_ref,
                target,
                publish_latest,
                unlink_stale,
            } => {
                self.mutator
                    .create_or_update_ref(&major_ref, &target.commit)
                    .await?;
                if publish_latest {
                    self.mutator
                        .create_or_update_ref(&RefName::latest(namespace), &target.commit)
                        .await?;
                }
                let unlinked = match unlink_stale {
                    Some(commit) => {
                        self.mutator
                            .unlink_latest_if_matching(namespace, &commit)
                            .await?
                    }
                    None => false,
                };
                Ok(MutationResult {
                    major_ref: Some(major_ref),
                    target: Some(target),
                    published_latest: publish_latest,
                    unlinked_latest: unlinked,
                })
            }
        }
    }
}
