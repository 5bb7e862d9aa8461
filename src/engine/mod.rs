//! engine
//!
//! Orchestrates a run: Classify -> Parse -> Scan -> Resolve -> Decide -> Mutate.
//!
//! # Architecture
//!
//! The engine is the central coordinator. Each stage sits behind a small
//! capability trait so tests can substitute any one of them:
//!
//! 1. **Classify**: narrow the raw event ([`crate::core::event::classify`])
//! 2. **Parse**: read the candidate version ([`crate::core::version::VersionParser`])
//! 3. **Scan**: walk the active ref namespace lazily ([`scan::RefScanner`])
//! 4. **Resolve**: fold the walk into a [`crate::core::types::LatestState`] ([`resolve::LatestResolver`])
//! 5. **Decide**: pick the mutations ([`decide::decide`])
//! 6. **Mutate**: apply them idempotently ([`mutate::RefMutator`])
//!
//! # Run Lifecycle
//!
//! ```text
//! START -> CONTEXT_CHECK -> SEMVER_CHECK -> RESOLVE -> (deletion | creation) -> DONE
//!              |                 |                            |
//!              v                 v                            v
//!       CONTEXT_INVALID    SEMVER_INVALID                   STALE
//! ```
//!
//! # Invariants
//!
//! - Nothing is cached between runs; every run re-derives state from the store
//! - Validation failures happen before any mutation
//! - Ref store failures are never retried and end the run
//! - Completed mutations are not rolled back; re-running converges
//!
//! # Concurrency
//!
//! A run is strictly sequential. Two overlapping runs on the same major line
//! race on the force-update of the major ref and the last writer wins.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use reftagger::engine::Tagger;
//!
//! let tagger = Tagger::new(Arc::new(store), preferences);
//! let result = tagger.run(&raw_event).await?;
//! ```

pub mod decide;
pub mod mutate;
pub mod resolve;
pub mod scan;

pub use decide::{decide, Decision, MutationResult, Tagger};
pub use mutate::{RefMutator, StoreMutator};
pub use resolve::{LatestResolver, SinglePassResolver};
pub use scan::{PagedScan, RefScanner, RefSequence, StoreScanner};

use thiserror::Error;

use crate::core::version::Version;
use crate::forge::ForgeError;

/// Errors that end a run.
///
/// The first three variants are expected validation outcomes; only
/// [`TaggerError::Forge`] is a failure of the run itself.
#[derive(Debug, Error)]
pub enum TaggerError {
    /// The event is not one this tool acts on.
    #[error("this action should only be used in a release context or when creating/deleting a tag or branch")]
    Context,

    /// The candidate ref is not a semantic version.
    #[error("'{raw}' is not a semantically versioned ref (see https://semver.org/)")]
    Semver { raw: String },

    /// The event's version trails the tracked latest of its major line.
    #[error("nothing to do because {version} is earlier than {major_latest}, the latest release of its major line")]
    StaleRef {
        version: Version,
        major_latest: Version,
    },

    /// The ref store failed.
    #[error("ref store error: {0}")]
    Forge(#[from] ForgeError),
}

impl TaggerError {
    /// Whether this is a named validation condition rather than a failure.
    pub fn is_validation(&self) -> bool {
        !matches!(self, TaggerError::Forge(_))
    }

    /// Stable code for validation conditions.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            TaggerError::Context => Some("ACTION_CONTEXT_ERROR"),
            TaggerError::Semver { .. } => Some("ACTION_SEMVER_ERROR"),
            TaggerError::StaleRef { .. } => Some("ACTION_OLDREF_ERROR"),
            TaggerError::Forge(_) => None,
        }
    }
}
