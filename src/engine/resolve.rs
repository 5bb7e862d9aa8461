//! engine::resolve
//!
//! Computes the repository-wide latest release and the latest release of the
//! event's major line in a single pass over a [`RefSequence`].
//!
//! # Algorithm
//!
//! Both slots start at the event's own ref, unless the event is a deletion:
//! a deleted ref must not count as present, so the slots start empty. Every
//! scanned ref then replaces `repo_latest` if it is strictly newer, and
//! replaces `major_latest` if it shares the event's major number and is
//! strictly newer. Ties keep the earlier holder, so the event itself wins a
//! tie against a ref of equal precedence.
//!
//! No sorting is needed and each ref is looked at once.

use async_trait::async_trait;

use super::scan::RefSequence;
use crate::core::types::{LatestState, RefRecord};
use crate::forge::ForgeError;

/// Capability for folding a scan into a [`LatestState`].
#[async_trait]
pub trait LatestResolver: Send + Sync {
    /// Resolve latest refs for `event`.
    ///
    /// `event` seeds both slots only when `seed` is true.
    async fn resolve(
        &self,
        event: &RefRecord,
        seed: bool,
        refs: &mut (dyn RefSequence + '_),
    ) -> Result<LatestState, ForgeError>;
}

/// The linear single-pass resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePassResolver;

#[async_trait]
impl LatestResolver for SinglePassResolver {
    async fn resolve(
        &self,
        event: &RefRecord,
        seed: bool,
        refs: &mut (dyn RefSequence + '_),
    ) -> Result<LatestState, ForgeError> {
        let major = event.version.major();
        let mut state = if seed {
            LatestState {
                repo_latest: Some(event.clone()),
                major_latest: Some(event.clone()),
            }
        } else {
            LatestState::default()
        };

        while let Some(record) = refs.next().await? {
            observe(&mut state, major, record);
        }
        Ok(state)
    }
}

/// Fold one scanned ref into `state`.
pub fn observe(state: &mut LatestState, major: u64, record: RefRecord) {
    if record.version.major() == major && newer(&state.major_latest, &record) {
        state.major_latest = Some(record.clone());
    }
    if newer(&state.repo_latest, &record) {
        state.repo_latest = Some(record);
    }
}

fn newer(current: &Option<RefRecord>, candidate: &RefRecord) -> bool {
    match current {
        Some(held) => candidate.version > held.version,
        None => true,
    }
}
