//! engine::mutate
//!
//! Idempotent writes to the ref store.
//!
//! # Invariants
//!
//! - `create_or_update_ref` converges: calling it twice with the same
//!   arguments leaves the store in the same state as calling it once
//! - Lookups match ref names exactly, so `tags/v1` never touches `tags/v10`
//! - `latest` is only ever removed when it points at the given commit

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::types::{Namespace, Oid, RefName};
use crate::forge::{ForgeError, RefStore};

/// Capability for changing pointer refs.
#[async_trait]
pub trait RefMutator: Send + Sync {
    /// Point `name` at `commit`, creating it if missing.
    async fn create_or_update_ref(&self, name: &RefName, commit: &Oid) -> Result<(), ForgeError>;

    /// Remove `name`. A ref that is already gone counts as removed.
    async fn delete_ref(&self, name: &RefName) -> Result<(), ForgeError>;

    /// Remove the namespace's `latest` ref if it points at `commit`.
    ///
    /// Returns whether a ref was removed.
    async fn unlink_latest_if_matching(
        &self,
        namespace: Namespace,
        commit: &Oid,
    ) -> Result<bool, ForgeError>;
}

/// Mutator backed by a [`RefStore`].
pub struct StoreMutator {
    store: Arc<dyn RefStore>,
}

impl StoreMutator {
    pub fn new(store: Arc<dyn RefStore>) -> Self {
        Self { store }
    }

    /// Target of the exact ref `name`, if it exists.
    async fn current_target(&self, name: &RefName) -> Result<Option<Oid>, ForgeError> {
        let matching = self.store.list_matching_refs(name).await?;
        Ok(matching
            .into_iter()
            .find(|r| name.matches_full(&r.ref_name))
            .map(|r| r.sha))
    }
}

#[async_trait]
impl RefMutator for StoreMutator {
    async fn create_or_update_ref(&self, name: &RefName, commit: &Oid) -> Result<(), ForgeError> {
        match self.current_target(name).await? {
            Some(previous) => {
                info!(ref_name = %name, from = %previous.short(7), to = %commit, "updating ref");
                self.store.update_ref(name, commit, true).await
            }
            None => {
                info!(ref_name = %name.full(), sha = %commit, "creating ref");
                self.store.create_ref(name, commit).await
            }
        }
    }

    async fn delete_ref(&self, name: &RefName) -> Result<(), ForgeError> {
        match self.store.delete_ref(name).await {
            Ok(()) => {
                info!(ref_name = %name, "deleted ref");
                Ok(())
            }
            Err(ForgeError::NotFound(_)) => {
                debug!(ref_name = %name, "ref already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn unlink_latest_if_matching(
        &self,
        namespace: Namespace,
        commit: &Oid,
    ) -> Result<bool, ForgeError> {
        let latest = RefName::latest(namespace);
        match self.current_target(&latest).await? {
            Some(target) if &target == commit => {
                self.delete_ref(&latest).await?;
                Ok(true)
            }
            Some(target) => {
                debug!(ref_name = %latest, target = %target.short(7), "latest points elsewhere, keeping it");
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
