//! forge::mock
//!
//! Mock ref store implementation for deterministic testing.
//!
//! # Design
//!
//! The mock ref store provides a deterministic implementation of the
//! `RefStore` trait for use in tests. It keeps refs in memory keyed by their
//! fully-qualified name, records every call, and allows configuring failure
//! scenarios.
//!
//! Pagination mirrors the GraphQL walk: refs are returned in descending
//! name order and the cursor is opaque to callers.
//!
//! # Example
//!
//! ```
//! use reftagger::core::types::{Namespace, Oid, RefName};
//! use reftagger::forge::mock::MockRefStore;
//! use reftagger::forge::RefStore;
//!
//! # tokio_test::block_on(async {
//! let sha = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let store = MockRefStore::with_refs([("refs/tags/v1.0.0", sha.clone())]);
//!
//! store.create_ref(&RefName::major(Namespace::Tags, 1), &sha).await.unwrap();
//! assert_eq!(store.ref_target("refs/tags/v1"), Some(sha));
//! # });
//! ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::traits::{ForgeError, MatchingRef, RefNode, RefPage, RefStore, PAGE_SIZE};
use crate::core::types::{Namespace, Oid, RefName};

/// Mock ref store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones share state,
/// so a test can hand one clone to the engine and inspect the other.
#[derive(Debug, Clone)]
pub struct MockRefStore {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockRefStoreInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockRefStoreInner {
    /// Stored refs by fully-qualified name.
    refs: BTreeMap<String, Oid>,
    /// Refs per page in `paged_refs`.
    page_size: usize,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail list_matching_refs with the given error.
    ListMatchingRefs(ForgeError),
    /// Fail create_ref with the given error.
    CreateRef(ForgeError),
    /// Fail update_ref with the given error.
    UpdateRef(ForgeError),
    /// Fail delete_ref with the given error.
    DeleteRef(ForgeError),
    /// Fail paged_refs with the given error.
    PagedRefs(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListMatchingRefs {
        prefix: String,
    },
    CreateRef {
        name: String,
        sha: Oid,
    },
    UpdateRef {
        name: String,
        sha: Oid,
        force: bool,
    },
    DeleteRef {
        name: String,
    },
    PagedRefs {
        namespace: Namespace,
        cursor: Option<String>,
    },
}

impl MockOperation {
    /// Whether this operation writes to the store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            MockOperation::CreateRef { .. }
                | MockOperation::UpdateRef { .. }
                | MockOperation::DeleteRef { .. }
        )
    }
}

impl MockRefStore {
    /// Create a new empty mock ref store.
    pub fn new() -> Self {
        Self::with_refs(Vec::<(String, Oid)>::new())
    }

    /// Create a mock ref store with pre-existing refs.
    ///
    /// Names are fully qualified (`refs/tags/v1.0.0`).
    pub fn with_refs<I, S>(refs: I) -> Self
    where
        I: IntoIterator<Item = (S, Oid)>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(Mutex::new(MockRefStoreInner {
                refs: refs.into_iter().map(|(n, o)| (n.into(), o)).collect(),
                page_size: PAGE_SIZE,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Set the number of refs returned per page.
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.state().page_size = page_size.max(1);
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use reftagger::forge::mock::{FailOn, MockRefStore};
    /// use reftagger::forge::ForgeError;
    ///
    /// let store = MockRefStore::new()
    ///     .fail_on(FailOn::CreateRef(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.state().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.state().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.state().operations.clone()
    }

    /// Get recorded create/update/delete operations only.
    pub fn mutations(&self) -> Vec<MockOperation> {
        self.state()
            .operations
            .iter()
            .filter(|op| op.is_mutation())
            .cloned()
            .collect()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.state().operations.clear();
    }

    /// Get the target of a ref by fully-qualified name.
    pub fn ref_target(&self, full_name: &str) -> Option<Oid> {
        self.state().refs.get(full_name).cloned()
    }

    /// Snapshot of every stored ref.
    pub fn refs(&self) -> BTreeMap<String, Oid> {
        self.state().refs.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockRefStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        self.state().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), ForgeError> {
        let inner = self.state();
        match &inner.fail_on {
            Some(FailOn::ListMatchingRefs(e)) if expected == "list_matching_refs" => Err(e.clone()),
            Some(FailOn::CreateRef(e)) if expected == "create_ref" => Err(e.clone()),
            Some(FailOn::UpdateRef(e)) if expected == "update_ref" => Err(e.clone()),
            Some(FailOn::DeleteRef(e)) if expected == "delete_ref" => Err(e.clone()),
            Some(FailOn::PagedRefs(e)) if expected == "paged_refs" => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

impl Default for MockRefStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefStore for MockRefStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_matching_refs(&self, prefix: &RefName) -> Result<Vec<MatchingRef>, ForgeError> {
        self.record(MockOperation::ListMatchingRefs {
            prefix: prefix.to_string(),
        });
        self.check_fail("list_matching_refs")?;

        let full = prefix.full();
        let inner = self.state();
        Ok(inner
            .refs
            .iter()
            .filter(|(name, _)| name.starts_with(&full))
            .map(|(name, sha)| MatchingRef {
                ref_name: name.clone(),
                sha: sha.clone(),
            })
            .collect())
    }

    async fn create_ref(&self, name: &RefName, sha: &Oid) -> Result<(), ForgeError> {
        self.record(MockOperation::CreateRef {
            name: name.to_string(),
            sha: sha.clone(),
        });
        self.check_fail("create_ref")?;

        let full = name.full();
        let mut inner = self.state();
        if inner.refs.contains_key(&full) {
            return Err(ForgeError::AlreadyExists(full));
        }
        inner.refs.insert(full, sha.clone());
        Ok(())
    }

    async fn update_ref(&self, name: &RefName, sha: &Oid, force: bool) -> Result<(), ForgeError> {
        self.record(MockOperation::UpdateRef {
            name: name.to_string(),
            sha: sha.clone(),
            force,
        });
        self.check_fail("update_ref")?;

        let full = name.full();
        let mut inner = self.state();
        match inner.refs.get_mut(&full) {
            Some(target) => {
                *target = sha.clone();
                Ok(())
            }
            None => Err(ForgeError::NotFound(full)),
        }
    }

    async fn delete_ref(&self, name: &RefName) -> Result<(), ForgeError> {
        self.record(MockOperation::DeleteRef {
            name: name.to_string(),
        });
        self.check_fail("delete_ref")?;

        let full = name.full();
        match self.state().refs.remove(&full) {
            Some(_) => Ok(()),
            None => Err(ForgeError::NotFound(full)),
        }
    }

    async fn paged_refs(
        &self,
        namespace: Namespace,
        cursor: Option<&str>,
    ) -> Result<RefPage, ForgeError> {
        self.record(MockOperation::PagedRefs {
            namespace,
            cursor: cursor.map(str::to_string),
        });
        self.check_fail("paged_refs")?;

        let offset = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| ForgeError::GraphQl(format!("invalid cursor '{}'", c)))?,
            None => 0,
        };

        let inner = self.state();
        let prefix = namespace.full_prefix();
        let all: Vec<RefNode> = inner
            .refs
            .iter()
            .rev()
            .filter_map(|(name, sha)| {
                name.strip_prefix(prefix).map(|short| RefNode {
                    name: short.to_string(),
                    target: sha.clone(),
                })
            })
            .collect();

        let refs: Vec<RefNode> = all
            .iter()
            .skip(offset)
            .take(inner.page_size)
            .cloned()
            .collect();
        let end = offset + refs.len();

        Ok(RefPage {
            end_cursor: (!refs.is_empty()).then(|| end.to_string()),
            has_next_page: end < all.len(),
            refs,
        })
    }
}
