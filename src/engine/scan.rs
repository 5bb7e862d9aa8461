//! engine::scan
//!
//! Lazy walk over the versioned refs of a namespace.
//!
//! # Architecture
//!
//! The scanner turns the ref store's cursor-paginated listing into a
//! [`RefSequence`]: a pull-based, non-restartable sequence of
//! [`RefRecord`]s. Each call to [`RefSequence::next`] either hands out a
//! buffered ref or suspends on exactly one page fetch.
//!
//! Refs whose names do not parse as versions, or that carry prerelease or
//! build identifiers, are skipped (`latest`, `v3`, `main`, `v2.0.0-rc.1`).
//!
//! # Invariants
//!
//! - Pages are fetched strictly in order; page N+1 is never requested before
//!   every ref of page N has been handed out
//! - A consumer that stops pulling causes no further fetches
//! - Each call to [`RefScanner::scan`] starts a fresh traversal

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use crate::core::types::{Namespace, RefRecord};
use crate::core::version::VersionParser;
use crate::forge::{ForgeError, RefNode, RefStore};

/// A lazy, finite sequence of stable versioned refs.
#[async_trait]
pub trait RefSequence: Send {
    /// Pull the next ref, fetching a page if the buffer is empty.
    ///
    /// Returns `Ok(None)` once the sequence is exhausted.
    async fn next(&mut self) -> Result<Option<RefRecord>, ForgeError>;
}

/// Capability for starting a namespace walk.
pub trait RefScanner: Send + Sync {
    fn scan(&self, namespace: Namespace) -> Box<dyn RefSequence + '_>;
}

/// In-memory sequences, for feeding a resolver directly.
#[async_trait]
impl RefSequence for std::vec::IntoIter<RefRecord> {
    async fn next(&mut self) -> Result<Option<RefRecord>, ForgeError> {
        Ok(Iterator::next(self))
    }
}

/// Scanner backed by a [`RefStore`].
pub struct StoreScanner {
    store: Arc<dyn RefStore>,
    parser: Arc<dyn VersionParser>,
}

impl StoreScanner {
    pub fn new(store: Arc<dyn RefStore>, parser: Arc<dyn VersionParser>) -> Self {
        Self { store, parser }
    }
}

impl RefScanner for StoreScanner {
    fn scan(&self, namespace: Namespace) -> Box<dyn RefSequence + '_> {
        Box::new(PagedScan::new(
            self.store.as_ref(),
            self.parser.as_ref(),
            namespace,
        ))
    }
}

/// Cursor state for one traversal of a namespace.
pub struct PagedScan<'a> {
    store: &'a dyn RefStore,
    parser: &'a dyn VersionParser,
    namespace: Namespace,
    buffer: VecDeque<RefNode>,
    cursor: Option<String>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a> PagedScan<'a> {
    pub fn new(store: &'a dyn RefStore, parser: &'a dyn VersionParser, namespace: Namespace) -> Self {
        Self {
            store,
            parser,
            namespace,
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    async fn fetch_page(&mut self) -> Result<(), ForgeError> {
        let page = self
            .store
            .paged_refs(self.namespace, self.cursor.as_deref())
            .await?;
        self.pages_fetched += 1;
        debug!(
            namespace = %self.namespace,
            page = self.pages_fetched,
            refs = page.refs.len(),
            has_next_page = page.has_next_page,
            "fetched ref page"
        );

        self.buffer.extend(page.refs);
        // A next page without a cursor cannot be requested.
        match (page.has_next_page, page.end_cursor) {
            (true, Some(cursor)) => self.cursor = Some(cursor),
            _ => self.exhausted = true,
        }
        Ok(())
    }
}

#[async_trait]
impl<'a> RefSequence for PagedScan<'a> {
    async fn next(&mut self) -> Result<Option<RefRecord>, ForgeError> {
        loop {
            if let Some(node) = self.buffer.pop_front() {
                match self.parser.parse(&node.name).filter(|v| v.is_stable()) {
                    Some(version) => {
                        debug!(ref_name = %node.name, "checking");
                        return Ok(Some(RefRecord::new(node.name, node.target, version)));
                    }
                    None => debug!(ref_name = %node.name, "ignoring"),
                }
                continue;
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }
}
