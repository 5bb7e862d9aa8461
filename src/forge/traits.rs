//! forge::traits
//!
//! Ref store trait definition for the hosting service that owns the
//! repository's refs.
//!
//! # Design
//!
//! The `RefStore` trait is async because every operation is a network
//! round trip. All methods return `Result` so transport failures surface
//! as [`ForgeError`] and propagate untouched through the engine.
//!
//! Ref names passed in are relative to `refs/` (`tags/v3`); ref names coming
//! back from listings are fully qualified (`refs/tags/v3`), mirroring the
//! hosting API.
//!
//! # Example
//!
//! ```ignore
//! use reftagger::core::types::{Namespace, Oid, RefName};
//! use reftagger::forge::{ForgeError, RefStore};
//!
//! async fn point_major(store: &dyn RefStore, sha: &Oid) -> Result<(), ForgeError> {
//!     let name = RefName::major(Namespace::Tags, 3);
//!     let existing = store.list_matching_refs(&name).await?;
//!     if existing.iter().any(|r| name.matches_full(&r.ref_name)) {
//!         store.update_ref(&name, sha, true).await
//!     } else {
//!         store.create_ref(&name, sha).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Namespace, Oid, RefName};

/// Number of refs requested per page when walking a namespace.
pub const PAGE_SIZE: usize = 100;

/// Errors from ref store operations.
///
/// These error types map to common failure modes when interacting
/// with remote hosting services like GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested ref or resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A ref being created already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The GraphQL endpoint answered with errors.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// A ref returned by a prefix listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingRef {
    /// Fully-qualified ref name (`refs/tags/v1`).
    pub ref_name: String,
    /// The object the ref points at.
    pub sha: Oid,
}

/// A ref returned by a namespace page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefNode {
    /// Name with the namespace prefix stripped (`v1.2.3`).
    pub name: String,
    /// The object the ref points at.
    pub target: Oid,
}

/// One page of a namespace walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefPage {
    pub refs: Vec<RefNode>,
    /// Opaque cursor to pass back for the next page.
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// The RefStore trait for reading and writing a repository's refs.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. The engine never retries;
/// any error ends the run.
#[async_trait]
pub trait RefStore: Send + Sync {
    /// Get the store name (e.g., "github").
    fn name(&self) -> &'static str;

    /// List refs whose name starts with `prefix`.
    ///
    /// Prefix semantics: asking for `tags/v1` also returns `tags/v10`.
    async fn list_matching_refs(&self, prefix: &RefName) -> Result<Vec<MatchingRef>, ForgeError>;

    /// Create a ref pointing at `sha`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the ref already exists
    async fn create_ref(&self, name: &RefName, sha: &Oid) -> Result<(), ForgeError>;

    /// Move an existing ref to `sha`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the ref does not exist
    async fn update_ref(&self, name: &RefName, sha: &Oid, force: bool) -> Result<(), ForgeError>;

    /// Delete a ref.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the ref does not exist
    async fn delete_ref(&self, name: &RefName) -> Result<(), ForgeError>;

    /// Fetch one page of refs under `namespace`, ordered descending by name.
    ///
    /// Pass `None` for the first page and the previous page's `end_cursor`
    /// afterwards. Pages hold at most [`PAGE_SIZE`] refs.
    async fn paged_refs(
        &self,
        namespace: Namespace,
        cursor: Option<&str>,
    ) -> Result<RefPage, ForgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forge_error_display() {
        assert_eq!(
            format!("{}", ForgeError::AuthRequired),
            "authentication required"
        );
        assert_eq!(
            format!("{}", ForgeError::AuthFailed("expired token".into())),
            "authentication failed: expired token"
        );
        assert_eq!(
            format!("{}", ForgeError::NotFound("refs/tags/v3".into())),
            "not found: refs/tags/v3"
        );
        assert_eq!(
            format!("{}", ForgeError::AlreadyExists("refs/tags/v3".into())),
            "already exists: refs/tags/v3"
        );
        assert_eq!(format!("{}", ForgeError::RateLimited), "rate limited");
        assert_eq!(
            format!(
                "{}",
                ForgeError::ApiError {
                    status: 422,
                    message: "Validation failed".into()
                }
            ),
            "API error: 422 - Validation failed"
        );
        assert_eq!(
            format!("{}", ForgeError::GraphQl("bad cursor".into())),
            "GraphQL error: bad cursor"
        );
        assert_eq!(
            format!("{}", ForgeError::NetworkError("connection refused".into())),
            "network error: connection refused"
        );
    }

    #[test]
    fn ref_page_default_is_last() {
        let page = RefPage::default();
        assert!(page.refs.is_empty());
        assert!(!page.has_next_page);
        assert!(page.end_cursor.is_none());
    }
}
