//! forge
//!
//! Abstraction for the remote ref store (GitHub).
//!
//! # Architecture
//!
//! The `RefStore` trait defines the interface for reading and writing a
//! repository's refs on its hosting service. The engine only ever talks to
//! `dyn RefStore`, so tests substitute [`mock::MockRefStore`].
//!
//! - Ref store operations are plain network round trips; none are retried
//! - Failures surface as [`ForgeError`] and end the run
//!
//! # Modules
//!
//! - `traits`: Core `RefStore` trait and request/response types
//! - [`github`]: GitHub implementation using REST and GraphQL APIs
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use reftagger::forge::github::GitHubRefStore;
//! use reftagger::forge::RefStore;
//!
//! let store = GitHubRefStore::from_repository("octocat/hello-world", token)
//!     .ok_or_else(|| anyhow::anyhow!("bad repository"))?;
//! let refs = store.list_matching_refs(&RefName::major(Namespace::Tags, 3)).await?;
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
