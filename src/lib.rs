//! reftagger - keeps major-version and `latest` refs in step with releases
//!
//! reftagger runs once per repository event (a tag or branch created or
//! deleted, a release published or edited) and moves a per-major pointer
//! ref such as `v3`, plus an optional floating `latest`, so that consumers
//! pinned to either always resolve to the newest stable release.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Argument and environment parsing, output reporting
//! - [`engine`] - Classify -> Parse -> Scan -> Resolve -> Decide -> Mutate
//! - [`core`] - Versions, events, domain types and preferences
//! - [`forge`] - The remote ref store (GitHub) and its mock
//! - [`ui`] - Workflow-command output and step outputs
//!
//! # Correctness Invariants
//!
//! 1. Only stable versions (no prerelease, no build metadata) are ever tracked
//! 2. A major ref only moves to the newest release of its major line
//! 3. `latest` is only removed when it points at a deleted commit
//! 4. Every mutation is idempotent, so re-running a run converges

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod ui;
