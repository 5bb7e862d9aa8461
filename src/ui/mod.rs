//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Workflow commands, verbosity and step outputs
//!
//! # Design
//!
//! All user-facing output goes through this module so quiet and debug modes
//! behave the same everywhere. Diagnostics meant for maintainers go through
//! `tracing` instead.

pub mod output;
