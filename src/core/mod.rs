//! core
//!
//! Core domain types and schemas for reftagger.
//!
//! # Modules
//!
//! - [`version`] - Semantic version parsing and precedence
//! - [`types`] - Strong types: Oid, RefName, Namespace, RefRecord
//! - [`event`] - Classification of the triggering event
//! - [`config`] - Preference schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Nothing here performs I/O beyond reading the config file
//! - All classification and ordering is deterministic

pub mod config;
pub mod event;
pub mod types;
pub mod version;
