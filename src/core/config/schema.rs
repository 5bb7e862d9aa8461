//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Config File
//!
//! Optional; located via `--config <path>` or `$REFTAGGER_CONFIG`.
//!
//! ```toml
//! publish_latest = true
//! prefer_branch_release = false
//! ```

use serde::{Deserialize, Serialize};

/// On-disk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Also maintain the floating `latest` ref
    pub publish_latest: Option<bool>,

    /// Keep pointers as branches (`refs/heads/`) instead of tags
    pub prefer_branch_release: Option<bool>,
}

/// Run preferences, fixed for the duration of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub publish_latest: bool,
    pub prefer_branch_release: bool,
}
