//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! Every argument falls back to the variable the Actions runner exports, so
//! inside a workflow the binary runs without flags:
//! - `--event-name` / `GITHUB_EVENT_NAME`
//! - `--event-path` / `GITHUB_EVENT_PATH`
//! - `--sha` / `GITHUB_SHA`
//! - `--repository` / `GITHUB_REPOSITORY`
//! - `--token` / `INPUT_TOKEN`
//! - `--output` / `GITHUB_OUTPUT`
//! - `--debug` / `RUNNER_DEBUG`
//!
//! `--publish-latest` and `--prefer-branch-release` only ever turn a
//! preference on; the `INPUT_*` variables are read by the config loader.

use clap::builder::FalseyValueParser;
use clap::Parser;
use std::path::PathBuf;

use crate::forge::github::{DEFAULT_API_BASE, DEFAULT_GRAPHQL_URL};

/// reftagger - keep major-version and latest refs pointing at the newest release
#[derive(Parser, Debug)]
#[command(name = "reftagger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the triggering event (push, release)
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: String,

    /// Path to the JSON event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: PathBuf,

    /// Commit the run was triggered for
    #[arg(long, env = "GITHUB_SHA")]
    pub sha: String,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// Token for the GitHub API
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    pub api_url: String,

    /// GraphQL endpoint
    #[arg(long, env = "GITHUB_GRAPHQL_URL", default_value = DEFAULT_GRAPHQL_URL)]
    pub graphql_url: String,

    /// Config file with preference defaults
    #[arg(long, env = "REFTAGGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// File to append step outputs to; printed when unset
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Also maintain the floating `latest` ref
    #[arg(long)]
    pub publish_latest: bool,

    /// Keep pointers as branches instead of tags
    #[arg(long)]
    pub prefer_branch_release: bool,

    /// Enable debug logging
    #[arg(long, env = "RUNNER_DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    /// Errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}
