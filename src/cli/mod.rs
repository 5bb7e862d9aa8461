//! cli
//!
//! Command-line interface layer for reftagger.
//!
//! # Responsibilities
//!
//! - Parse arguments and the runner's environment
//! - Load preferences and the event payload
//! - Build the ref store and hand the event to the [`crate::engine`]
//! - Report the outcome and publish step outputs
//!
//! # Exit Status
//!
//! Validation conditions (inapplicable event, unversioned ref, stale
//! version) are reported as notices and exit successfully, so a workflow
//! triggered by an unrelated push does not fail. Ref store failures exit
//! with status 1.

pub mod args;

pub use args::Cli;

use anyhow::{Context as _, Result};
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::core::config::{Config, Preferences};
use crate::core::event::{classify, RawEvent};
use crate::engine::{MutationResult, Tagger, TaggerError};
use crate::forge::github::{parse_repository, GitHubRefStore};
use crate::forge::ForgeError;
use crate::ui::output::{self, StepOutputs, Verbosity};

/// Legacy variable some workflows still pass the token through.
pub const LEGACY_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `debug` enables debug logs.
pub fn init_tracing(debug: bool) {
    let default = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Pick the API token.
///
/// The legacy variable takes precedence when set and non-empty; the second
/// value reports whether it was used.
pub fn resolve_token(input: Option<String>, legacy: Option<String>) -> (Option<String>, bool) {
    match legacy.filter(|t| !t.is_empty()) {
        Some(token) => (Some(token), true),
        None => (input.filter(|t| !t.is_empty()), false),
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);
    run_with(cli, std::env::var(LEGACY_TOKEN_VAR).ok()).await
}

/// Run with already-parsed arguments.
pub async fn run_with(cli: Cli, legacy_token: Option<String>) -> Result<ExitCode> {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let preferences = load_preferences(&cli, verbosity)?;
    debug!(?preferences, "preferences");

    let payload = fs::read_to_string(&cli.event_path)
        .with_context(|| format!("failed to read event payload '{}'", cli.event_path.display()))?;
    let raw = RawEvent::from_payload(&cli.event_name, &payload, &cli.sha)
        .context("failed to load event")?;

    let (token, used_legacy) = resolve_token(cli.token.clone(), legacy_token);
    if used_legacy {
        output::notice(
            "Using obsolete GITHUB_TOKEN environment variable: please use the token input instead. \
             In most cases the default value just works and you can remove the variable from your workflow.",
            verbosity,
        );
    }

    let (owner, repo) = parse_repository(&cli.repository)
        .with_context(|| format!("invalid repository '{}', expected owner/name", cli.repository))?;
    let store = GitHubRefStore::with_endpoints(
        token.unwrap_or_default(),
        owner,
        repo,
        &cli.api_url,
        &cli.graphql_url,
    );

    let tagger = Tagger::new(Arc::new(store), preferences);
    match tagger.run(&raw).await {
        Ok(result) => {
            report_success(&result, verbosity);
            step_outputs(&result)
                .write(cli.output.as_deref())
                .context("failed to write step outputs")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_validation() => {
            report_validation(&err, &raw, verbosity);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            output::error(&err);
            if matches!(err, TaggerError::Forge(ForgeError::AuthRequired)) {
                output::error("pass a token with --token or the INPUT_TOKEN variable");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Config file and inputs, then CLI flags on top.
fn load_preferences(cli: &Cli, verbosity: Verbosity) -> Result<Preferences> {
    let loaded = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    for warning in &loaded.warnings {
        warn!(key = %warning.key, "{}", warning.message);
        output::warn(&warning.message, verbosity);
    }

    let mut preferences = loaded.preferences;
    if cli.publish_latest {
        preferences.publish_latest = true;
    }
    if cli.prefer_branch_release {
        preferences.prefer_branch_release = true;
    }
    Ok(preferences)
}

/// Step outputs for a successful run.
pub fn step_outputs(result: &MutationResult) -> StepOutputs {
    StepOutputs {
        ref_name: result
            .major_ref
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        latest: result.published_latest,
    }
}

fn report_success(result: &MutationResult, verbosity: Verbosity) {
    match (&result.major_ref, &result.target) {
        (Some(major), Some(target)) => {
            output::notice(
                format!("{} now points to {} ({})", major, target.name, target.commit.short(7)),
                verbosity,
            );
        }
        _ => output::notice("no major ref left to update", verbosity),
    }
    if result.published_latest {
        output::print("latest ref published", verbosity);
    }
    if result.unlinked_latest {
        output::print("removed latest ref pointing at the deleted commit", verbosity);
    }
}

fn report_validation(err: &TaggerError, raw: &RawEvent, verbosity: Verbosity) {
    output::notice(err, verbosity);
    output::submit_bug_report(verbosity);
    output::debug(format!("event: {}", raw.event_name), verbosity);
    if let Some(event) = classify(raw) {
        output::debug(format!("ref: {}", event.candidate()), verbosity);
    }
}
