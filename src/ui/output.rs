//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Messages are GitHub Actions workflow commands (`::notice::`,
//! `::warning::`, `::error::`, `::debug::`) so the runner renders them as
//! annotations; outside a runner they still read as plain lines. Output
//! respects the quiet flag, except errors which are always shown.
//!
//! Step outputs go to the file named by `GITHUB_OUTPUT` when set, or to
//! stdout otherwise.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Where users report misbehaviour.
pub const BUG_REPORT_URL: &str = "https://github.com/Actions-R-Us/actions-tagger/issues";

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - errors only
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Escape a message for use as workflow command data.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format a workflow command line.
pub fn command(name: &str, message: impl Display) -> String {
    format!("::{}::{}", name, escape_data(&message.to_string()))
}

/// Print a notice (respects quiet mode).
pub fn notice(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", command("notice", message));
    }
}

/// Print a plain informational line (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        println!("{}", command("debug", message));
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    println!("{}", command("error", message));
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", command("warning", message));
    }
}

/// Print the bug-report guidance that follows a validation notice.
pub fn submit_bug_report(verbosity: Verbosity) {
    print(
        "If you believe this to be an error, please submit a bug report",
        verbosity,
    );
    print(BUG_REPORT_URL, verbosity);
}

/// Values published as step outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutputs {
    /// The major-line ref that was touched, or empty.
    pub ref_name: String,
    /// Whether `latest` was published.
    pub latest: bool,
}

impl StepOutputs {
    /// `name=value` lines in output-file format.
    ///
    /// `tag` repeats `ref` for workflows written against older releases.
    pub fn render(&self) -> String {
        format!(
            "ref={r}\ntag={r}\nlatest={}\n",
            self.latest,
            r = self.ref_name
        )
    }

    /// Append to the output file at `path`, or print when there is none.
    pub fn write(&self, path: Option<&Path>) -> io::Result<()> {
        match path {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(self.render().as_bytes())
            }
            None => {
                print!("{}", self.render());
                Ok(())
            }
        }
    }
}
