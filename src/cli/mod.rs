//! cli
//!
//! Command-line interface layer for monoguard.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialise logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! command handlers, which load the workspace and call into
//! [`crate::constraints`] and [`crate::checks`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::ui::output::Verbosity;

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Directory to run in (defaults to the process cwd)
    pub cwd: Option<PathBuf>,
    pub debug: bool,
    pub quiet: bool,
    /// Print JSON instead of text
    pub json: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// The directory commands start from, as an absolute path.
    pub fn start_dir(&self) -> Result<PathBuf> {
        let dir = match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        dir.canonicalize()
            .with_context(|| format!("Cannot access directory '{}'", dir.display()))
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Log to stderr at `warn`, or `debug` with `--debug`. `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .try_init();
}
