//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// monoguard - dependency constraints and package checks for monorepos
#[derive(Parser, Debug)]
#[command(name = "monoguard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if monoguard was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run package checks
    #[command(
        name = "check",
        long_about = "Run the configured checks against every workspace package.\n\n\
            Checks are bound to tags in the project config. Without bindings, \
            every recommended check runs against every package. With --fix, \
            fixable failures are repaired and validated again.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Run every check
    monoguard check

    # Repair what can be repaired
    monoguard check --fix

    # Check a single package
    monoguard check --package @acme/ui"
    )]
    Check {
        /// Fix failing checks where possible
        #[arg(long)]
        fix: bool,

        /// Only check this package
        #[arg(long, value_name = "NAME")]
        package: Option<String>,
    },

    /// Validate dependency constraints
    #[command(
        name = "constrain",
        long_about = "Evaluate the tag constraints in the project config against \
            every dependency between workspace packages.\n\n\
            Exits non-zero when any dependency violates an applicable rule.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Report violations
    monoguard constrain

    # Machine-readable output for CI
    monoguard constrain --json"
    )]
    Constrain,

    /// List workspace packages
    #[command(name = "list")]
    List,

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    monoguard completion bash > /etc/bash_completion.d/monoguard

    # Zsh
    monoguard completion zsh > \"${fpath[1]}/_monoguard\"

    # Fish
    monoguard completion fish > ~/.config/fish/completions/monoguard.fish

    # PowerShell
    monoguard completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Shells supported by `completion`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
