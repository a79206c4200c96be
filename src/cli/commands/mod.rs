//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the workspace (config, packages, graph)
//! 2. Runs the constraint resolver or the check engine
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Workspace loading and checks run on tokio. Each handler creates a
//! runtime and blocks on its async body, so dispatch stays synchronous.
//!
//! # Exit Status
//!
//! Handlers return an error when a check fails, a constraint is
//! violated, or a package could not be read, so the process exits
//! non-zero.

mod check;
mod completion;
mod constrain;
mod list;
mod workspace;

pub use check::check;
pub use completion::completion;
pub use constrain::constrain;
pub use list::list;

use super::args::Command;
use super::Context;
use anyhow::Result;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Check { fix, package } => check(ctx, fix, package.as_deref()),
        Command::Constrain => constrain(ctx),
        Command::List => list(ctx),
        Command::Completion { shell } => completion(shell),
    }
}
