//! Shared workspace loading for commands.
//!
//! Every command reads the same inputs: the project config, the
//! workspace's package directories, CODEOWNERS, and the package graph.
//! Configuration problems are fatal here, before any command runs;
//! per-package read failures and file warnings are reported and the
//! rest is loaded.

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::Context;
use crate::core::codeowners::Codeowners;
use crate::core::config::Config;
use crate::core::graph::{GraphBuild, GraphBuilder, PackageFailure};
use crate::core::workspace::{find_root, relative_path, Workspace};
use crate::ui::output;

/// Everything a command needs about the workspace.
pub(crate) struct LoadedWorkspace {
    pub root: PathBuf,
    pub config: Config,
    pub build: GraphBuild,
}

/// A package that could not be loaded, for reporting.
#[derive(Debug, Serialize)]
pub(crate) struct FailureReport {
    pub path: String,
    pub error: String,
}

impl From<&PackageFailure> for FailureReport {
    fn from(failure: &PackageFailure) -> Self {
        Self {
            path: failure.path.clone(),
            error: failure.error.to_string(),
        }
    }
}

/// A recoverable problem in a package's files, for reporting.
#[derive(Debug, Serialize)]
pub(crate) struct WarningReport {
    /// File the warning refers to, relative to the workspace root.
    pub path: String,
    pub message: String,
}

impl LoadedWorkspace {
    pub fn failure_reports(&self) -> Vec<FailureReport> {
        self.build.failures.iter().map(FailureReport::from).collect()
    }

    pub fn warning_reports(&self) -> Vec<WarningReport> {
        self.build
            .warnings
            .iter()
            .map(|warning| WarningReport {
                path: display_path(&self.root, &warning.path),
                message: warning.message.clone(),
            })
            .collect()
    }
}

/// `path` relative to `root` when it lies inside it.
fn display_path(root: &Path, path: &Path) -> String {
    relative_path(root, path).unwrap_or_else(|| path.display().to_string())
}

/// Load config, discover packages and build the graph.
pub(crate) async fn load(ctx: &Context) -> Result<LoadedWorkspace> {
    let verbosity = ctx.verbosity();
    let root = find_root(&ctx.start_dir()?);
    log::debug!("workspace root: {}", root.display());

    let loaded = Config::load(&root).context("Failed to load project config")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }

    let workspace = Workspace::discover(&root)
        .await
        .with_context(|| format!("Failed to read workspace at {}", root.display()))?;

    let codeowners_root = root.clone();
    let codeowners = tokio::task::spawn_blocking(move || Codeowners::load(&codeowners_root))
        .await
        .context("CODEOWNERS task failed")?
        .context("Failed to read CODEOWNERS")?;

    let build = GraphBuilder::new(&root)
        .with_codeowners(Arc::new(codeowners))
        .build(&workspace.package_dirs)
        .await
        .context("Failed to build package graph")?;

    for failure in &build.failures {
        output::warn(format!("{}: {}", failure.path, failure.error), verbosity);
    }
    for warning in &build.warnings {
        output::warn(
            format!("{}: {}", display_path(&root, &warning.path), warning.message),
            verbosity,
        );
    }

    Ok(LoadedWorkspace {
        root,
        config: loaded.config,
        build,
    })
}
