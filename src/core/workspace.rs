//! core::workspace
//!
//! Discover package directories from the root manifest's `workspaces`.
//!
//! # Supported forms
//!
//! ```json
//! { "workspaces": ["apps/*", "packages/*", "!packages/legacy"] }
//! { "workspaces": { "packages": ["packages/*"] } }
//! ```
//!
//! Directory paths are returned relative to the root with `/`
//! separators, sorted and deduplicated. `node_modules` is never entered.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use super::files::{FileError, JsonFile};
use super::manifest::MANIFEST_FILE;

/// Errors from workspace discovery.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("cannot read root manifest: {0}")]
    RootManifest(#[from] FileError),

    #[error("invalid workspace pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("workspace discovery task failed: {0}")]
    TaskFailed(String),
}

/// A discovered workspace.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Absolute or caller-relative workspace root.
    pub root: PathBuf,
    /// The root `package.json` document.
    pub root_manifest: Value,
    /// Package directories relative to `root`.
    pub package_dirs: Vec<String>,
}

impl Workspace {
    /// Discover the workspace rooted at `root`.
    ///
    /// # Errors
    ///
    /// Fails when the root manifest cannot be read or parsed, or when a
    /// workspace pattern is not a valid glob.
    pub async fn discover(root: &Path) -> Result<Self, WorkspaceError> {
        let root_manifest = JsonFile::new(root, MANIFEST_FILE).load().await?;
        let patterns = workspace_patterns(&root_manifest);
        if patterns.is_empty() {
            log::warn!(
                "root manifest at {} declares no workspaces",
                root.display()
            );
        }

        let root_buf = root.to_path_buf();
        let package_dirs =
            tokio::task::spawn_blocking(move || expand_patterns(&root_buf, &patterns))
                .await
                .map_err(|e| WorkspaceError::TaskFailed(e.to_string()))??;

        log::debug!("discovered {} package(s)", package_dirs.len());
        Ok(Self {
            root: root.to_path_buf(),
            root_manifest,
            package_dirs,
        })
    }
}

/// Extract the `workspaces` patterns from a root manifest.
pub fn workspace_patterns(root_manifest: &Value) -> Vec<String> {
    let list = match root_manifest.get("workspaces") {
        Some(Value::Array(list)) => list,
        Some(Value::Object(object)) => match object.get("packages") {
            Some(Value::Array(list)) => list,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    list.iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Expand include patterns on disk and filter out negated ones.
pub fn expand_patterns(root: &Path, patterns: &[String]) -> Result<Vec<String>, WorkspaceError> {
    let (excludes, includes): (Vec<&String>, Vec<&String>) =
        patterns.iter().partition(|p| p.starts_with('!'));

    let exclude_set = build_exclude_set(&excludes)?;
    let mut dirs = Vec::new();

    for pattern in includes {
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        let full = root.join(pattern);
        let entries = glob::glob(&full.to_string_lossy()).map_err(|e| {
            WorkspaceError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            }
        })?;

        for entry in entries.flatten() {
            if !entry.join(MANIFEST_FILE).is_file() {
                continue;
            }
            let Some(relative) = relative_path(root, &entry) else {
                log::warn!(
                    "skipping '{}': not under workspace root '{}'",
                    entry.display(),
                    root.display()
                );
                continue;
            };
            if relative.split('/').any(|c| c == "node_modules") {
                continue;
            }
            if exclude_set.is_match(&relative) {
                continue;
            }
            dirs.push(relative);
        }
    }

    dirs.sort();
    dirs.dedup();
    Ok(dirs)
}

fn build_exclude_set(excludes: &[&String]) -> Result<GlobSet, WorkspaceError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in excludes {
        let trimmed = pattern
            .trim_start_matches('!')
            .trim_start_matches("./")
            .trim_end_matches('/');
        let glob = Glob::new(trimmed).map_err(|e| WorkspaceError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| WorkspaceError::InvalidPattern {
        pattern: excludes
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        message: e.to_string(),
    })
}

/// `entry` relative to `root`, `/`-separated. The root itself is `""`.
///
/// `.` components are ignored on both sides, so `./packages/a` under `.`
/// is `packages/a`.
pub fn relative_path(root: &Path, entry: &Path) -> Option<String> {
    let root = without_cur_dir(root);
    let entry = without_cur_dir(entry);
    let relative = entry.strip_prefix(&root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Find the workspace root for `start`.
///
/// Walks up from `start` to the nearest directory whose `package.json`
/// declares `workspaces`. Falls back to `start` when none does.
pub fn find_root(start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        let Ok(contents) = std::fs::read_to_string(dir.join(MANIFEST_FILE)) else {
            continue;
        };
        let Ok(manifest) = serde_json::from_str::<Value>(&contents) else {
            continue;
        };
        if !workspace_patterns(&manifest).is_empty() {
            return dir.to_path_buf();
        }
    }
    start.to_path_buf()
}
