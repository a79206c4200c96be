//! checks
//!
//! Pluggable per-package checks.
//!
//! # Contract
//!
//! A [`Check`] has a stable name and three operations, each bound to one
//! package through a [`CheckContext`]:
//!
//! - `validate` is side-effect free and never fails. A missing or
//!   malformed prerequisite file counts as failing.
//! - `fix` (only when [`Check::can_fix`] says so) rewrites the package's
//!   own files atomically. Running it twice changes nothing the second
//!   time.
//! - `message` explains the failure. It never fails on missing files; it
//!   names the missing prerequisite instead.
//!
//! Checks are registered once in a [`CheckRegistry`] and shared read-only
//! through `Arc`.

pub mod engine;
pub mod recommended;

pub use engine::{CheckEngine, CheckResult, FixOutcome, RunMode};

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::core::files::{FileError, JsonFile};
use crate::core::graph::Package;
use crate::core::manifest::MANIFEST_FILE;

/// Title used when a check cannot read the package manifest.
pub const MISSING_MANIFEST_TITLE: &str = "package.json is missing or malformed";

/// Errors from running a check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error("'{}' does not contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("check '{0}' cannot fix this package")]
    NotFixable(String),

    #[error("check task failed: {0}")]
    TaskFailed(String),
}

/// Explanation attached to a failing check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckMessage {
    pub title: String,
    /// File the suggestion applies to, relative to the package.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl CheckMessage {
    /// A message with only a title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file_path: None,
            suggestion: None,
        }
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// What a check sees of the workspace: one package plus the root.
#[derive(Debug, Clone)]
pub struct CheckContext {
    root: PathBuf,
    package: Arc<Package>,
}

impl CheckContext {
    pub fn new(root: impl Into<PathBuf>, package: Arc<Package>) -> Self {
        Self {
            root: root.into(),
            package,
        }
    }

    /// The package under check.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The package's directory on disk.
    pub fn package_dir(&self) -> PathBuf {
        self.root.join(&self.package.path)
    }

    /// Whether the package is the workspace root itself.
    pub fn is_root(&self) -> bool {
        matches!(self.package.path.as_str(), "" | ".")
    }

    /// Owners resolved for the package.
    pub fn owners(&self) -> &[String] {
        &self.package.owners
    }

    /// The package's `package.json`.
    pub fn package_json(&self) -> JsonFile {
        JsonFile::new(&self.package_dir(), MANIFEST_FILE)
    }

    /// The root `package.json`.
    pub fn root_package_json(&self) -> JsonFile {
        JsonFile::new(&self.root, MANIFEST_FILE)
    }
}

/// A per-package check.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use monoguard::checks::{Check, CheckContext, CheckMessage};
///
/// struct HasVersion;
///
/// #[async_trait]
/// impl Check for HasVersion {
///     fn name(&self) -> &'static str {
///         "local/has-version"
///     }
///
///     async fn validate(&self, ctx: &CheckContext) -> bool {
///         !ctx.package().version.is_empty()
///     }
///
///     async fn message(&self, _ctx: &CheckContext) -> CheckMessage {
///         CheckMessage::title("Package must declare a version").with_file("package.json")
///     }
/// }
/// ```
#[async_trait]
pub trait Check: Send + Sync {
    /// Stable, unique name.
    fn name(&self) -> &'static str;

    /// Whether the package conforms.
    async fn validate(&self, ctx: &CheckContext) -> bool;

    /// Whether `fix` can repair this package.
    async fn can_fix(&self, _ctx: &CheckContext) -> bool {
        false
    }

    /// Repair the package's files.
    async fn fix(&self, _ctx: &CheckContext) -> Result<(), CheckError> {
        Err(CheckError::NotFixable(self.name().to_string()))
    }

    /// Explain a failure.
    async fn message(&self, ctx: &CheckContext) -> CheckMessage;
}

/// Registered checks, keyed by name.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: BTreeMap<&'static str, Arc<dyn Check>>,
}

impl CheckRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the recommended checks.
    pub fn recommended() -> Self {
        let mut registry = Self::new();
        for check in recommended::all() {
            registry.register(check);
        }
        registry
    }

    /// Add a check, replacing any check with the same name.
    pub fn register(&mut self, check: Arc<dyn Check>) {
        if self.checks.insert(check.name(), check).is_some() {
            log::debug!("replaced a registered check");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Check>> {
        self.checks.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.keys().copied()
    }

    /// Registered checks, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Check>> {
        self.checks.values()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.checks.keys()).finish()
    }
}
