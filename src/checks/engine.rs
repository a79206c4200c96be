//! checks::engine
//!
//! Runs checks over the packages of a graph.
//!
//! # Execution
//!
//! Packages are processed concurrently, one task per package. Within a
//! package the selected checks run one after another, so a fix is fully
//! written before the next check reads the manifest. A task only writes
//! files inside its own package directory.
//!
//! In [`RunMode::Fix`], each failing fixable check is fixed and then
//! validated again; the result records whether the fix converged.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

use super::{Check, CheckContext, CheckError, CheckMessage, CheckRegistry};
use crate::core::config::{ConfigError, ProjectConfig};
use crate::core::graph::Package;
use crate::core::types::PackageName;

/// Whether failing checks are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Validate only.
    Check,
    /// Validate, fix what is fixable, validate again.
    Fix,
}

/// Outcome of a fix attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum FixOutcome {
    /// The check passes after the fix.
    Converged,
    /// The fix ran but the check still fails.
    NotConverged,
    /// The fix returned an error; files were left unchanged.
    Failed(String),
}

/// Result of one check against one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub check: String,
    pub package: PackageName,
    /// Package directory relative to the workspace root.
    pub path: String,
    /// Final state, after any fix.
    pub passed: bool,
    pub fixable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixOutcome>,
    /// Present when the check still fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<CheckMessage>,
}

/// Runs registered checks according to the project config.
#[derive(Debug, Clone)]
pub struct CheckEngine {
    registry: Arc<CheckRegistry>,
    config: Arc<ProjectConfig>,
    root: PathBuf,
}

impl CheckEngine {
    /// Create an engine for the workspace at `root`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCheck` if the config binds a check
    /// that is not registered.
    pub fn new(
        registry: CheckRegistry,
        config: ProjectConfig,
        root: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        config.validate_checks(registry.names())?;
        Ok(Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
            root: root.into(),
        })
    }

    /// Checks that apply to `package`, ordered by name.
    pub fn checks_for(&self, package: &Package) -> Vec<Arc<dyn Check>> {
        match self.config.checks_for(&package.tags) {
            None => self.registry.iter().cloned().collect(),
            Some(names) => names
                .into_iter()
                .filter_map(|name| self.registry.get(name).cloned())
                .collect(),
        }
    }

    /// Validate every package.
    pub async fn run<'a>(
        &self,
        packages: impl IntoIterator<Item = &'a Package>,
    ) -> Result<Vec<CheckResult>, CheckError> {
        self.execute(packages, RunMode::Check).await
    }

    /// Validate every package and fix what can be fixed.
    pub async fn apply_fixes<'a>(
        &self,
        packages: impl IntoIterator<Item = &'a Package>,
    ) -> Result<Vec<CheckResult>, CheckError> {
        self.execute(packages, RunMode::Fix).await
    }

    /// Run in the given mode.
    ///
    /// # Errors
    ///
    /// Fails only when a package task panics or is cancelled. Check and
    /// fix failures are reported in the results.
    pub async fn execute<'a>(
        &self,
        packages: impl IntoIterator<Item = &'a Package>,
        mode: RunMode,
    ) -> Result<Vec<CheckResult>, CheckError> {
        let mut tasks = JoinSet::new();
        let mut seen = BTreeSet::new();

        for package in packages {
            if !seen.insert(package.name.clone()) {
                continue;
            }
            let checks = self.checks_for(package);
            if checks.is_empty() {
                continue;
            }
            let ctx = CheckContext::new(self.root.clone(), Arc::new(package.clone()));
            tasks.spawn(run_package(ctx, checks, mode));
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let package_results = joined.map_err(|e| CheckError::TaskFailed(e.to_string()))?;
            results.extend(package_results);
        }

        results.sort_by(|a, b| (&a.package, &a.check).cmp(&(&b.package, &b.check)));
        Ok(results)
    }
}

async fn run_package(
    ctx: CheckContext,
    checks: Vec<Arc<dyn Check>>,
    mode: RunMode,
) -> Vec<CheckResult> {
    let mut results = Vec::with_capacity(checks.len());
    for check in checks {
        results.push(run_check(&ctx, check.as_ref(), mode).await);
    }
    results
}

async fn run_check(ctx: &CheckContext, check: &dyn Check, mode: RunMode) -> CheckResult {
    let package = ctx.package();
    let mut passed = check.validate(ctx).await;
    let mut fixable = false;
    let mut fix = None;

    if !passed {
        fixable = check.can_fix(ctx).await;
        if fixable && mode == RunMode::Fix {
            let outcome = match check.fix(ctx).await {
                Ok(()) => {
                    passed = check.validate(ctx).await;
                    if passed {
                        FixOutcome::Converged
                    } else {
                        FixOutcome::NotConverged
                    }
                }
                Err(e) => {
                    log::warn!("{}: {} fix failed: {}", package.name, check.name(), e);
                    FixOutcome::Failed(e.to_string())
                }
            };
            log::debug!("{}: {} fix {:?}", package.name, check.name(), outcome);
            fix = Some(outcome);
        }
    }

    let message = if passed {
        None
    } else {
        Some(check.message(ctx).await)
    };

    CheckResult {
        check: check.name().to_string(),
        package: package.name.clone(),
        path: package.path.clone(),
        passed,
        fixable,
        fix,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::tests::package;
    use crate::core::types::Tag;
    use async_trait::async_trait;

    struct Tagged;

    #[async_trait]
    impl Check for Tagged {
        fn name(&self) -> &'static str {
            "test/tagged"
        }

        async fn validate(&self, ctx: &CheckContext) -> bool {
            !ctx.package().tags.is_empty()
        }

        async fn message(&self, _ctx: &CheckContext) -> CheckMessage {
            CheckMessage::title("Package must be tagged")
        }
    }

    struct AlwaysPasses;

    #[async_trait]
    impl Check for AlwaysPasses {
        fn name(&self) -> &'static str {
            "test/passes"
        }

        async fn validate(&self, _ctx: &CheckContext) -> bool {
            true
        }

        async fn message(&self, _ctx: &CheckContext) -> CheckMessage {
            CheckMessage::title("unreachable")
        }
    }

    fn registry() -> CheckRegistry {
        let mut registry = CheckRegistry::new();
        registry.register(Arc::new(Tagged));
        registry.register(Arc::new(AlwaysPasses));
        registry
    }

    #[tokio::test]
    async fn runs_every_check_without_bindings() {
        let engine = CheckEngine::new(registry(), ProjectConfig::default(), "/repo").unwrap();
        let packages = vec![package("b", &[], &[]), package("a", &["ui"], &[])];

        let results = engine.run(&packages).await.unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].package.as_str(), "a");

        let failing: Vec<_> = results.iter().filter(|r| !r.passed).collect();
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].package.as_str(), "b");
        assert_eq!(failing[0].check, "test/tagged");
        assert!(!failing[0].fixable);
        assert_eq!(
            failing[0].message.as_ref().unwrap().title,
            "Package must be tagged"
        );
    }

    #[tokio::test]
    async fn bindings_select_checks() {
        let mut config = ProjectConfig::default();
        config
            .checks
            .insert(Tag::new("ui").unwrap(), vec!["test/tagged".into()]);
        let engine = CheckEngine::new(registry(), config, "/repo").unwrap();

        let packages = vec![package("a", &["ui"], &[]), package("b", &[], &[])];
        let results = engine.run(&packages).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].package.as_str(), "a");
    }

    #[test]
    fn unknown_binding_is_rejected() {
        let mut config = ProjectConfig::default();
        config.checks.insert(Tag::WILDCARD, vec!["test/missing".into()]);

        let err = CheckEngine::new(registry(), config, "/repo").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCheck { .. }));
    }

    #[tokio::test]
    async fn non_fixable_failure_in_fix_mode() {
        let engine = CheckEngine::new(registry(), ProjectConfig::default(), "/repo").unwrap();
        let packages = vec![package("a", &[], &[])];

        let results = engine.apply_fixes(&packages).await.unwrap();
        let tagged = results.iter().find(|r| r.check == "test/tagged").unwrap();
        assert!(!tagged.passed);
        assert!(tagged.fix.is_none());
    }
}
