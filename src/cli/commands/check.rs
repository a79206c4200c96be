//! check command - Run package checks, optionally fixing failures

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use super::workspace::{load, FailureReport, WarningReport};
use crate::checks::{CheckEngine, CheckRegistry, CheckResult, RunMode};
use crate::cli::Context;
use crate::core::graph::Package;
use crate::ui::output;

#[derive(Serialize)]
struct CheckReport<'a> {
    results: &'a [CheckResult],
    failures: Vec<FailureReport>,
    warnings: Vec<WarningReport>,
}

/// Run checks against the workspace.
pub fn check(ctx: &Context, fix: bool, package: Option<&str>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(check_async(ctx, fix, package))
}

async fn check_async(ctx: &Context, fix: bool, package: Option<&str>) -> Result<()> {
    let verbosity = ctx.verbosity();
    let workspace = load(ctx).await?;
    let graph = &workspace.build.graph;

    let engine = CheckEngine::new(
        CheckRegistry::recommended(),
        workspace.config.project.clone(),
        &workspace.root,
    )
    .context("Invalid check configuration")?;

    let packages: Vec<&Package> = match package {
        Some(name) => vec![graph
            .package(name)
            .with_context(|| format!("Package '{}' not found in workspace", name))?],
        None => graph.packages().collect(),
    };

    let mode = if fix { RunMode::Fix } else { RunMode::Check };
    let results = engine.execute(packages, mode).await?;

    if ctx.json {
        output::json(&CheckReport {
            results: &results,
            failures: workspace.failure_reports(),
            warnings: workspace.warning_reports(),
        })?;
    } else {
        for result in &results {
            if let Some(line) = output::format_check_result(result, verbosity) {
                output::print(line, verbosity);
            }
        }
        let fixed = results.iter().filter(|r| r.fix.is_some() && r.passed).count();
        if fixed > 0 {
            output::print(format!("Fixed {} issue(s)", fixed), verbosity);
        }
    }

    let failed = results.iter().filter(|r| !r.passed).count();
    let unreadable = workspace.build.failures.len();
    if failed > 0 || unreadable > 0 {
        bail!(
            "{} check(s) failed, {} package(s) could not be read",
            failed,
            unreadable
        );
    }

    if !ctx.json {
        output::print(
            format!("All checks passed for {} package(s)", graph.len()),
            verbosity,
        );
    }
    Ok(())
}
