//! constrain command - Evaluate tag constraints over the package graph

use anyhow::{bail, Result};
use serde::Serialize;

use super::workspace::{load, FailureReport, WarningReport};
use crate::cli::Context;
use crate::constraints::{resolve, summarize, ConstraintSummary, Violation};
use crate::ui::output::{self, Verbosity};

#[derive(Serialize)]
struct ConstrainReport<'a> {
    violations: &'a [Violation],
    rules: Vec<ConstraintSummary>,
    failures: Vec<FailureReport>,
    warnings: Vec<WarningReport>,
}

/// Validate dependency constraints.
pub fn constrain(ctx: &Context) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(constrain_async(ctx))
}

async fn constrain_async(ctx: &Context) -> Result<()> {
    let verbosity = ctx.verbosity();
    let workspace = load(ctx).await?;
    let graph = &workspace.build.graph;
    let rules = &workspace.config.project.constraints;

    if rules.is_empty() && !ctx.json {
        output::print("No constraints configured", verbosity);
    }

    let violations = resolve(graph, rules);
    let summary = summarize(graph, rules, &violations);

    if ctx.json {
        output::json(&ConstrainReport {
            violations: &violations,
            rules: summary,
            failures: workspace.failure_reports(),
            warnings: workspace.warning_reports(),
        })?;
    } else {
        if verbosity == Verbosity::Debug {
            for rule in &summary {
                output::print(
                    format!(
                        "#{} {}: {} package(s), {} violation(s)",
                        rule.rule_key,
                        rule.rule,
                        rule.packages.len(),
                        rule.violations
                    ),
                    verbosity,
                );
            }
        }
        for violation in &violations {
            output::print(output::format_violation(violation), verbosity);
        }
    }

    if !violations.is_empty() {
        bail!("{} constraint violation(s)", violations.len());
    }
    if !workspace.build.failures.is_empty() {
        bail!(
            "{} package(s) could not be read",
            workspace.build.failures.len()
        );
    }

    if !ctx.json && !rules.is_empty() {
        output::print(
            format!("All dependencies satisfy {} constraint(s)", rules.len()),
            verbosity,
        );
    }
    Ok(())
}
