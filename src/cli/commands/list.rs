//! list command - Show workspace packages with tags and owners

use anyhow::Result;

use super::workspace::load;
use crate::cli::Context;
use crate::core::graph::Package;
use crate::ui::output;

/// List workspace packages.
pub fn list(ctx: &Context) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(list_async(ctx))
}

async fn list_async(ctx: &Context) -> Result<()> {
    let verbosity = ctx.verbosity();
    let workspace = load(ctx).await?;
    let packages: Vec<&Package> = workspace.build.graph.packages().collect();

    if ctx.json {
        output::json(&packages)?;
        return Ok(());
    }

    if packages.is_empty() {
        output::print("No packages found", verbosity);
        return Ok(());
    }
    for package in packages {
        output::print(output::format_package(package), verbosity);
    }
    Ok(())
}
