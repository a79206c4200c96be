//! checks::recommended::codeowner

use async_trait::async_trait;

use crate::checks::{Check, CheckContext, CheckMessage};

/// The package has at least one codeowner.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsureCodeowner;

#[async_trait]
impl Check for EnsureCodeowner {
    fn name(&self) -> &'static str {
        "monoguard/ensure-codeowner"
    }

    async fn validate(&self, ctx: &CheckContext) -> bool {
        !ctx.owners().is_empty()
    }

    async fn message(&self, ctx: &CheckContext) -> CheckMessage {
        CheckMessage::title("Package must have at least one codeowner").with_suggestion(format!(
            "Add a CODEOWNERS entry matching '/{}/'",
            ctx.package().path
        ))
    }
}
