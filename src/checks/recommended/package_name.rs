//! checks::recommended::package_name

use async_trait::async_trait;
use serde_json::Value;

use crate::checks::{Check, CheckContext, CheckMessage, MISSING_MANIFEST_TITLE};
use crate::core::manifest::MANIFEST_FILE;
use crate::core::naming::{suggest_package_name, validate_package_name};
use crate::diff::diff;

/// The package name must be a valid npm package name.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasValidPackageName;

#[async_trait]
impl Check for HasValidPackageName {
    fn name(&self) -> &'static str {
        "monoguard/has-valid-package-name"
    }

    async fn validate(&self, ctx: &CheckContext) -> bool {
        let Some(manifest) = ctx.package_json().get().await else {
            return false;
        };
        manifest
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| validate_package_name(name).is_ok())
    }

    async fn message(&self, ctx: &CheckContext) -> CheckMessage {
        let Some(manifest) = ctx.package_json().get().await else {
            return CheckMessage::title(MISSING_MANIFEST_TITLE);
        };

        let Some(name) = manifest.get("name").and_then(Value::as_str) else {
            return CheckMessage::title("Package must have a name").with_file(MANIFEST_FILE);
        };

        let title = match validate_package_name(name) {
            Ok(()) => return CheckMessage::title("Package name is valid").with_file(MANIFEST_FILE),
            Err(e) => format!("Package name must be valid: {e}"),
        };
        let message = CheckMessage::title(title).with_file(MANIFEST_FILE);

        match suggest_package_name(name) {
            Some(suggestion) => {
                let mut expected = manifest.clone();
                expected["name"] = Value::String(suggestion);
                message.with_suggestion(diff(&manifest, Some(&expected)))
            }
            None => message,
        }
    }
}
