//! checks::recommended::repository
//!
//! A package's `repository` must extend the root's: the root URL with the
//! package's workspace-relative path appended. Both the string form and
//! the `{ "type", "url" }` object form are accepted; only the URL is
//! compared. Fixes write the root's form.

use async_trait::async_trait;
use serde_json::Value;

use super::load_manifest_object;
use crate::checks::{Check, CheckContext, CheckError, CheckMessage, MISSING_MANIFEST_TITLE};
use crate::core::manifest::MANIFEST_FILE;
use crate::diff::diff;

const TITLE: &str =
    "Package's repository property must extend the repository property at the root of your project.";

/// The package repository extends the root repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendsRepositoryField;

/// URL of a `repository` value in either form.
fn repository_url(value: &Value) -> Option<&str> {
    match value {
        Value::String(url) => Some(url.as_str()),
        Value::Object(object) => object.get("url").and_then(Value::as_str),
        _ => None,
    }
}

/// The repository value a package at `path` should declare.
fn expected_repository(root_repository: &Value, path: &str) -> Option<Value> {
    let root_url = repository_url(root_repository)?;
    let url = format!(
        "{}/{}",
        root_url.trim_end_matches('/'),
        path.trim_start_matches("./").trim_matches('/')
    );

    Some(match root_repository {
        Value::Object(object) => {
            let mut object = object.clone();
            object.insert("url".to_string(), Value::String(url));
            Value::Object(object)
        }
        _ => Value::String(url),
    })
}

impl ExtendsRepositoryField {
    /// The root's repository value, if it declares one.
    async fn root_repository(&self, ctx: &CheckContext) -> Option<Value> {
        let root = ctx.root_package_json().get().await?;
        root.get("repository").filter(|r| !r.is_null()).cloned()
    }

    /// The package manifest as it should be, or `None` if it already
    /// conforms.
    fn expected_manifest(&self, manifest: &Value, expected: &Value) -> Option<Value> {
        let current = manifest.get("repository").and_then(repository_url);
        if current.is_some() && current == repository_url(expected) {
            return None;
        }
        let mut fixed = manifest.clone();
        fixed
            .as_object_mut()?
            .insert("repository".to_string(), expected.clone());
        Some(fixed)
    }
}

#[async_trait]
impl Check for ExtendsRepositoryField {
    fn name(&self) -> &'static str {
        "monoguard/extends-repository-field"
    }

    async fn validate(&self, ctx: &CheckContext) -> bool {
        if ctx.is_root() {
            return true;
        }
        let Some(root_repository) = self.root_repository(ctx).await else {
            return true;
        };
        let Some(manifest) = ctx.package_json().get().await else {
            return false;
        };
        let Some(expected) = expected_repository(&root_repository, &ctx.package().path) else {
            return false;
        };

        let current = manifest.get("repository").and_then(repository_url);
        current.is_some() && current == repository_url(&expected)
    }

    async fn can_fix(&self, ctx: &CheckContext) -> bool {
        let Some(root_repository) = self.root_repository(ctx).await else {
            return false;
        };
        expected_repository(&root_repository, &ctx.package().path).is_some()
            && matches!(ctx.package_json().get().await, Some(Value::Object(_)))
    }

    async fn fix(&self, ctx: &CheckContext) -> Result<(), CheckError> {
        if ctx.is_root() {
            return Ok(());
        }
        let Some(root_repository) = self.root_repository(ctx).await else {
            return Ok(());
        };
        let Some(expected) = expected_repository(&root_repository, &ctx.package().path) else {
            return Err(CheckError::NotFixable(self.name().to_string()));
        };

        let manifest = Value::Object(load_manifest_object(ctx).await?);
        if let Some(fixed) = self.expected_manifest(&manifest, &expected) {
            ctx.package_json().set(&fixed).await?;
        }
        Ok(())
    }

    async fn message(&self, ctx: &CheckContext) -> CheckMessage {
        let Some(manifest) = ctx.package_json().get().await else {
            return CheckMessage::title(MISSING_MANIFEST_TITLE);
        };
        let message = CheckMessage::title(TITLE).with_file(MANIFEST_FILE);

        let expected = self
            .root_repository(ctx)
            .await
            .and_then(|root| expected_repository(&root, &ctx.package().path))
            .and_then(|expected| self.expected_manifest(&manifest, &expected));
        message.with_suggestion(diff(&manifest, expected.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::recommended::test_support::Fixture;
    use crate::diff::NO_CHANGES;
    use serde_json::json;

    const ROOT_URL: &str = "https://example.com/org/repo.git";

    #[tokio::test]
    async fn passes_without_root_repository() {
        let fixture = Fixture::new(&json!({}), Some(&json!({})));
        let ctx = fixture.context();

        assert!(ExtendsRepositoryField.validate(&ctx).await);
        assert!(!ExtendsRepositoryField.can_fix(&ctx).await);
    }

    #[tokio::test]
    async fn fails_without_package_repository() {
        let fixture = Fixture::new(&json!({"repository": ROOT_URL}), Some(&json!({})));
        assert!(!ExtendsRepositoryField.validate(&fixture.context()).await);
    }

    #[tokio::test]
    async fn passes_with_extended_repository() {
        let fixture = Fixture::new(
            &json!({"repository": ROOT_URL}),
            Some(&json!({"repository": format!("{ROOT_URL}/packages/pkg-a")})),
        );
        assert!(ExtendsRepositoryField.validate(&fixture.context()).await);
    }

    #[tokio::test]
    async fn fails_on_wrong_sub_path() {
        let fixture = Fixture::new(
            &json!({"repository": ROOT_URL}),
            Some(&json!({"repository": format!("{ROOT_URL}/packages/pkg-ab")})),
        );
        assert!(!ExtendsRepositoryField.validate(&fixture.context()).await);
    }

    #[tokio::test]
    async fn object_forms_compare_by_url() {
        let fixture = Fixture::new(
            &json!({"repository": {"type": "git", "url": ROOT_URL}}),
            Some(&json!({"repository": format!("{ROOT_URL}/packages/pkg-a")})),
        );
        let ctx = fixture.context();

        assert!(ExtendsRepositoryField.validate(&ctx).await);
        let message = ExtendsRepositoryField.message(&ctx).await;
        assert_eq!(message.title, TITLE);
        assert_eq!(message.suggestion.as_deref(), Some(NO_CHANGES));
    }

    #[tokio::test]
    async fn round_trip() {
        let fixture = Fixture::new(
            &json!({"name": "root", "repository": ROOT_URL}),
            Some(&json!({"name": "pkg-a"})),
        );
        let ctx = fixture.context();
        let check = ExtendsRepositoryField;

        let before = check.message(&ctx).await;
        assert_eq!(before.file_path.as_deref(), Some("package.json"));
        assert_eq!(
            before.suggestion.as_deref(),
            Some(
                "  Object {\n    \"name\": \"pkg-a\",\n+   \"repository\": \"https://example.com/org/repo.git/packages/pkg-a\",\n  }"
            )
        );

        assert!(check.can_fix(&ctx).await);
        check.fix(&ctx).await.unwrap();
        assert!(check.validate(&ctx).await);
        assert_eq!(
            fixture.package_json()["repository"],
            json!("https://example.com/org/repo.git/packages/pkg-a")
        );

        let after = check.message(&ctx).await;
        assert_eq!(after.suggestion.as_deref(), Some(NO_CHANGES));

        let bytes = fixture.package_json_bytes();
        check.fix(&ctx).await.unwrap();
        assert_eq!(fixture.package_json_bytes(), bytes);
    }

    #[tokio::test]
    async fn fix_uses_root_object_form() {
        let fixture = Fixture::new(
            &json!({"repository": {"type": "git", "url": ROOT_URL}}),
            Some(&json!({"name": "pkg-a", "repository": "https://elsewhere.example/repo"})),
        );
        let ctx = fixture.context();

        ExtendsRepositoryField.fix(&ctx).await.unwrap();
        assert_eq!(
            fixture.package_json()["repository"],
            json!({"type": "git", "url": format!("{ROOT_URL}/packages/pkg-a")})
        );
        assert!(ExtendsRepositoryField.validate(&ctx).await);
    }

    #[tokio::test]
    async fn missing_package_manifest() {
        let fixture = Fixture::new(&json!({"repository": ROOT_URL}), None);
        let ctx = fixture.context();

        assert!(!ExtendsRepositoryField.validate(&ctx).await);
        assert!(!ExtendsRepositoryField.can_fix(&ctx).await);
        assert_eq!(ExtendsRepositoryField.message(&ctx).await.title, MISSING_MANIFEST_TITLE);
    }
}
