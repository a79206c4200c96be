//! checks::recommended::dependency_types
//!
//! A dependency name may appear in only one of `dependencies`,
//! `devDependencies` and `optionalDependencies`.
//!
//! # Fix
//!
//! 1. Names in both `devDependencies` and `optionalDependencies` are
//!    removed from `dependencies`.
//! 2. Names still in `dependencies` are removed from the other two.
//! 3. Names left in both `devDependencies` and `optionalDependencies`
//!    stay only in `devDependencies`.
//!
//! Maps emptied by the fix are dropped from the manifest. Key order of
//! everything else is preserved.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::load_manifest_object;
use crate::checks::{Check, CheckContext, CheckError, CheckMessage, MISSING_MANIFEST_TITLE};
use crate::core::manifest::MANIFEST_FILE;
use crate::diff::diff;

const DEPENDENCIES: &str = "dependencies";
const DEV_DEPENDENCIES: &str = "devDependencies";
const OPTIONAL_DEPENDENCIES: &str = "optionalDependencies";

/// Each dependency is declared in exactly one dependency map.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasUniqueDependencyTypes;

#[async_trait]
impl Check for HasUniqueDependencyTypes {
    fn name(&self) -> &'static str {
        "monoguard/has-unique-dependency-types"
    }

    async fn validate(&self, ctx: &CheckContext) -> bool {
        match ctx.package_json().get().await {
            Some(Value::Object(manifest)) => duplicated(&manifest).is_empty(),
            _ => false,
        }
    }

    async fn can_fix(&self, ctx: &CheckContext) -> bool {
        matches!(ctx.package_json().get().await, Some(Value::Object(_)))
    }

    async fn fix(&self, ctx: &CheckContext) -> Result<(), CheckError> {
        let manifest = load_manifest_object(ctx).await?;
        let expected = expected_manifest(&manifest);
        if expected != manifest {
            ctx.package_json().set(&Value::Object(expected)).await?;
        }
        Ok(())
    }

    async fn message(&self, ctx: &CheckContext) -> CheckMessage {
        let Some(Value::Object(manifest)) = ctx.package_json().get().await else {
            return CheckMessage::title(MISSING_MANIFEST_TITLE);
        };

        let expected = Value::Object(expected_manifest(&manifest));
        CheckMessage::title(
            "A dependency should only be in one of dependencies, devDependencies, or optionalDependencies",
        )
        .with_file(MANIFEST_FILE)
        .with_suggestion(diff(&Value::Object(manifest), Some(&expected)))
    }
}

fn dependency_map(manifest: &Map<String, Value>, field: &str) -> Map<String, Value> {
    manifest
        .get(field)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Names declared in more than one dependency map.
fn duplicated(manifest: &Map<String, Value>) -> BTreeSet<String> {
    let deps = dependency_map(manifest, DEPENDENCIES);
    let dev = dependency_map(manifest, DEV_DEPENDENCIES);
    let optional = dependency_map(manifest, OPTIONAL_DEPENDENCIES);

    deps.keys()
        .filter(|name| dev.contains_key(*name) || optional.contains_key(*name))
        .chain(dev.keys().filter(|name| optional.contains_key(*name)))
        .cloned()
        .collect()
}

/// The manifest with every dependency declared exactly once.
fn expected_manifest(manifest: &Map<String, Value>) -> Map<String, Value> {
    let mut deps = dependency_map(manifest, DEPENDENCIES);
    let mut dev = dependency_map(manifest, DEV_DEPENDENCIES);
    let mut optional = dependency_map(manifest, OPTIONAL_DEPENDENCIES);

    let in_dev_and_optional: BTreeSet<String> = dev
        .keys()
        .filter(|name| optional.contains_key(*name))
        .cloned()
        .collect();
    deps.retain(|name, _| !in_dev_and_optional.contains(name));

    dev.retain(|name, _| !deps.contains_key(name));
    optional.retain(|name, _| !deps.contains_key(name));
    optional.retain(|name, _| !dev.contains_key(name));

    let mut expected = manifest.clone();
    for (field, map) in [
        (DEPENDENCIES, deps),
        (DEV_DEPENDENCIES, dev),
        (OPTIONAL_DEPENDENCIES, optional),
    ] {
        let Some(Value::Object(current)) = manifest.get(field) else {
            continue;
        };
        if &map == current {
            continue;
        }
        if map.is_empty() {
            // retain keeps the order of the remaining keys
            expected.retain(|key, _| key != field);
        } else {
            expected.insert(field.to_string(), Value::Object(map));
        }
    }
    expected
}
