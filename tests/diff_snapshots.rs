//! Snapshot tests for fix suggestions.

use serde_json::{json, Value};

use monoguard::diff::diff;

fn render(title: &str, before: Value, after: Value) -> String {
    format!("# {}\n{}", title, diff(&before, Some(&after)))
}

#[test]
fn repository_added() {
    insta::assert_snapshot!(
        "repository_added",
        render(
            "repository added",
            json!({ "name": "pkg-a", "version": "1.0.0" }),
            json!({
                "name": "pkg-a",
                "version": "1.0.0",
                "repository": "https://example.com/org/repo.git/packages/pkg-a"
            }),
        )
    );
}

#[test]
fn duplicate_dependency_removed() {
    insta::assert_snapshot!(
        "duplicate_dependency_removed",
        render(
            "duplicate dependency removed",
            json!({
                "name": "pkg-a",
                "dependencies": { "react": "^18.0.0", "lodash": "^4.0.0" },
                "devDependencies": { "react": "^18.0.0", "vitest": "^1.0.0" }
            }),
            json!({
                "name": "pkg-a",
                "dependencies": { "react": "^18.0.0", "lodash": "^4.0.0" },
                "devDependencies": { "vitest": "^1.0.0" }
            }),
        )
    );
}

#[test]
fn scalar_and_array_changes() {
    insta::assert_snapshot!(
        "scalar_and_array_changes",
        render(
            "scalar and array changes",
            json!({ "version": "1.0.0", "files": ["dist", "src"], "private": true }),
            json!({ "version": "1.1.0", "files": ["dist"], "private": true }),
        )
    );
}
