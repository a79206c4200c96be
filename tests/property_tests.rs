//! Property-based tests for graph, constraints and fixes.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use monoguard::checks::recommended::HasUniqueDependencyTypes;
use monoguard::checks::{Check, CheckContext};
use monoguard::constraints::{resolve, RuleSet};
use monoguard::core::graph::{Package, PackageGraph};
use monoguard::core::naming::{is_valid_package_name, suggest_package_name};
use monoguard::core::types::{Dependency, PackageName, PackageType, Tag};

const TAGS: [&str; 4] = ["ui", "data", "utility", "config"];

fn package(index: usize, tags: &[usize], deps: &[usize]) -> Package {
    Package {
        name: PackageName::new(format!("pkg-{index}")).unwrap(),
        path: format!("packages/pkg-{index}"),
        version: "1.0.0".to_string(),
        package_type: PackageType::Node,
        tags: tags.iter().map(|t| Tag::new(TAGS[*t]).unwrap()).collect(),
        owners: Vec::new(),
        dependencies: deps
            .iter()
            .map(|d| Dependency::new(format!("pkg-{d}"), "*"))
            .collect(),
        dev_dependencies: Vec::new(),
        peer_dependencies: Vec::new(),
    }
}

/// Strategy for a set of packages with tags and intra-workspace deps.
fn packages() -> impl Strategy<Value = Vec<Package>> {
    (1usize..8).prop_flat_map(|count| {
        prop::collection::vec(
            (
                prop::collection::btree_set(0usize..TAGS.len(), 0..3),
                prop::collection::btree_set(0usize..count + 2, 0..4),
            ),
            count,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (tags, deps))| {
                    let tags: Vec<usize> = tags.into_iter().collect();
                    let deps: Vec<usize> = deps.into_iter().collect();
                    package(i, &tags, &deps)
                })
                .collect()
        })
    })
}

fn rules() -> RuleSet {
    serde_json::from_str(
        r#"{
            "*": {"allow": "*"},
            "ui": {"allow": ["ui", "utility", "config"]},
            "data": {"disallow": ["ui"]}
        }"#,
    )
    .unwrap()
}

/// Strategy for a dependency map over a small name alphabet.
fn dependency_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(
        prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string),
        Just("^1.0.0".to_string()),
        0..4,
    )
}

fn manifest(
    deps: &BTreeMap<String, String>,
    dev: &BTreeMap<String, String>,
    optional: &BTreeMap<String, String>,
) -> Value {
    let mut object = Map::new();
    object.insert("name".into(), json!("pkg-a"));
    for (field, map) in [
        ("dependencies", deps),
        ("devDependencies", dev),
        ("optionalDependencies", optional),
    ] {
        if !map.is_empty() {
            object.insert(field.into(), json!(map));
        }
    }
    Value::Object(object)
}

fn names(value: &Value, field: &str) -> BTreeSet<String> {
    value
        .get(field)
        .and_then(Value::as_object)
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

proptest! {
    #[test]
    fn graph_is_independent_of_input_order(packages in packages()) {
        let mut reversed = packages.clone();
        reversed.reverse();

        let a = PackageGraph::from_packages(packages).unwrap();
        let b = PackageGraph::from_packages(reversed).unwrap();

        prop_assert_eq!(a.edges(), b.edges());
        let names_a: Vec<_> = a.packages().map(|p| p.name.clone()).collect();
        let names_b: Vec<_> = b.packages().map(|p| p.name.clone()).collect();
        prop_assert_eq!(names_a, names_b);
    }

    #[test]
    fn violations_are_independent_of_input_order(packages in packages()) {
        let mut reversed = packages.clone();
        reversed.reverse();

        let a = PackageGraph::from_packages(packages).unwrap();
        let b = PackageGraph::from_packages(reversed).unwrap();

        prop_assert_eq!(resolve(&a, &rules()), resolve(&b, &rules()));
    }

    #[test]
    fn violations_only_on_resolved_edges(packages in packages()) {
        let graph = PackageGraph::from_packages(packages).unwrap();
        for violation in resolve(&graph, &rules()) {
            prop_assert!(graph.package(violation.target.as_str()).is_some());
        }
    }

    #[test]
    fn suggested_names_are_valid(name in "[ -~]{0,40}") {
        if let Some(suggestion) = suggest_package_name(&name) {
            prop_assert!(is_valid_package_name(&suggestion));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn unique_dependency_fix_converges(
        deps in dependency_map(),
        dev in dependency_map(),
        optional in dependency_map(),
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let package_dir = dir.path().join("packages/pkg-a");
        std::fs::create_dir_all(&package_dir).unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();

        let before = manifest(&deps, &dev, &optional);
        std::fs::write(package_dir.join("package.json"), before.to_string()).unwrap();

        let mut pkg = package(0, &[], &[]);
        pkg.path = "packages/pkg-a".into();
        let ctx = CheckContext::new(dir.path(), Arc::new(pkg));

        let rt = tokio::runtime::Runtime::new().unwrap();
        let check = HasUniqueDependencyTypes;

        rt.block_on(check.fix(&ctx)).unwrap();
        prop_assert!(rt.block_on(check.validate(&ctx)));

        let first = std::fs::read(package_dir.join("package.json")).unwrap();
        rt.block_on(check.fix(&ctx)).unwrap();
        let second = std::fs::read(package_dir.join("package.json")).unwrap();
        prop_assert_eq!(&first, &second);

        // Every name survives in exactly one map.
        let after: Value = serde_json::from_slice(&first).unwrap();
        let fields = ["dependencies", "devDependencies", "optionalDependencies"];
        let all_before: BTreeSet<String> =
            fields.iter().flat_map(|f| names(&before, f)).collect();
        for name in &all_before {
            let count = fields.iter().filter(|f| names(&after, f).contains(name)).count();
            prop_assert_eq!(count, 1, "{} appears in {} maps", name, count);
        }
    }
}
