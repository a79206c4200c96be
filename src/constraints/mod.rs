//! constraints
//!
//! Tag-scoped dependency constraints.
//!
//! # Resolution
//!
//! For every edge whose target is a workspace package:
//!
//! 1. Gather the applicable rule keys: each tag on the source package
//!    that has a rule, plus `*` when a wildcard rule exists. No keys
//!    means the edge is unconstrained.
//! 2. Evaluate each applicable rule against the target on its own.
//!    Rules are never merged.
//! 3. The edge violates if any applicable rule fails. Each failing rule
//!    produces one [`Violation`].
//!
//! External edges are skipped: there are no tags to test.
//!
//! Violations are data. Resolution never fails.
//!
//! # Example
//!
//! ```
//! use monoguard::constraints::{resolve, RuleSet};
//! use monoguard::core::graph::PackageGraph;
//!
//! let rules: RuleSet = serde_json::from_str(r#"{"*": {"allow": "*"}}"#).unwrap();
//! let graph = PackageGraph::new();
//! assert!(resolve(&graph, &rules).is_empty());
//! ```

mod rules;

pub use rules::{ConstraintRule, RawRule, RawSelector, RuleError, RuleSet, TagSelector};

use serde::Serialize;
use std::fmt;

use crate::core::graph::{Package, PackageGraph};
use crate::core::types::{DependencyKind, PackageName, Tag};

/// A dependency edge that fails an applicable rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// The depending package.
    pub source: PackageName,
    /// The depended-upon package.
    pub target: PackageName,
    pub kind: DependencyKind,
    /// Key of the failing rule (a tag, or `*`).
    pub rule_key: Tag,
    /// Body of the failing rule.
    pub rule: ConstraintRule,
    /// Tags the target carries, for reporting.
    pub target_tags: Vec<Tag>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({}): rule #{} ({}) rejects target",
            self.source, self.target, self.kind, self.rule_key, self.rule
        )?;
        if self.target_tags.is_empty() {
            write!(f, " with no tags")
        } else {
            let tags: Vec<String> = self.target_tags.iter().map(|t| format!("#{t}")).collect();
            write!(f, " tagged {}", tags.join(", "))
        }
    }
}

/// Keys of the rules that apply to `package`, in evaluation order.
///
/// Specific tags come first (sorted), followed by `*` when present.
pub fn applicable_rules<'r>(
    package: &Package,
    rules: &'r RuleSet,
) -> Vec<(&'r Tag, &'r ConstraintRule)> {
    let mut applicable: Vec<(&Tag, &ConstraintRule)> = rules
        .iter()
        .filter(|(key, _)| !key.is_wildcard() && package.tags.contains(*key))
        .collect();

    if let Some((key, rule)) = rules.iter().find(|(key, _)| key.is_wildcard()) {
        applicable.push((key, rule));
    }

    applicable
}

/// Evaluate `rules` against every resolved edge of `graph`.
///
/// Results are ordered by source, target, kind and rule key.
pub fn resolve(graph: &PackageGraph, rules: &RuleSet) -> Vec<Violation> {
    let mut violations = Vec::new();
    if rules.is_empty() {
        return violations;
    }

    for (edge, from, to) in graph.resolved_edges() {
        let applicable = applicable_rules(from, rules);
        if applicable.is_empty() {
            continue;
        }

        for (key, rule) in applicable {
            if rule.permits(&to.tags) {
                continue;
            }
            log::debug!(
                "{} -> {} ({}) fails rule #{}",
                from.name,
                to.name,
                edge.kind,
                key
            );
            violations.push(Violation {
                source: from.name.clone(),
                target: to.name.clone(),
                kind: edge.kind,
                rule_key: key.clone(),
                rule: rule.clone(),
                target_tags: to.tags.iter().cloned().collect(),
            });
        }
    }

    violations.sort_by(|a, b| {
        (&a.source, &a.target, a.kind, &a.rule_key).cmp(&(&b.source, &b.target, b.kind, &b.rule_key))
    });
    violations
}

/// Per-rule summary of a resolution run, for reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintSummary {
    pub rule_key: Tag,
    pub rule: ConstraintRule,
    /// Packages the rule applies to.
    pub packages: Vec<PackageName>,
    pub violations: usize,
}

/// Summarize which packages each rule applies to and how often it fails.
pub fn summarize(graph: &PackageGraph, rules: &RuleSet, violations: &[Violation]) -> Vec<ConstraintSummary> {
    rules
        .iter()
        .map(|(key, rule)| ConstraintSummary {
            rule_key: key.clone(),
            rule: rule.clone(),
            packages: graph
                .packages()
                .filter(|p| key.is_wildcard() || p.tags.contains(key))
                .map(|p| p.name.clone())
                .collect(),
            violations: violations.iter().filter(|v| &v.rule_key == key).count(),
        })
        .collect()
}
