//! core::graph
//!
//! Package graph representation and construction.
//!
//! # Architecture
//!
//! The package graph is a directed graph where:
//! - Nodes are workspace packages, keyed by name
//! - Edges point from a package to each dependency it declares, one edge
//!   per dependency kind (production, development, peer)
//! - Edges whose target is not a workspace package are kept as
//!   external edges
//!
//! # Invariants
//!
//! - Package names are unique
//! - Package paths are unique
//! - The graph is immutable once built
//!
//! # Construction
//!
//! [`GraphBuilder`] reads every package directory concurrently (one task
//! per package). A package whose manifest cannot be read, or has no name,
//! is left out of the graph and reported as a [`PackageFailure`]; the
//! rest of the workspace is still built.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

use super::classify::classify;
use super::codeowners::Codeowners;
use super::manifest::{read_manifest, read_package_config, ManifestError, ManifestWarning};
use super::types::{Dependency, DependencyKind, PackageName, PackageType, Tag};

/// Errors that prevent a graph from being assembled.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("package name '{name}' is declared by both '{first}' and '{second}'")]
    DuplicateName {
        name: PackageName,
        first: String,
        second: String,
    },

    #[error("package path '{0}' is listed more than once")]
    DuplicatePath(String),

    #[error("graph build task failed: {0}")]
    TaskFailed(String),
}

/// A workspace package.
///
/// Serializes to the package descriptor consumed by reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: PackageName,
    /// Directory relative to the workspace root, `/`-separated.
    pub path: String,
    pub version: String,
    #[serde(rename = "type")]
    pub package_type: PackageType,
    pub tags: BTreeSet<Tag>,
    pub owners: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub dev_dependencies: Vec<Dependency>,
    pub peer_dependencies: Vec<Dependency>,
}

impl Package {
    /// Dependencies of the given kind.
    pub fn dependencies_of(&self, kind: DependencyKind) -> &[Dependency] {
        match kind {
            DependencyKind::Production => &self.dependencies,
            DependencyKind::Development => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
        }
    }

    /// Whether the package carries at least one of `tags`.
    pub fn has_any_tag<'a>(&self, tags: impl IntoIterator<Item = &'a Tag>) -> bool {
        tags.into_iter().any(|t| self.tags.contains(t))
    }
}

/// Target of a dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "status", content = "name", rename_all = "snake_case")]
pub enum EdgeTarget {
    /// A package in the graph.
    Resolved(PackageName),
    /// A package outside the workspace (registry dependency).
    External(String),
}

impl EdgeTarget {
    /// The target's package name.
    pub fn name(&self) -> &str {
        match self {
            EdgeTarget::Resolved(name) => name.as_str(),
            EdgeTarget::External(name) => name,
        }
    }

    /// The resolved name, if the target is in the graph.
    pub fn resolved(&self) -> Option<&PackageName> {
        match self {
            EdgeTarget::Resolved(name) => Some(name),
            EdgeTarget::External(_) => None,
        }
    }
}

/// A dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DependencyEdge {
    pub from: PackageName,
    pub to: EdgeTarget,
    pub kind: DependencyKind,
    /// Version range as declared.
    pub version: String,
}

/// The package graph.
#[derive(Debug, Default)]
pub struct PackageGraph {
    packages: BTreeMap<PackageName, Package>,
    by_path: HashMap<String, PackageName>,
    edges: Vec<DependencyEdge>,
    dependents: HashMap<PackageName, BTreeSet<PackageName>>,
}

impl PackageGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a graph from packages.
    ///
    /// # Errors
    ///
    /// Returns an error if two packages share a name or a path.
    pub fn from_packages(packages: Vec<Package>) -> Result<Self, GraphError> {
        let mut graph = Self::new();

        for package in packages {
            if let Some(existing) = graph.packages.get(&package.name) {
                return Err(GraphError::DuplicateName {
                    name: package.name.clone(),
                    first: existing.path.clone(),
                    second: package.path.clone(),
                });
            }
            if graph.by_path.contains_key(&package.path) {
                return Err(GraphError::DuplicatePath(package.path.clone()));
            }
            graph
                .by_path
                .insert(package.path.clone(), package.name.clone());
            graph.packages.insert(package.name.clone(), package);
        }

        graph.materialize_edges();
        Ok(graph)
    }

    fn materialize_edges(&mut self) {
        let mut edges = Vec::new();

        for package in self.packages.values() {
            for kind in DependencyKind::ALL {
                for dependency in package.dependencies_of(kind) {
                    let to = match self.packages.get_key_value(dependency.name.as_str()) {
                        Some((name, _)) => EdgeTarget::Resolved(name.clone()),
                        None => EdgeTarget::External(dependency.name.clone()),
                    };
                    edges.push(DependencyEdge {
                        from: package.name.clone(),
                        to,
                        kind,
                        version: dependency.version.clone(),
                    });
                }
            }
        }

        edges.sort();
        edges.dedup_by(|a, b| a.from == b.from && a.to == b.to && a.kind == b.kind);

        for edge in &edges {
            if let Some(target) = edge.to.resolved() {
                self.dependents
                    .entry(target.clone())
                    .or_default()
                    .insert(edge.from.clone());
            }
        }
        self.edges = edges;
    }

    /// Get a package by name.
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Get a package by its workspace-relative path.
    pub fn package_at(&self, path: &str) -> Option<&Package> {
        self.by_path.get(path).and_then(|name| self.packages.get(name))
    }

    /// All packages, ordered by name.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the graph has no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// All edges, in a stable order.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Edges whose target is a workspace package.
    pub fn resolved_edges(&self) -> impl Iterator<Item = (&DependencyEdge, &Package, &Package)> {
        self.edges.iter().filter_map(|edge| {
            let from = self.packages.get(&edge.from)?;
            let to = self.packages.get(edge.to.resolved()?)?;
            Some((edge, from, to))
        })
    }

    /// Edges whose target lies outside the workspace.
    pub fn external_edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges
            .iter()
            .filter(|e| matches!(e.to, EdgeTarget::External(_)))
    }

    /// Outgoing edges of a package.
    pub fn edges_from<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DependencyEdge> {
        self.edges.iter().filter(move |e| e.from.as_str() == name)
    }

    /// Workspace packages that depend directly on `name`.
    pub fn dependents(&self, name: &str) -> Option<&BTreeSet<PackageName>> {
        self.dependents.get(name)
    }

    /// All workspace packages reachable from `name` (excluding itself).
    ///
    /// Uses breadth-first traversal over resolved edges of any kind.
    pub fn transitive_dependencies(&self, name: &str) -> HashSet<PackageName> {
        let mut result = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([name]);

        while let Some(current) = queue.pop_front() {
            for edge in self.edges_from(current) {
                if let Some(target) = edge.to.resolved() {
                    if target.as_str() != name && result.insert(target.clone()) {
                        queue.push_back(target.as_str());
                    }
                }
            }
        }

        result
    }
}

/// A package that could not be added to the graph.
#[derive(Debug)]
pub struct PackageFailure {
    /// Directory relative to the workspace root.
    pub path: String,
    pub error: ManifestError,
}

/// Result of building a graph.
#[derive(Debug)]
pub struct GraphBuild {
    pub graph: PackageGraph,
    pub failures: Vec<PackageFailure>,
    pub warnings: Vec<ManifestWarning>,
}

/// Builds a [`PackageGraph`] from package directories.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    root: PathBuf,
    codeowners: Arc<Codeowners>,
}

impl GraphBuilder {
    /// Create a builder for the workspace at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            codeowners: Arc::new(Codeowners::empty()),
        }
    }

    /// Resolve owners with the given rules.
    pub fn with_codeowners(mut self, codeowners: Arc<Codeowners>) -> Self {
        self.codeowners = codeowners;
        self
    }

    /// Read every package directory and assemble the graph.
    ///
    /// # Errors
    ///
    /// Returns an error only for graph-level problems (duplicate names or
    /// paths). Per-package read failures are collected in
    /// [`GraphBuild::failures`].
    pub async fn build(&self, package_dirs: &[String]) -> Result<GraphBuild, GraphError> {
        let mut seen = HashSet::new();
        for dir in package_dirs {
            if !seen.insert(dir.as_str()) {
                return Err(GraphError::DuplicatePath(dir.clone()));
            }
        }

        let mut tasks = JoinSet::new();
        for dir in package_dirs {
            let root = self.root.clone();
            let codeowners = Arc::clone(&self.codeowners);
            let dir = dir.clone();
            tasks.spawn(async move {
                let outcome = load_package(&root, &dir, &codeowners).await;
                (dir, outcome)
            });
        }

        let mut packages = Vec::new();
        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (dir, outcome) = joined.map_err(|e| GraphError::TaskFailed(e.to_string()))?;
            match outcome {
                Ok((package, package_warnings)) => {
                    packages.push(package);
                    warnings.extend(package_warnings);
                }
                Err(error) => {
                    log::debug!("skipping package at '{}': {}", dir, error);
                    failures.push(PackageFailure { path: dir, error });
                }
            }
        }

        packages.sort_by(|a, b| a.path.cmp(&b.path));
        failures.sort_by(|a, b| a.path.cmp(&b.path));
        warnings.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));

        for warning in &warnings {
            log::debug!("{}: {}", warning.path.display(), warning.message);
        }

        let graph = PackageGraph::from_packages(packages)?;
        log::debug!(
            "built graph with {} package(s) and {} edge(s)",
            graph.len(),
            graph.edges().len()
        );

        Ok(GraphBuild {
            graph,
            failures,
            warnings,
        })
    }
}

async fn load_package(
    root: &std::path::Path,
    dir: &str,
    codeowners: &Codeowners,
) -> Result<(Package, Vec<ManifestWarning>), ManifestError> {
    let package_dir = root.join(dir);
    let manifest_load = read_manifest(&package_dir).await?;
    let config_load = read_package_config(&package_dir).await;

    let manifest = manifest_load.manifest;
    let package_type = classify(manifest.all_dependency_names());
    let owners = codeowners.resolve_owners(dir);

    let mut warnings = manifest_load.warnings;
    warnings.extend(config_load.warnings);

    Ok((
        Package {
            name: manifest.name,
            path: dir.to_string(),
            version: manifest.version,
            package_type,
            tags: config_load.config.tags,
            owners,
            dependencies: manifest.dependencies,
            dev_dependencies: manifest.dev_dependencies,
            peer_dependencies: manifest.peer_dependencies,
        },
        warnings,
    ))
}
