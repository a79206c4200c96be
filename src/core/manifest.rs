//! core::manifest
//!
//! Package manifest and package-level config reading.
//!
//! # Files
//!
//! - `package.json` - required; must declare a non-empty `name`
//! - `commonality.json` - optional; `{ "tags": [...] }`
//!
//! # Degradation
//!
//! Only a missing or unparsable manifest, or one without a name, is an
//! error. Malformed dependency maps and package configs degrade to empty
//! values and are reported as warnings.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::files::{FileError, JsonFile};
use super::types::{Dependency, DependencyKind, PackageName, Tag};

/// Manifest file name.
pub const MANIFEST_FILE: &str = "package.json";

/// Package-level config file name.
pub const PACKAGE_CONFIG_FILE: &str = "commonality.json";

/// Errors from reading a package manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error("manifest '{}' is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("manifest '{}' is missing a 'name' field", path.display())]
    MissingName { path: PathBuf },
}

/// A non-fatal problem found while reading a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestWarning {
    /// The file the warning refers to.
    pub path: PathBuf,
    /// What was wrong.
    pub message: String,
}

/// A parsed `package.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: PackageName,
    pub version: String,
    pub dependencies: Vec<Dependency>,
    pub dev_dependencies: Vec<Dependency>,
    pub peer_dependencies: Vec<Dependency>,
    pub optional_dependencies: Vec<Dependency>,
}

impl Manifest {
    /// Dependencies of the given edge kind.
    pub fn dependencies_of(&self, kind: DependencyKind) -> &[Dependency] {
        match kind {
            DependencyKind::Production => &self.dependencies,
            DependencyKind::Development => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
        }
    }

    /// Names across production, development and peer dependencies.
    pub fn all_dependency_names(&self) -> impl Iterator<Item = &str> {
        DependencyKind::ALL
            .into_iter()
            .flat_map(move |kind| self.dependencies_of(kind))
            .map(|d| d.name.as_str())
    }
}

/// Result of reading a manifest.
#[derive(Debug)]
pub struct ManifestLoad {
    pub manifest: Manifest,
    pub warnings: Vec<ManifestWarning>,
}

/// Read `<package_dir>/package.json`.
///
/// # Errors
///
/// Returns an error if the file is missing, unparsable, not an object, or
/// lacks a non-empty string `name`.
pub async fn read_manifest(package_dir: &Path) -> Result<ManifestLoad, ManifestError> {
    let file = JsonFile::new(package_dir, MANIFEST_FILE);
    let value = file.load().await?;
    parse_manifest(file.path(), &value)
}

/// Build a [`Manifest`] from an already parsed document.
pub fn parse_manifest(path: &Path, value: &Value) -> Result<ManifestLoad, ManifestError> {
    let object = value.as_object().ok_or_else(|| ManifestError::NotAnObject {
        path: path.to_path_buf(),
    })?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .and_then(|n| PackageName::new(n).ok())
        .ok_or_else(|| ManifestError::MissingName {
            path: path.to_path_buf(),
        })?;

    let mut warnings = Vec::new();
    let version = match object.get("version") {
        Some(Value::String(v)) => v.clone(),
        Some(_) => {
            warnings.push(ManifestWarning {
                path: path.to_path_buf(),
                message: "'version' is not a string".to_string(),
            });
            String::new()
        }
        None => String::new(),
    };

    let mut map = |field: &str| dependency_map(path, object, field, &mut warnings);
    let dependencies = map("dependencies");
    let dev_dependencies = map("devDependencies");
    let peer_dependencies = map("peerDependencies");
    let optional_dependencies = map("optionalDependencies");

    Ok(ManifestLoad {
        manifest: Manifest {
            name,
            version,
            dependencies,
            dev_dependencies,
            peer_dependencies,
            optional_dependencies,
        },
        warnings,
    })
}

/// Normalize a dependency map into entries, skipping malformed values.
fn dependency_map(
    path: &Path,
    object: &Map<String, Value>,
    field: &str,
    warnings: &mut Vec<ManifestWarning>,
) -> Vec<Dependency> {
    match object.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(entries)) => entries
            .iter()
            .filter_map(|(name, version)| match version.as_str() {
                Some(version) => Some(Dependency::new(name, version)),
                None => {
                    warnings.push(ManifestWarning {
                        path: path.to_path_buf(),
                        message: format!("'{field}.{name}' is not a version string"),
                    });
                    None
                }
            })
            .collect(),
        Some(_) => {
            warnings.push(ManifestWarning {
                path: path.to_path_buf(),
                message: format!("'{field}' is not an object"),
            });
            Vec::new()
        }
    }
}

/// A parsed `commonality.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageConfig {
    pub tags: BTreeSet<Tag>,
}

/// Result of reading a package config.
#[derive(Debug, Default)]
pub struct PackageConfigLoad {
    pub config: PackageConfig,
    pub warnings: Vec<ManifestWarning>,
}

/// Read `<package_dir>/commonality.json`.
///
/// Never fails: absence yields an empty tag set, malformed content yields
/// an empty tag set plus a warning.
pub async fn read_package_config(package_dir: &Path) -> PackageConfigLoad {
    let file = JsonFile::new(package_dir, PACKAGE_CONFIG_FILE);
    match file.load().await {
        Ok(value) => parse_package_config(file.path(), &value),
        Err(e) if e.is_not_found() => PackageConfigLoad::default(),
        Err(e) => PackageConfigLoad {
            config: PackageConfig::default(),
            warnings: vec![ManifestWarning {
                path: file.path().to_path_buf(),
                message: e.to_string(),
            }],
        },
    }
}

fn parse_package_config(path: &Path, value: &Value) -> PackageConfigLoad {
    let mut load = PackageConfigLoad::default();
    let warn = |message: String| ManifestWarning {
        path: path.to_path_buf(),
        message,
    };

    let Some(object) = value.as_object() else {
        load.warnings.push(warn("package config is not an object".into()));
        return load;
    };

    match object.get("tags") {
        None | Some(Value::Null) => {}
        Some(Value::Array(tags)) => {
            for tag in tags {
                match tag.as_str().map(Tag::new) {
                    Some(Ok(tag)) => {
                        load.config.tags.insert(tag);
                    }
                    Some(Err(e)) => load.warnings.push(warn(e.to_string())),
                    None => load.warnings.push(warn(format!("tag {tag} is not a string"))),
                }
            }
        }
        Some(_) => load.warnings.push(warn("'tags' is not an array".into())),
    }

    load
}
