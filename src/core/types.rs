//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`PackageName`] - Non-empty package name as declared in a manifest
//! - [`Tag`] - Free-form label attached to packages
//! - [`DependencyKind`] - Production, development, or peer relationship
//! - [`PackageType`] - Runtime kind inferred from declared dependencies
//! - [`Dependency`] - A single `{name, version}` manifest entry
//!
//! # Examples
//!
//! ```
//! use monoguard::core::types::{PackageName, Tag};
//!
//! let name = PackageName::new("@scope/pkg-a").unwrap();
//! assert_eq!(name.as_str(), "@scope/pkg-a");
//!
//! assert!(PackageName::new("").is_err());
//! assert!(Tag::WILDCARD.is_wildcard());
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("invalid tag: {0}")]
    InvalidTag(String),
}

/// A package name as declared in `package.json`.
///
/// The only structural requirement is that the name is non-empty and has
/// no surrounding whitespace. Whether the name follows npm naming rules is
/// a check (see [`crate::core::naming`]), not a graph invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Create a new package name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPackageName` if the name is empty or
    /// only whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypeError::InvalidPackageName(
                "package name cannot be empty".into(),
            ));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PackageName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.0
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tag attached to a package.
///
/// `*` is reserved and means "all packages" wherever it appears as a
/// constraint key or inside an allow/disallow list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(std::borrow::Cow<'static, str>);

impl Tag {
    /// The reserved wildcard tag.
    pub const WILDCARD: Tag = Tag(std::borrow::Cow::Borrowed("*"));

    /// Create a new tag.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTag` if the tag is empty or contains
    /// whitespace.
    pub fn new(tag: impl Into<String>) -> Result<Self, TypeError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(TypeError::InvalidTag("tag cannot be empty".into()));
        }
        if tag.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidTag(format!(
                "tag '{tag}' cannot contain whitespace"
            )));
        }
        Ok(Self(std::borrow::Cow::Owned(tag)))
    }

    /// Whether this is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.0 == "*"
    }

    /// Get the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Tag {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0.into_owned()
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyKind {
    /// Declared in `dependencies`
    Production,
    /// Declared in `devDependencies`
    Development,
    /// Declared in `peerDependencies`
    Peer,
}

impl DependencyKind {
    /// All kinds, in manifest order.
    pub const ALL: [DependencyKind; 3] = [
        DependencyKind::Production,
        DependencyKind::Development,
        DependencyKind::Peer,
    ];

    /// The manifest field that declares dependencies of this kind.
    pub fn manifest_field(&self) -> &'static str {
        match self {
            DependencyKind::Production => "dependencies",
            DependencyKind::Development => "devDependencies",
            DependencyKind::Peer => "peerDependencies",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Production => write!(f, "production"),
            DependencyKind::Development => write!(f, "development"),
            DependencyKind::Peer => write!(f, "peer"),
        }
    }
}

/// Runtime kind of a package, inferred from its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageType {
    Next,
    ReactNative,
    React,
    Vue,
    Angular,
    Svelte,
    /// Generic package with no recognised framework dependency.
    #[default]
    Node,
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PackageType::Next => "next",
            PackageType::ReactNative => "react-native",
            PackageType::React => "react",
            PackageType::Vue => "vue",
            PackageType::Angular => "angular",
            PackageType::Svelte => "svelte",
            PackageType::Node => "node",
        };
        write!(f, "{s}")
    }
}

/// A single entry of a dependency map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dependency {
    /// Name of the depended-upon package
    pub name: String,
    /// Version range as written in the manifest
    pub version: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}
