//! core
//!
//! Core domain types, schemas, and workspace model for monoguard.
//!
//! # Modules
//!
//! - [`types`] - Strong types: PackageName, Tag, DependencyKind, etc.
//! - [`naming`] - npm package naming rules and validation
//! - [`files`] - Atomic JSON file access
//! - [`manifest`] - Package manifest and package config reading
//! - [`codeowners`] - CODEOWNERS parsing and owner resolution
//! - [`classify`] - Package type classification
//! - [`workspace`] - Workspace root and package discovery
//! - [`graph`] - Package graph representation and construction
//! - [`config`] - Project configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Graph construction is deterministic

pub mod classify;
pub mod codeowners;
pub mod config;
pub mod files;
pub mod graph;
pub mod manifest;
pub mod naming;
pub mod types;
pub mod workspace;
