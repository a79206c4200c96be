//! monoguard - dependency constraints and package checks for monorepos
//!
//! monoguard reads a multi-package workspace into a dependency graph and
//! evaluates two kinds of policy over it: tag-based dependency
//! constraints, and pluggable per-package checks that validate, fix, and
//! explain convention violations.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, dispatches)
//! - [`core`] - Domain types, manifests, CODEOWNERS, workspace and graph
//! - [`constraints`] - Tag constraint rules and resolution
//! - [`checks`] - Check contract, engine and recommended checks
//! - [`diff`] - Structural JSON diff used for fix suggestions
//! - [`ui`] - Output formatting
//!
//! # Invariants
//!
//! 1. Building the graph only reads files
//! 2. Constraint violations are data, never errors
//! 3. A check only writes files inside its own package, atomically
//! 4. Fixes are idempotent

pub mod checks;
pub mod cli;
pub mod constraints;
pub mod core;
pub mod diff;
pub mod ui;
