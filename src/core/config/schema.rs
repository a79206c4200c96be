//! core::config::schema
//!
//! Project configuration schema.
//!
//! # Project Config
//!
//! Located at (in order of precedence):
//! 1. `monoguard.toml` at the workspace root (canonical)
//! 2. `.commonality/config.json` (compatibility)
//!
//! # Validation
//!
//! Rule bodies are validated while parsing (exactly one of `allow` /
//! `disallow`). Check bindings are validated against the check registry
//! once it is known.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::ConfigError;
use crate::constraints::RuleSet;
use crate::core::types::Tag;

/// Project configuration.
///
/// # Example
///
/// ```toml
/// [constraints."*"]
/// allow = "*"
///
/// [constraints.ui]
/// allow = ["ui", "utility", "config"]
///
/// [checks]
/// "*" = ["monoguard/has-valid-package-name"]
/// ui = ["monoguard/ensure-codeowner"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Hosted project identifier; carried for compatibility, unused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Tag-scoped dependency constraints.
    pub constraints: RuleSet,

    /// Checks bound to tags (or `*`). Empty means every registered check
    /// applies to every package.
    pub checks: BTreeMap<Tag, Vec<String>>,
}

impl ProjectConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for empty check names or
    /// duplicate bindings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (tag, names) in &self.checks {
            let mut seen = BTreeSet::new();
            for name in names {
                if name.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(format!(
                        "empty check name bound to '{tag}'"
                    )));
                }
                if !seen.insert(name.as_str()) {
                    return Err(ConfigError::InvalidValue(format!(
                        "check '{name}' bound to '{tag}' more than once"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validate check bindings against the registered check names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCheck` for the first unknown name.
    pub fn validate_checks<'a>(
        &self,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ConfigError> {
        let known: BTreeSet<&str> = known.into_iter().collect();
        for (tag, names) in &self.checks {
            if let Some(unknown) = names.iter().find(|n| !known.contains(n.as_str())) {
                return Err(ConfigError::UnknownCheck {
                    name: unknown.clone(),
                    tag: tag.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Names of the checks that apply to a package with `tags`.
    ///
    /// Returns `None` when no bindings are configured (all checks apply).
    pub fn checks_for(&self, tags: &BTreeSet<Tag>) -> Option<BTreeSet<&str>> {
        if self.checks.is_empty() {
            return None;
        }

        let selected = self
            .checks
            .iter()
            .filter(|(tag, _)| tag.is_wildcard() || tags.contains(*tag))
            .flat_map(|(_, names)| names.iter().map(String::as_str))
            .collect();
        Some(selected)
    }
}
