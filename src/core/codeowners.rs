//! core::codeowners
//!
//! Resolve package owners from a `CODEOWNERS` file.
//!
//! # Format
//!
//! Each non-blank line that does not start with `#` is a rule:
//!
//! ```text
//! <pattern> <owner> [<owner>...]
//! ```
//!
//! Patterns follow gitignore conventions. The last matching rule wins,
//! and a rule without owners clears ownership for the paths it matches.
//!
//! # Locations
//!
//! Searched in order: `.github/CODEOWNERS`, `CODEOWNERS`,
//! `docs/CODEOWNERS`. When none exists every path has no owners.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Candidate locations, relative to the workspace root.
pub const CODEOWNERS_LOCATIONS: [&str; 3] = [".github/CODEOWNERS", "CODEOWNERS", "docs/CODEOWNERS"];

/// Errors from loading a codeowners file.
#[derive(Debug, Error)]
pub enum CodeownersError {
    #[error("failed to read codeowners file '{}': {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A single ownership rule.
#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    matcher: GlobSet,
    owners: Vec<String>,
}

/// Parsed ownership rules.
#[derive(Debug, Clone, Default)]
pub struct Codeowners {
    rules: Vec<Rule>,
    source: Option<PathBuf>,
}

impl Codeowners {
    /// An empty rule set (no owners for any path).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the first codeowners file found under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error only if a file exists but cannot be read.
    pub fn load(root: &Path) -> Result<Self, CodeownersError> {
        for location in CODEOWNERS_LOCATIONS {
            let path = root.join(location);
            if !path.is_file() {
                continue;
            }
            let contents =
                std::fs::read_to_string(&path).map_err(|e| CodeownersError::ReadError {
                    path: path.clone(),
                    source: e,
                })?;
            let mut owners = Self::parse(&contents);
            log::debug!(
                "loaded {} codeowner rule(s) from {}",
                owners.rules.len(),
                path.display()
            );
            owners.source = Some(path);
            return Ok(owners);
        }

        log::debug!("no CODEOWNERS file under {}", root.display());
        Ok(Self::empty())
    }

    /// Parse codeowners file contents.
    ///
    /// Lines whose pattern cannot be compiled are skipped with a warning.
    ///
    /// # Example
    ///
    /// ```
    /// use monoguard::core::codeowners::Codeowners;
    ///
    /// let owners = Codeowners::parse("* @org/all\n/packages/ui/ @org/design\n");
    /// assert_eq!(owners.resolve_owners("packages/ui"), vec!["@org/design"]);
    /// assert_eq!(owners.resolve_owners("packages/data"), vec!["@org/all"]);
    /// ```
    pub fn parse(contents: &str) -> Self {
        let mut rules = Vec::new();

        for (index, line) in contents.lines().enumerate() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(pattern) = fields.next() else {
                continue;
            };
            let owners: Vec<String> = fields.map(str::to_string).collect();

            match compile(pattern) {
                Ok(matcher) => rules.push(Rule {
                    pattern: pattern.to_string(),
                    matcher,
                    owners,
                }),
                Err(e) => log::warn!(
                    "CODEOWNERS line {}: skipping pattern '{}': {}",
                    index + 1,
                    pattern,
                    e
                ),
            }
        }

        Self {
            rules,
            source: None,
        }
    }

    /// The file the rules were loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of parsed rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules were parsed.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Owners of a workspace-relative path.
    ///
    /// Returns the owners of the last matching rule, in file order, with
    /// duplicates removed.
    pub fn resolve_owners(&self, package_path: &str) -> Vec<String> {
        let path = normalize_path(package_path);

        let Some(rule) = self.rules.iter().rev().find(|r| r.matcher.is_match(&path)) else {
            return Vec::new();
        };
        log::trace!("'{}' owned via '{}'", path, rule.pattern);

        let mut owners: Vec<String> = Vec::with_capacity(rule.owners.len());
        for owner in &rule.owners {
            if !owners.contains(owner) {
                owners.push(owner.clone());
            }
        }
        owners
    }
}

fn strip_comment(line: &str) -> &str {
    // `\#` escapes a literal hash at the start of a pattern.
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #") {
        Some(index) => &line[..index],
        None => line,
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim_start_matches("./").trim_matches('/');
    path.to_string()
}

/// Translate a gitignore-style pattern into globs that match a path
/// and everything beneath it.
fn compile(pattern: &str) -> Result<GlobSet, globset::Error> {
    let pattern = pattern.strip_prefix('\\').unwrap_or(pattern);
    let anchored = pattern.starts_with('/');
    let trimmed = pattern.trim_matches('/');

    let mut builder = GlobSetBuilder::new();
    if trimmed.is_empty() || trimmed == "*" || trimmed == "**" {
        builder.add(Glob::new("**")?);
        return builder.build();
    }

    // A pattern with an inner slash is relative to the root.
    let base = if anchored || trimmed.contains('/') {
        trimmed.to_string()
    } else {
        format!("**/{trimmed}")
    };

    for glob in [base.clone(), format!("{base}/**")] {
        builder.add(GlobBuilder::new(&glob).literal_separator(true).build()?);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_resolves_nothing() {
        let owners = Codeowners::empty();
        assert!(owners.resolve_owners("packages/pkg-a").is_empty());
        assert!(owners.is_empty());
    }

    #[test]
    fn later_rules_override_earlier() {
        let owners = Codeowners::parse(
            "\
# default owners
*                   @org/everyone
/packages/          @org/packages
/packages/pkg-a/    @alice @bob
",
        );

        assert_eq!(owners.len(), 3);
        assert_eq!(owners.resolve_owners("packages/pkg-a"), vec!["@alice", "@bob"]);
        assert_eq!(owners.resolve_owners("packages/pkg-b"), vec!["@org/packages"]);
        assert_eq!(owners.resolve_owners("apps/web"), vec!["@org/everyone"]);
    }

    #[test]
    fn unanchored_name_matches_at_any_depth() {
        let owners = Codeowners::parse("docs @writers\n");
        assert_eq!(owners.resolve_owners("docs"), vec!["@writers"]);
        assert_eq!(owners.resolve_owners("packages/pkg-a/docs"), vec!["@writers"]);
        assert!(owners.resolve_owners("packages/pkg-a").is_empty());
    }

    #[test]
    fn glob_patterns() {
        let owners = Codeowners::parse("/apps/*/ @frontend\n/packages/**/internal @core\n");
        assert_eq!(owners.resolve_owners("apps/web"), vec!["@frontend"]);
        assert_eq!(
            owners.resolve_owners("packages/a/b/internal"),
            vec!["@core"]
        );
        assert!(owners.resolve_owners("packages/a").is_empty());
    }

    #[test]
    fn rule_without_owners_clears_ownership() {
        let owners = Codeowners::parse("* @org/everyone\n/packages/legacy\n");
        assert!(owners.resolve_owners("packages/legacy").is_empty());
        assert_eq!(owners.resolve_owners("packages/new"), vec!["@org/everyone"]);
    }

    #[test]
    fn path_normalization() {
        let owners = Codeowners::parse("/packages/pkg-a @alice\n");
        assert_eq!(owners.resolve_owners("./packages/pkg-a"), vec!["@alice"]);
        assert_eq!(owners.resolve_owners("packages/pkg-a/"), vec!["@alice"]);
    }

    #[test]
    fn inline_comments_and_dedup() {
        let owners = Codeowners::parse("/pkg @a @a @b # trailing comment\n");
        assert_eq!(owners.resolve_owners("pkg"), vec!["@a", "@b"]);
    }

    #[test]
    fn load_prefers_github_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".github")).unwrap();
        std::fs::write(dir.path().join(".github/CODEOWNERS"), "* @github\n").unwrap();
        std::fs::write(dir.path().join("CODEOWNERS"), "* @root\n").unwrap();

        let owners = Codeowners::load(dir.path()).unwrap();
        assert_eq!(owners.resolve_owners("anything"), vec!["@github"]);
        assert!(owners.source().unwrap().ends_with(".github/CODEOWNERS"));
    }

    #[test]
    fn load_without_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let owners = Codeowners::load(dir.path()).unwrap();
        assert!(owners.is_empty());
        assert!(owners.source().is_none());
    }
}
