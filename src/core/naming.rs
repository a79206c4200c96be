//! core::naming
//!
//! Package naming rules and validation.
//!
//! # Features
//!
//! - Validate a package name against npm's rules for new packages
//! - Suggest a normalized name for an invalid one

use thiserror::Error;

/// Maximum length npm accepts for a package name.
pub const MAX_NAME_LENGTH: usize = 214;

const RESERVED_NAMES: [&str; 2] = ["node_modules", "favicon.ico"];

/// Reasons a package name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("name cannot be empty")]
    Empty,

    #[error("name cannot be longer than {MAX_NAME_LENGTH} characters")]
    TooLong,

    #[error("name cannot contain leading or trailing spaces")]
    SurroundingWhitespace,

    #[error("name cannot start with '{0}'")]
    LeadingCharacter(char),

    #[error("name can no longer contain capital letters")]
    Uppercase,

    #[error("name can only contain URL-friendly characters")]
    NotUrlSafe,

    #[error("'{0}' is a reserved name")]
    Reserved(String),
}

/// Validate a package name.
///
/// Scoped names (`@scope/name`) are validated part by part.
///
/// # Example
///
/// ```
/// use monoguard::core::naming::{validate_package_name, NamingError};
///
/// assert!(validate_package_name("workspace-name").is_ok());
/// assert!(validate_package_name("@scope/pkg-a").is_ok());
/// assert_eq!(validate_package_name("workspace-namE"), Err(NamingError::Uppercase));
/// ```
pub fn validate_package_name(name: &str) -> Result<(), NamingError> {
    if name.is_empty() {
        return Err(NamingError::Empty);
    }
    if name.trim() != name {
        return Err(NamingError::SurroundingWhitespace);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(NamingError::TooLong);
    }
    if let Some(first @ ('.' | '_')) = name.chars().next() {
        return Err(NamingError::LeadingCharacter(first));
    }
    if RESERVED_NAMES.contains(&name.to_lowercase().as_str()) {
        return Err(NamingError::Reserved(name.to_string()));
    }
    if name.chars().any(|c| c.is_uppercase()) {
        return Err(NamingError::Uppercase);
    }

    match scoped_parts(name) {
        Some((scope, bare)) => {
            if scope.is_empty() || bare.is_empty() {
                return Err(NamingError::NotUrlSafe);
            }
            if !is_url_safe(scope) || !is_url_safe(bare) {
                return Err(NamingError::NotUrlSafe);
            }
            if let Some(first @ ('.' | '_')) = bare.chars().next() {
                return Err(NamingError::LeadingCharacter(first));
            }
        }
        None => {
            if !is_url_safe(name) {
                return Err(NamingError::NotUrlSafe);
            }
        }
    }

    Ok(())
}

/// Check whether a name is valid.
pub fn is_valid_package_name(name: &str) -> bool {
    validate_package_name(name).is_ok()
}

/// Split `@scope/name` into `("scope", "name")`.
fn scoped_parts(name: &str) -> Option<(&str, &str)> {
    name.strip_prefix('@')?.split_once('/')
}

/// Characters left untouched by `encodeURIComponent`, minus the ones npm
/// rejects for new packages (`~'!()*`).
fn is_url_safe(part: &str) -> bool {
    part.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Suggest a valid package name derived from an invalid one.
///
/// Returns `None` when nothing usable is left after normalization.
///
/// # Example
///
/// ```
/// use monoguard::core::naming::suggest_package_name;
///
/// assert_eq!(suggest_package_name("Workspace Name").as_deref(), Some("workspace-name"));
/// assert_eq!(suggest_package_name("@Scope/My_Pkg").as_deref(), Some("@scope/my_pkg"));
/// assert_eq!(suggest_package_name("!!!"), None);
/// ```
pub fn suggest_package_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    let suggestion = match scoped_parts(trimmed) {
        Some((scope, bare)) => {
            let scope = slugify(scope);
            let bare = slugify(bare);
            if scope.is_empty() || bare.is_empty() {
                return None;
            }
            format!("@{scope}/{bare}")
        }
        None => slugify(trimmed),
    };

    if suggestion.is_empty() || !is_valid_package_name(&suggestion) {
        return None;
    }
    Some(suggestion)
}

/// Lowercase, collapse separators to `-`, drop everything else, and strip
/// leading `.`/`_`.
fn slugify(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
                c.to_ascii_lowercase()
            } else if c == ' ' || c == '-' || c == '/' {
                '-'
            } else {
                // Skip invalid characters
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .trim_start_matches(['.', '_'])
        .chars()
        .take(MAX_NAME_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_scoped() {
        assert!(is_valid_package_name("workspace-name"));
        assert!(is_valid_package_name("pkg.js"));
        assert!(is_valid_package_name("@scope/pkg-a"));
        assert!(is_valid_package_name("a_b"));
    }

    #[test]
    fn rejects_uppercase() {
        assert_eq!(
            validate_package_name("workspace-namE"),
            Err(NamingError::Uppercase)
        );
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!(validate_package_name(""), Err(NamingError::Empty));
        assert_eq!(
            validate_package_name(" pkg"),
            Err(NamingError::SurroundingWhitespace)
        );
    }

    #[test]
    fn rejects_leading_dot_or_underscore() {
        assert_eq!(
            validate_package_name(".pkg"),
            Err(NamingError::LeadingCharacter('.'))
        );
        assert_eq!(
            validate_package_name("_pkg"),
            Err(NamingError::LeadingCharacter('_'))
        );
        assert_eq!(
            validate_package_name("@scope/.pkg"),
            Err(NamingError::LeadingCharacter('.'))
        );
    }

    #[test]
    fn rejects_special_characters() {
        assert_eq!(validate_package_name("pkg!"), Err(NamingError::NotUrlSafe));
        assert_eq!(validate_package_name("pkg a"), Err(NamingError::NotUrlSafe));
        assert_eq!(validate_package_name("a/b"), Err(NamingError::NotUrlSafe));
        assert_eq!(validate_package_name("@scope/"), Err(NamingError::NotUrlSafe));
    }

    #[test]
    fn rejects_reserved_and_long_names() {
        assert!(matches!(
            validate_package_name("node_modules"),
            Err(NamingError::Reserved(_))
        ));
        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert_eq!(validate_package_name(&long), Err(NamingError::TooLong));
    }

    #[test]
    fn suggestion_is_valid() {
        assert_eq!(
            suggest_package_name("My Cool Package!").as_deref(),
            Some("my-cool-package")
        );
        assert_eq!(suggest_package_name("_private").as_deref(), Some("private"));
        assert_eq!(suggest_package_name(""), None);
    }
}
