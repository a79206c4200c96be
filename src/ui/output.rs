//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use serde::Serialize;
use std::fmt::Display;

use crate::checks::CheckResult;
use crate::constraints::Violation;
use crate::core::graph::Package;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a value as pretty JSON (always shown).
pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format one package line for `list`.
pub fn format_package(package: &Package) -> String {
    let mut line = format!("{} ({}) {}", package.name, package.path, package.package_type);
    if !package.tags.is_empty() {
        let tags: Vec<String> = package.tags.iter().map(|t| format!("#{t}")).collect();
        line.push_str(&format!(" {}", tags.join(" ")));
    }
    if !package.owners.is_empty() {
        line.push_str(&format!(" [{}]", package.owners.join(", ")));
    }
    line
}

/// Format a failing (or fixed) check result.
///
/// Passing results without a fix are not shown and yield `None`.
pub fn format_check_result(result: &CheckResult, verbosity: Verbosity) -> Option<String> {
    use crate::checks::FixOutcome;

    let status = match (&result.fix, result.passed) {
        (Some(FixOutcome::Converged), _) => "fixed",
        (Some(FixOutcome::NotConverged), _) => "fix did not converge",
        (Some(FixOutcome::Failed(_)), _) => "fix failed",
        (None, true) => return None,
        (None, false) if result.fixable => "fail (fixable)",
        (None, false) => "fail",
    };

    let mut out = format!("{} {}: {}", result.package, result.check, status);
    if let Some(FixOutcome::Failed(e)) = &result.fix {
        out.push_str(&format!("\n  {e}"));
    }
    if let Some(message) = &result.message {
        out.push_str(&format!("\n  {}", message.title));
        if let Some(file) = &message.file_path {
            out.push_str(&format!("\n  in {}/{}", result.path, file));
        }
        if verbosity == Verbosity::Debug || result.fix.is_none() {
            if let Some(suggestion) = &message.suggestion {
                for line in suggestion.lines() {
                    out.push_str(&format!("\n    {line}"));
                }
            }
        }
    }
    Some(out)
}

/// Format a constraint violation.
pub fn format_violation(violation: &Violation) -> String {
    format!("violation: {violation}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckMessage, FixOutcome};
    use crate::core::types::PackageName;

    fn result(passed: bool, fix: Option<FixOutcome>) -> CheckResult {
        CheckResult {
            check: "monoguard/ensure-codeowner".into(),
            package: PackageName::new("pkg-a").unwrap(),
            path: "packages/pkg-a".into(),
            passed,
            fixable: false,
            fix,
            message: (!passed).then(|| CheckMessage::title("Package must have at least one codeowner")),
        }
    }

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn passing_results_are_hidden() {
        assert!(format_check_result(&result(true, None), Verbosity::Normal).is_none());
    }

    #[test]
    fn failing_result_shows_title() {
        let out = format_check_result(&result(false, None), Verbosity::Normal).unwrap();
        assert_eq!(
            out,
            "pkg-a monoguard/ensure-codeowner: fail\n  Package must have at least one codeowner"
        );
    }

    #[test]
    fn fixed_result() {
        let out = format_check_result(&result(true, Some(FixOutcome::Converged)), Verbosity::Normal)
            .unwrap();
        assert_eq!(out, "pkg-a monoguard/ensure-codeowner: fixed");
    }

    #[test]
    fn package_line() {
        let mut package = crate::core::graph::tests::package("pkg-a", &["ui", "data"], &[]);
        package.owners = vec!["@alice".into(), "@bob".into()];
        assert_eq!(
            format_package(&package),
            "pkg-a (packages/pkg-a) node #data #ui [@alice, @bob]"
        );
    }
}
