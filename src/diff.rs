//! diff
//!
//! Structural, line-oriented diff of two JSON values.
//!
//! # Format
//!
//! Objects render as `Object { ... }` with keys in sorted order, arrays as
//! `Array [ ... ]`. Each line carries a two-column marker: `+ ` added,
//! `- ` removed, two spaces unchanged. A changed scalar renders as a `-`
//! line followed by a `+` line. Identical inputs render as `No changes`.
//!
//! ```
//! use monoguard::diff::diff;
//! use serde_json::json;
//!
//! let before = json!({"name": "foo"});
//! let after = json!({"name": "foo", "private": true});
//! assert_eq!(
//!     diff(&before, Some(&after)),
//!     "  Object {\n    \"name\": \"foo\",\n+   \"private\": true,\n  }"
//! );
//! ```

use serde_json::Value;
use std::collections::BTreeSet;

/// Rendered when there is nothing to show.
pub const NO_CHANGES: &str = "No changes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Same,
    Added,
    Removed,
}

impl Mark {
    fn prefix(self) -> &'static str {
        match self {
            Mark::Same => "  ",
            Mark::Added => "+ ",
            Mark::Removed => "- ",
        }
    }
}

/// Diff `before` against `after`.
///
/// An absent `after` means no change is proposed.
pub fn diff(before: &Value, after: Option<&Value>) -> String {
    let Some(after) = after else {
        return NO_CHANGES.to_string();
    };
    if before == after {
        return NO_CHANGES.to_string();
    }

    let mut out = Lines::default();
    out.diff(0, None, before, after, false);
    out.lines.join("\n")
}

#[derive(Default)]
struct Lines {
    lines: Vec<String>,
}

impl Lines {
    fn push(&mut self, mark: Mark, depth: usize, text: &str) {
        self.lines
            .push(format!("{}{}{}", mark.prefix(), "  ".repeat(depth), text));
    }

    fn diff(&mut self, depth: usize, key: Option<&str>, before: &Value, after: &Value, comma: bool) {
        if before == after {
            self.render(Mark::Same, depth, key, before, comma);
            return;
        }

        let label = label(key);
        let comma = if comma { "," } else { "" };
        match (before, after) {
            (Value::Object(a), Value::Object(b)) => {
                self.push(Mark::Same, depth, &format!("{label}Object {{"));
                let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
                for k in keys {
                    match (a.get(k), b.get(k)) {
                        (Some(x), Some(y)) => self.diff(depth + 1, Some(k.as_str()), x, y, true),
                        (Some(x), None) => self.render(Mark::Removed, depth + 1, Some(k.as_str()), x, true),
                        (None, Some(y)) => self.render(Mark::Added, depth + 1, Some(k.as_str()), y, true),
                        (None, None) => {}
                    }
                }
                self.push(Mark::Same, depth, &format!("}}{comma}"));
            }
            (Value::Array(a), Value::Array(b)) => {
                self.push(Mark::Same, depth, &format!("{label}Array ["));
                for i in 0..a.len().max(b.len()) {
                    match (a.get(i), b.get(i)) {
                        (Some(x), Some(y)) => self.diff(depth + 1, None, x, y, true),
                        (Some(x), None) => self.render(Mark::Removed, depth + 1, None, x, true),
                        (None, Some(y)) => self.render(Mark::Added, depth + 1, None, y, true),
                        (None, None) => {}
                    }
                }
                self.push(Mark::Same, depth, &format!("]{comma}"));
            }
            _ => {
                self.render(Mark::Removed, depth, key, before, !comma.is_empty());
                self.render(Mark::Added, depth, key, after, !comma.is_empty());
            }
        }
    }

    fn render(&mut self, mark: Mark, depth: usize, key: Option<&str>, value: &Value, comma: bool) {
        let label = label(key);
        let comma = if comma { "," } else { "" };
        match value {
            Value::Object(map) if map.is_empty() => {
                self.push(mark, depth, &format!("{label}Object {{}}{comma}"));
            }
            Value::Object(map) => {
                self.push(mark, depth, &format!("{label}Object {{"));
                let keys: BTreeSet<&String> = map.keys().collect();
                for k in keys {
                    if let Some(v) = map.get(k) {
                        self.render(mark, depth + 1, Some(k.as_str()), v, true);
                    }
                }
                self.push(mark, depth, &format!("}}{comma}"));
            }
            Value::Array(items) if items.is_empty() => {
                self.push(mark, depth, &format!("{label}Array []{comma}"));
            }
            Value::Array(items) => {
                self.push(mark, depth, &format!("{label}Array ["));
                for item in items {
                    self.render(mark, depth + 1, None, item, true);
                }
                self.push(mark, depth, &format!("]{comma}"));
            }
            scalar => {
                self.push(mark, depth, &format!("{label}{scalar}{comma}"));
            }
        }
    }
}

fn label(key: Option<&str>) -> String {
    match key {
        Some(k) => format!("{}: ", Value::String(k.to_string())),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_and_absent() {
        let value = json!({"a": 1});
        assert_eq!(diff(&value, Some(&value.clone())), NO_CHANGES);
        assert_eq!(diff(&value, None), NO_CHANGES);
    }

    #[test]
    fn added_key() {
        let before = json!({"name": "foo"});
        let after = json!({"name": "foo", "repository": "https://github.com/npm/cli.git/packages/pkg-a"});

        assert_eq!(
            diff(&before, Some(&after)),
            [
                "  Object {",
                "    \"name\": \"foo\",",
                "+   \"repository\": \"https://github.com/npm/cli.git/packages/pkg-a\",",
                "  }",
            ]
            .join("\n")
        );
    }

    #[test]
    fn changed_scalar_is_remove_then_add() {
        let before = json!({"version": "1.0.0"});
        let after = json!({"version": "2.0.0"});

        assert_eq!(
            diff(&before, Some(&after)),
            "  Object {\n-   \"version\": \"1.0.0\",\n+   \"version\": \"2.0.0\",\n  }"
        );
    }

    #[test]
    fn keys_are_sorted() {
        let before = json!({"b": 1, "a": 1});
        let after = json!({"b": 2, "a": 1});
        let out = diff(&before, Some(&after));

        let a = out.find("\"a\"").unwrap();
        let b = out.find("\"b\"").unwrap();
        assert!(a < b);
    }

    #[test]
    fn nested_removal_renders_whole_subtree() {
        let before = json!({"dependencies": {"x": "1"}, "devDependencies": {"x": "1"}});
        let after = json!({"dependencies": {"x": "1"}});

        assert_eq!(
            diff(&before, Some(&after)),
            [
                "  Object {",
                "    \"dependencies\": Object {",
                "      \"x\": \"1\",",
                "    },",
                "-   \"devDependencies\": Object {",
                "-     \"x\": \"1\",",
                "-   },",
                "  }",
            ]
            .join("\n")
        );
    }

    #[test]
    fn arrays_by_index() {
        let before = json!(["a", "b"]);
        let after = json!(["a"]);

        assert_eq!(
            diff(&before, Some(&after)),
            "  Array [\n    \"a\",\n-   \"b\",\n  ]"
        );
    }

    #[test]
    fn type_change() {
        let before = json!({"repository": "x"});
        let after = json!({"repository": {}});

        assert_eq!(
            diff(&before, Some(&after)),
            "  Object {\n-   \"repository\": \"x\",\n+   \"repository\": Object {},\n  }"
        );
    }
}
