//! constraints::rules
//!
//! Constraint rule types.
//!
//! # Shape
//!
//! A rule is keyed by a tag (or `*`) and carries exactly one of `allow`
//! or `disallow`, each either `"*"` or a list of tags:
//!
//! ```toml
//! [constraints."*"]
//! allow = "*"
//!
//! [constraints.ui]
//! allow = ["ui", "utility", "config"]
//!
//! [constraints.deprecated]
//! disallow = "*"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::core::types::Tag;

/// Errors from rule validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("rule must declare exactly one of 'allow' or 'disallow', found both")]
    BothAllowAndDisallow,

    #[error("rule must declare exactly one of 'allow' or 'disallow', found neither")]
    Empty,

    #[error("expected \"*\" or a list of tags, found \"{0}\"")]
    InvalidSelector(String),

    #[error("invalid tag in rule: {0}")]
    InvalidTag(String),
}

/// Which tags a rule refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSelector {
    /// `"*"` - every package, tagged or not.
    Any,
    /// A specific set of tags.
    Tags(BTreeSet<Tag>),
}

impl TagSelector {
    /// Build a selector from a list; a `*` entry selects everything.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        let tags: BTreeSet<Tag> = tags.into_iter().collect();
        if tags.iter().any(Tag::is_wildcard) {
            TagSelector::Any
        } else {
            TagSelector::Tags(tags)
        }
    }

    /// Whether a package with `tags` is selected.
    pub fn matches(&self, tags: &BTreeSet<Tag>) -> bool {
        match self {
            TagSelector::Any => true,
            TagSelector::Tags(selected) => selected.iter().any(|t| tags.contains(t)),
        }
    }
}

impl fmt::Display for TagSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSelector::Any => write!(f, "*"),
            TagSelector::Tags(tags) => {
                let list: Vec<String> = tags.iter().map(|t| format!("#{t}")).collect();
                write!(f, "[{}]", list.join(", "))
            }
        }
    }
}

/// A single constraint rule body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub enum ConstraintRule {
    /// Dependencies must carry at least one selected tag.
    Allow(TagSelector),
    /// Dependencies must carry none of the selected tags.
    Disallow(TagSelector),
}

impl ConstraintRule {
    /// Whether a dependency carrying `target_tags` satisfies this rule.
    ///
    /// ```
    /// use monoguard::constraints::{ConstraintRule, TagSelector};
    /// use monoguard::core::types::Tag;
    /// use std::collections::BTreeSet;
    ///
    /// let untagged = BTreeSet::new();
    /// assert!(ConstraintRule::Allow(TagSelector::Any).permits(&untagged));
    /// assert!(!ConstraintRule::Disallow(TagSelector::Any).permits(&untagged));
    /// ```
    pub fn permits(&self, target_tags: &BTreeSet<Tag>) -> bool {
        match self {
            ConstraintRule::Allow(selector) => selector.matches(target_tags),
            ConstraintRule::Disallow(selector) => !selector.matches(target_tags),
        }
    }
}

impl fmt::Display for ConstraintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintRule::Allow(TagSelector::Any) => write!(f, "allow all packages"),
            ConstraintRule::Allow(selector) => write!(f, "allow only {selector}"),
            ConstraintRule::Disallow(TagSelector::Any) => write!(f, "disallow all packages"),
            ConstraintRule::Disallow(selector) => write!(f, "disallow {selector}"),
        }
    }
}

/// Wire form of a selector: `"*"` or `["tag", ...]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSelector {
    One(String),
    Many(Vec<String>),
}

/// Wire form of a rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allow: Option<RawSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disallow: Option<RawSelector>,
}

impl TryFrom<RawSelector> for TagSelector {
    type Error = RuleError;

    fn try_from(raw: RawSelector) -> Result<Self, Self::Error> {
        match raw {
            RawSelector::One(s) if s == "*" => Ok(TagSelector::Any),
            RawSelector::One(s) => Err(RuleError::InvalidSelector(s)),
            RawSelector::Many(list) => {
                let tags = list
                    .into_iter()
                    .map(|t| Tag::new(t).map_err(|e| RuleError::InvalidTag(e.to_string())))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TagSelector::from_tags(tags))
            }
        }
    }
}

impl From<TagSelector> for RawSelector {
    fn from(selector: TagSelector) -> Self {
        match selector {
            TagSelector::Any => RawSelector::One("*".to_string()),
            TagSelector::Tags(tags) => RawSelector::Many(tags.into_iter().map(String::from).collect()),
        }
    }
}

impl TryFrom<RawRule> for ConstraintRule {
    type Error = RuleError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        match (raw.allow, raw.disallow) {
            (Some(_), Some(_)) => Err(RuleError::BothAllowAndDisallow),
            (None, None) => Err(RuleError::Empty),
            (Some(allow), None) => Ok(ConstraintRule::Allow(allow.try_into()?)),
            (None, Some(disallow)) => Ok(ConstraintRule::Disallow(disallow.try_into()?)),
        }
    }
}

impl From<ConstraintRule> for RawRule {
    fn from(rule: ConstraintRule) -> Self {
        match rule {
            ConstraintRule::Allow(selector) => RawRule {
                allow: Some(selector.into()),
                disallow: None,
            },
            ConstraintRule::Disallow(selector) => RawRule {
                allow: None,
                disallow: Some(selector.into()),
            },
        }
    }
}

/// An immutable set of rules keyed by tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<Tag, ConstraintRule>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set from `(key, rule)` pairs.
    pub fn from_rules(rules: impl IntoIterator<Item = (Tag, ConstraintRule)>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// The rule for a key, if any.
    pub fn get(&self, key: &Tag) -> Option<&ConstraintRule> {
        self.rules.get(key)
    }

    /// The `*` rule, if any.
    pub fn wildcard(&self) -> Option<&ConstraintRule> {
        self.rules.get(&Tag::WILDCARD)
    }

    /// All rules, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &ConstraintRule)> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
