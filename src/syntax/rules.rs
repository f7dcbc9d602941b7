//! Pattern rules for syntax highlighting
//!
//! A language table is an ordered list of rules. `RuleDef` is the table
//! entry as written (in code or in a TOML file) and may be incomplete;
//! `Rule` is what the registry keeps after validating and compiling it.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use super::matcher::ReservedMask;
use crate::error::HighlightError;

/// Upper bound on the compiled program size of a single rule's regex
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Custom match function for rules a single regex cannot express.
///
/// Receives the whole text and the offsets already claimed in this pass,
/// returns byte ranges to tag. The engine drops anything it returns that is
/// empty, out of bounds, off a char boundary, or overlapping claimed text.
pub type Matcher = Arc<dyn Fn(&str, &ReservedMask) -> Vec<Range<usize>> + Send + Sync>;

/// A rule table entry, not yet validated
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleDef {
    /// Dot-scoped tag, e.g. `constant.numeric`
    pub name: Option<String>,
    /// Regex searched globally over the text
    pub pattern: Option<String>,
    /// Capture group index (as a string, for TOML keys) to nested tag
    pub captures: BTreeMap<String, String>,
    /// Used instead of `pattern` when present
    #[serde(skip)]
    pub matcher: Option<Matcher>,
}

impl RuleDef {
    /// Create a pattern rule entry
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            pattern: Some(pattern.to_string()),
            ..Default::default()
        }
    }

    /// Create a rule entry driven by a custom match function
    pub fn with_matcher<F>(name: &str, matcher: F) -> Self
    where
        F: Fn(&str, &ReservedMask) -> Vec<Range<usize>> + Send + Sync + 'static,
    {
        Self {
            name: Some(name.to_string()),
            matcher: Some(Arc::new(matcher)),
            ..Default::default()
        }
    }

    /// Builder: tag capture group `group` of every match with `tag`
    pub fn capture(mut self, group: usize, tag: &str) -> Self {
        self.captures.insert(group.to_string(), tag.to_string());
        self
    }

    /// Validate and compile this entry.
    ///
    /// `language` and `index` only label the error.
    pub fn compile(self, language: &str, index: usize) -> Result<Rule, HighlightError> {
        let malformed = |reason: String| HighlightError::MalformedRule {
            language: language.to_string(),
            index,
            reason,
        };

        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(malformed("missing name".to_string())),
        };

        let pattern = match (&self.matcher, self.pattern) {
            (Some(_), _) => None,
            (None, Some(source)) if !source.is_empty() => Some(
                RegexBuilder::new(&source)
                    .size_limit(REGEX_SIZE_LIMIT)
                    .build()
                    .map_err(|e| malformed(format!("invalid pattern: {e}")))?,
            ),
            (None, _) => return Err(malformed("missing pattern".to_string())),
        };

        let mut captures = Vec::with_capacity(self.captures.len());
        for (group, tag) in self.captures {
            let group: usize = group
                .parse()
                .map_err(|_| malformed(format!("capture key '{group}' is not a group index")))?;
            if group == 0 || tag.trim().is_empty() {
                return Err(malformed(format!("capture {group} needs a group > 0 and a tag")));
            }
            if let Some(regex) = &pattern {
                if group >= regex.captures_len() {
                    return Err(malformed(format!("pattern has no capture group {group}")));
                }
            }
            captures.push((group, tag));
        }
        captures.sort_by_key(|(group, _)| *group);

        Ok(Rule {
            name,
            pattern,
            matcher: self.matcher,
            captures,
        })
    }
}

impl fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDef")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("captures", &self.captures)
            .field("matcher", &self.matcher.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// A validated rule: a tag plus either a compiled regex or a custom matcher
pub struct Rule {
    name: String,
    pattern: Option<Regex>,
    matcher: Option<Matcher>,
    captures: Vec<(usize, String)>,
}

impl Rule {
    /// Tag assigned to this rule's matches
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled pattern, if this is not a custom-matcher rule
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Custom match function, if any
    pub fn matcher(&self) -> Option<&Matcher> {
        self.matcher.as_ref()
    }

    /// Capture group to nested tag pairs, ascending by group
    pub fn captures(&self) -> &[(usize, String)] {
        &self.captures
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("custom", &self.matcher.is_some())
            .field("captures", &self.captures)
            .finish()
    }
}
