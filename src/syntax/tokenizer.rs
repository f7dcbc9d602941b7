//! Tokenization: ordered rules to tagged spans
//!
//! Rules run in table order. Each one claims the text it matches, and
//! later rules never see claimed text again, so a table's order is its
//! priority list.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, trace, warn};

use super::matcher::{find_matches, ReservedMask};
use super::registry::Registry;
use super::rules::Rule;
use crate::error::{HighlightError, Result};

/// Default cap on input size
pub const DEFAULT_MAX_TEXT_LEN: usize = 1 << 20;
/// Default cap on spans produced by one pass
pub const DEFAULT_MAX_SPANS: usize = 100_000;

/// A tagged byte range of the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte offset where this span starts (inclusive)
    pub start: usize,
    /// Byte offset where this span ends (exclusive)
    pub end: usize,
    /// Dot-scoped tag of the rule that produced it
    pub tag: String,
    /// Tagged capture groups inside this span, ordered and disjoint
    pub children: Vec<Span>,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, tag: &str) -> Self {
        Self::with_children(start, end, tag, Vec::new())
    }

    /// Create a span with nested capture spans
    pub fn with_children(start: usize, end: usize, tag: &str, children: Vec<Span>) -> Self {
        Self {
            start,
            end,
            tag: tag.to_string(),
            children,
        }
    }

    /// Check if this span contains a byte position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Get the length of this span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The slice of `source` this span covers
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Bounds on the work done by one tokenization call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Longer input is returned untagged
    pub max_text_len: usize,
    /// Rules stop being applied once this many spans exist
    pub max_spans: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            max_spans: DEFAULT_MAX_SPANS,
        }
    }
}

/// Result of tokenizing one text: the text itself plus its spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'t> {
    text: &'t str,
    language: Option<String>,
    spans: Vec<Span>,
}

impl<'t> Tokens<'t> {
    /// Tokens with no spans: everything is plain text
    pub fn plain(text: &'t str) -> Self {
        Self {
            text,
            language: None,
            spans: Vec::new(),
        }
    }

    /// The original text
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Language the text was tokenized as, None for plain
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Top-level spans, sorted by start and pairwise disjoint
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn into_spans(self) -> Vec<Span> {
        self.spans
    }

    /// Check if no text was tagged
    pub fn is_plain(&self) -> bool {
        self.spans.is_empty()
    }

    /// Top-level span covering a byte position
    pub fn span_at(&self, pos: usize) -> Option<&Span> {
        let idx = self.spans.partition_point(|s| s.end <= pos);
        self.spans.get(idx).filter(|s| s.contains(pos))
    }
}

/// Tokenize `text` as `language`, degrading to plain text on any error.
///
/// An unknown language or oversized text gives zero spans, never a failure.
pub fn tokenize<'t>(registry: &Registry, language: &str, text: &'t str, limits: &Limits) -> Tokens<'t> {
    match try_tokenize(registry, language, text, limits) {
        Ok(tokens) => tokens,
        Err(err @ HighlightError::UnknownLanguage(_)) => {
            debug!(%err, "rendering as plain text");
            Tokens::plain(text)
        }
        Err(err) => {
            warn!(%err, "rendering as plain text");
            Tokens::plain(text)
        }
    }
}

/// Tokenize `text` as `language`, reporting why highlighting was not possible
pub fn try_tokenize<'t>(
    registry: &Registry,
    language: &str,
    text: &'t str,
    limits: &Limits,
) -> Result<Tokens<'t>> {
    if !registry.contains(language) {
        return Err(HighlightError::UnknownLanguage(language.to_string()));
    }
    if text.len() > limits.max_text_len {
        return Err(HighlightError::TextTooLarge {
            len: text.len(),
            max: limits.max_text_len,
        });
    }

    let rules = registry.resolve(language);
    let mut tokens = tokenize_with_rules(&rules, text, limits);
    tokens.language = Some(language.to_string());
    Ok(tokens)
}

/// Run an already resolved rule list over `text`
pub fn tokenize_with_rules<'t>(rules: &[Arc<Rule>], text: &'t str, limits: &Limits) -> Tokens<'t> {
    let mut mask = ReservedMask::new(text.len());
    let mut spans: Vec<Span> = Vec::new();

    'rules: for rule in rules {
        let found = find_matches(rule, text, &mask);
        trace!(rule = rule.name(), matches = found.len(), "applied rule");

        for span in found {
            if spans.len() >= limits.max_spans {
                warn!(
                    max_spans = limits.max_spans,
                    rule = rule.name(),
                    "span limit reached, remaining rules skipped"
                );
                break 'rules;
            }
            mask.reserve(span.start..span.end);
            spans.push(span);
        }
    }

    spans.sort_by_key(|s| s.start);

    Tokens {
        text,
        language: None,
        spans,
    }
}
