//! Rule matching against a partially claimed text
//!
//! Each rule only ever sees the text that higher-priority rules left
//! unclaimed. The regex is run gap by gap, with the haystack cut at the
//! end of the gap, so a match can never run into claimed text while
//! `\b` still sees the character before the gap. A match that ends at a
//! cut must also match from the same start in the whole text, so `\b` and
//! `$` never mistake the cut for the end of the text.

use std::ops::Range;

use regex::Regex;
use tracing::warn;

use super::rules::{Matcher, Rule};
use super::tokenizer::Span;
use crate::error::HighlightError;

/// Byte offsets of a text already claimed during one tokenization pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedMask {
    claimed: Vec<bool>,
}

impl ReservedMask {
    /// Create a mask with nothing claimed
    pub fn new(len: usize) -> Self {
        Self {
            claimed: vec![false; len],
        }
    }

    /// Length of the covered text in bytes
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Check if a byte offset is claimed. Offsets past the end count as claimed.
    pub fn is_reserved(&self, offset: usize) -> bool {
        self.claimed.get(offset).copied().unwrap_or(true)
    }

    /// Check that no offset in `range` is claimed
    pub fn is_free(&self, range: Range<usize>) -> bool {
        range.end <= self.claimed.len() && !self.claimed[range].iter().any(|&c| c)
    }

    /// Claim a range of offsets
    pub fn reserve(&mut self, range: Range<usize>) {
        let end = range.end.min(self.claimed.len());
        let start = range.start.min(end);
        self.claimed[start..end].iter_mut().for_each(|c| *c = true);
    }

    /// Maximal unclaimed ranges, in order
    pub fn gaps(&self) -> Vec<Range<usize>> {
        let mut gaps = Vec::new();
        let mut gap_start = None;
        for (offset, &claimed) in self.claimed.iter().enumerate() {
            match (claimed, gap_start) {
                (false, None) => gap_start = Some(offset),
                (true, Some(start)) => {
                    gaps.push(start..offset);
                    gap_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = gap_start {
            gaps.push(start..self.claimed.len());
        }
        gaps
    }
}

/// Find every match of `rule` in the unclaimed parts of `text`.
///
/// Matches come back ordered and never overlap each other or the mask.
pub fn find_matches(rule: &Rule, text: &str, mask: &ReservedMask) -> Vec<Span> {
    if let Some(matcher) = rule.matcher() {
        return custom_matches(rule, matcher, text, mask);
    }
    match rule.pattern() {
        Some(regex) => pattern_matches(rule, regex, text, mask),
        None => Vec::new(),
    }
}

fn pattern_matches(rule: &Rule, regex: &Regex, text: &str, mask: &ReservedMask) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut empty_matches = 0usize;
    let mut first_empty = None;

    for gap in mask.gaps() {
        let haystack = &text[..gap.end];
        let mut pos = gap.start;

        while pos < gap.end {
            let (start, end, children) = if rule.captures().is_empty() {
                match regex.find_at(haystack, pos) {
                    Some(m) => (m.start(), m.end(), Vec::new()),
                    None => break,
                }
            } else {
                match regex.captures_at(haystack, pos) {
                    Some(caps) => {
                        let whole = caps.get(0).map_or(pos..pos, |m| m.range());
                        (whole.start, whole.end, capture_spans(rule, &caps))
                    }
                    None => break,
                }
            };

            if start == end {
                empty_matches += 1;
                first_empty.get_or_insert(start);
                pos = next_char_boundary(text, end);
                continue;
            }

            if end == gap.end && !matches_past_cut(regex, text, start, gap.end) {
                pos = next_char_boundary(text, start);
                continue;
            }

            spans.push(Span::with_children(start, end, rule.name(), children));
            pos = end;
        }
    }

    if let Some(offset) = first_empty {
        let err = HighlightError::ZeroLengthMatch {
            rule: rule.name().to_string(),
            offset,
        };
        warn!(%err, count = empty_matches, "skipping empty matches");
    }

    spans
}

/// Check that `regex` still matches at `start` once the character after
/// the cut at `cut` is visible. At the end of the text nothing changes.
fn matches_past_cut(regex: &Regex, text: &str, start: usize, cut: usize) -> bool {
    if cut >= text.len() {
        return true;
    }
    let haystack = &text[..next_char_boundary(text, cut)];
    regex.find_at(haystack, start).is_some_and(|m| m.start() == start)
}

/// Nested spans for the rule's tagged capture groups, ordered and disjoint
fn capture_spans(rule: &Rule, caps: &regex::Captures<'_>) -> Vec<Span> {
    let mut children: Vec<Span> = rule
        .captures()
        .iter()
        .filter_map(|(group, tag)| {
            caps.get(*group)
                .filter(|m| !m.is_empty())
                .map(|m| Span::new(m.start(), m.end(), tag))
        })
        .collect();

    // Outer groups before the groups nested in them
    children.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut last_end = 0;
    children.retain(|child| {
        let keep = child.start >= last_end;
        if keep {
            last_end = child.end;
        }
        keep
    });
    children
}

fn custom_matches(rule: &Rule, matcher: &Matcher, text: &str, mask: &ReservedMask) -> Vec<Span> {
    let mut ranges = matcher(text, mask);
    ranges.sort_by_key(|r| (r.start, r.end));

    let mut spans = Vec::new();
    let mut last_end = 0;
    for range in ranges {
        if range.start >= range.end {
            let err = HighlightError::ZeroLengthMatch {
                rule: rule.name().to_string(),
                offset: range.start,
            };
            warn!(%err, "custom matcher returned an empty range");
            continue;
        }
        if range.end > text.len()
            || !text.is_char_boundary(range.start)
            || !text.is_char_boundary(range.end)
        {
            warn!(rule = rule.name(), ?range, "custom matcher returned an invalid range");
            continue;
        }
        if range.start < last_end || !mask.is_free(range.clone()) {
            continue;
        }
        last_end = range.end;
        spans.push(Span::new(range.start, range.end, rule.name()));
    }
    spans
}

/// Offset of the char after the one starting at `pos`
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text.get(pos..)
        .and_then(|rest| rest.chars().next())
        .map_or(pos + 1, |c| pos + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::rules::RuleDef;

    fn rule(name: &str, pattern: &str) -> Rule {
        RuleDef::new(name, pattern).compile("test", 0).unwrap()
    }

    fn ranges(spans: &[Span]) -> Vec<(usize, usize)> {
        spans.iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_mask_gaps() {
        let mut mask = ReservedMask::new(10);
        assert_eq!(mask.gaps(), vec![0..10]);

        mask.reserve(2..4);
        mask.reserve(8..10);
        assert_eq!(mask.gaps(), vec![0..2, 4..8]);
        assert!(mask.is_reserved(3));
        assert!(!mask.is_reserved(4));
        assert!(mask.is_reserved(10));
        assert!(mask.is_free(4..8));
        assert!(!mask.is_free(3..5));
    }

    #[test]
    fn test_global_matches() {
        let number = rule("constant.numeric", r"\d+");
        let text = "1 22 333 x";
        let spans = find_matches(&number, text, &ReservedMask::new(text.len()));
        assert_eq!(ranges(&spans), vec![(0, 1), (2, 4), (5, 8)]);
        assert!(spans.iter().all(|s| s.tag == "constant.numeric"));
    }

    #[test]
    fn test_reserved_text_is_skipped() {
        let text = "ab12cd34";
        let word = rule("word", r"[a-z0-9]+");
        let mut mask = ReservedMask::new(text.len());
        mask.reserve(2..4);
        let spans = find_matches(&word, text, &mask);
        assert_eq!(ranges(&spans), vec![(0, 2), (4, 8)]);
    }

    #[test]
    fn test_word_boundary_sees_left_context() {
        // "int" inside "xint" must not match even though "x" is claimed
        let text = "xint int";
        let int = rule("support.type", r"\bint\b");
        let mut mask = ReservedMask::new(text.len());
        mask.reserve(0..1);
        let spans = find_matches(&int, text, &mask);
        assert_eq!(ranges(&spans), vec![(5, 8)]);
    }

    #[test]
    fn test_word_boundary_sees_right_context() {
        // "print" runs into claimed text, so it is not a whole word
        let text = "printError: x; print";
        let print = rule("keyword", r"\bprint\b");
        let mut mask = ReservedMask::new(text.len());
        mask.reserve(5..13);
        let spans = find_matches(&print, text, &mask);
        assert_eq!(ranges(&spans), vec![(15, 20)]);
    }

    #[test]
    fn test_end_anchor_at_cut() {
        let text = "ab;";
        let tail = rule("tail", r"b$");
        let mut mask = ReservedMask::new(text.len());
        mask.reserve(2..3);
        assert!(find_matches(&tail, text, &mask).is_empty());

        let greedy = rule("word", r"[a-z]+");
        assert_eq!(ranges(&find_matches(&greedy, text, &mask)), vec![(0, 2)]);
    }

    #[test]
    fn test_zero_length_matches_are_skipped() {
        let text = "a1b";
        let digits = rule("digits", r"\d*");
        let spans = find_matches(&digits, text, &ReservedMask::new(text.len()));
        assert_eq!(ranges(&spans), vec![(1, 2)]);
    }

    #[test]
    fn test_zero_length_on_multibyte_text() {
        let text = "é1ü";
        let digits = rule("digits", r"\d*");
        let spans = find_matches(&digits, text, &ReservedMask::new(text.len()));
        assert_eq!(ranges(&spans), vec![(2, 3)]);
    }

    #[test]
    fn test_capture_children() {
        let call = RuleDef::new("meta.call", r"(\w+)\((\w*)\)")
            .capture(1, "entity.function")
            .capture(2, "variable")
            .compile("test", 0)
            .unwrap();
        let text = "f(x) g()";
        let spans = find_matches(&call, text, &ReservedMask::new(text.len()));
        assert_eq!(ranges(&spans), vec![(0, 4), (5, 8)]);
        assert_eq!(ranges(&spans[0].children), vec![(0, 1), (2, 3)]);
        // empty group 2 in "g()" gets no child
        assert_eq!(ranges(&spans[1].children), vec![(5, 6)]);
    }

    #[test]
    fn test_custom_matcher_output_is_validated() {
        let custom = RuleDef::with_matcher("meta.custom", |_, _| {
            vec![4..6, 0..2, 1..3, 3..3, 7..99, 2..4]
        })
        .compile("test", 0)
        .unwrap();
        let text = "abcdefgh";
        let mut mask = ReservedMask::new(text.len());
        mask.reserve(5..6);
        let spans = find_matches(&custom, text, &mask);
        // 1..3 overlaps 0..2, 4..6 overlaps the mask, 3..3 is empty, 7..99 is out of bounds
        assert_eq!(ranges(&spans), vec![(0, 2), (2, 4)]);
    }

    #[test]
    fn test_custom_matcher_sees_mask() {
        let custom = RuleDef::with_matcher("meta.free", |text, mask| {
            (0..text.len())
                .filter(|&i| !mask.is_reserved(i))
                .map(|i| i..i + 1)
                .collect()
        })
        .compile("test", 0)
        .unwrap();
        let mut mask = ReservedMask::new(3);
        mask.reserve(1..2);
        let spans = find_matches(&custom, "abc", &mask);
        assert_eq!(ranges(&spans), vec![(0, 1), (2, 3)]);
    }
}
