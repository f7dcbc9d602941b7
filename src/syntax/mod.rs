//! Pattern-table syntax highlighting engine
//!
//! - `rules`: rule table entries and compiled rules
//! - `registry`: language tables, inheritance, extension detection
//! - `matcher`: one rule against the unclaimed parts of a text
//! - `tokenizer`: all rules of a language, in priority order, to spans
//! - `style`: tag to terminal style themes

mod builtin;
mod matcher;
mod registry;
mod rules;
mod style;
mod tokenizer;

pub use matcher::{find_matches, ReservedMask};
pub use registry::{Registration, Registry};
pub use rules::{Matcher, Rule, RuleDef};
pub use style::{Color, Style, Theme};
pub use tokenizer::{
    tokenize, tokenize_with_rules, try_tokenize, Limits, Span, Tokens, DEFAULT_MAX_SPANS,
    DEFAULT_MAX_TEXT_LEN,
};
