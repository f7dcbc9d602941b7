//! Built-in language tables
//!
//! Tables are written against raw source text: `<`, `>` and `&` are
//! matched as themselves, escaping happens only when rendering.

mod c;
mod lispy;

use super::rules::RuleDef;

/// A language table shipped with the crate
pub struct BuiltinLanguage {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub rules: Vec<RuleDef>,
}

/// Get all built-in language tables
pub fn all_languages() -> Vec<BuiltinLanguage> {
    vec![
        BuiltinLanguage {
            name: "c",
            extensions: &["c", "h"],
            rules: c::c_rules(),
        },
        BuiltinLanguage {
            name: "lispy",
            extensions: &["lspy", "lispy"],
            rules: lispy::lispy_rules(),
        },
    ]
}
