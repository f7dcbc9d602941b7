//! Lispy language table
//!
//! Covers both source files and transcripts of the interactive prompt
//! (prompt marker, version banner, error lines).

use crate::syntax::rules::RuleDef;

/// Create the Lispy rule table
pub fn lispy_rules() -> Vec<RuleDef> {
    vec![
        RuleDef::new("constant.string", r#""(\\.|[^"\\])*""#),
        RuleDef::new("comment", r";[^\r\n]*"),
        RuleDef::new("meta.prompt", r"lispy>"),
        RuleDef::new("meta.error", r"Error: [^\r\n]*"),
        RuleDef::new("meta.error", r"<stdin>[^\r\n]*"),
        RuleDef::new("meta.version", r"Lispy Version[^\r\n]*"),
        RuleDef::new("meta.exit", r"Press Ctrl\+c[^\r\n]*"),
        RuleDef::new("keyword.operator", r"[(){}&+\-*/\\=!<>]"),
        RuleDef::new(
            "keyword.builtin",
            r"\b(def|list|head|tail|eval|join|if|load|error|print)\b",
        ),
        RuleDef::new(
            "keyword.library",
            r"\b(fun|unpack|pack|curry|uncurry|do|let|not|or|and|flip|ghost|comp|fst|snd|trd|len|nth|last|take|drop|while|split|elem|map|filter|foldl|foldr|sum|product|select|otherwise|case|fib|true|false|nil|lookup|zip|unzip|reverse)\b",
        ),
        RuleDef::new("constant.numeric", r"-?[0-9]+"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        for (index, def) in lispy_rules().into_iter().enumerate() {
            assert!(def.compile("lispy", index).is_ok());
        }
    }
}
