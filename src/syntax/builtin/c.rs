//! C language table

use crate::syntax::rules::RuleDef;

/// Create the C rule table.
///
/// Rules whose matches may contain operator characters (comments,
/// literals, preprocessor lines, exponents like `1e-3`) come before the
/// operator rule so they claim their text first.
pub fn c_rules() -> Vec<RuleDef> {
    vec![
        // Block comments may span lines; line comments stop at the newline
        RuleDef::new("comment", r"(?s:/\*.*?\*/)|//[^\r\n]*"),
        RuleDef::new("constant.string", r#""(\\.|[^"\\])*""#),
        RuleDef::new("constant.character", r"'(\\.|[^'\\])'"),
        // Directives continue over escaped newlines
        RuleDef::new("meta.preprocessor", r"#(\\\r?\n|[^\r\n])*"),
        RuleDef::new(
            "keyword",
            r"\b(for|while|do|goto|typedef|return|if|else|switch|case|break|continue|NULL|sizeof)\b",
        ),
        RuleDef::new(
            "constant.numeric",
            r"(?i)\b(\d+(\.\d+)?(e[+\-]?\d+)?[fd]?|0x[\da-f]+)\b",
        ),
        RuleDef::new("keyword.operator", r"[+!\-&<>|*=:;?\[\](){}]"),
        RuleDef::new(
            "support.type",
            r"\b((un)?signed|void|char|short|int|long|float|double)\b",
        ),
        RuleDef::new(
            "storage.modifier",
            r"\b(const|static|extern|auto|register|volatile|inline)\b",
        ),
        RuleDef::new("storage.type", r"\b(struct|union|enum)\b"),
    ]
}
