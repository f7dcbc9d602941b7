//! Loading configuration files from disk

use std::io::Write;
use std::path::Path;

use spangle::{Config, HighlightError, Highlighter, OutputFormat};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
[render]
format = "ansi"
class_prefix = "hl-"

[limits]
max_spans = 10

[theme]
comment = { fg = "green", italic = true }

[[languages]]
name = "ini"
extensions = ["ini", "cfg"]
rules = [
    { name = "comment", pattern = ';[^\n]*' },
    { name = "section", pattern = '^\[(\w+)\]', captures = { "1" = "entity.name" } },
]
"#,
    );

    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.render.format, OutputFormat::Ansi);
    assert_eq!(config.render.class_prefix, "hl-");
    assert_eq!(config.limits.max_spans, 10);

    let highlighter = Highlighter::from_config(&config);
    assert_eq!(
        highlighter.detect_language(Path::new("settings.cfg")),
        Some("ini")
    );

    let tokens = highlighter.tokenize("ini", "[core]\n; note");
    let spans = tokens.spans();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].tag, "section");
    assert_eq!(spans[0].children.len(), 1);
    assert_eq!(spans[0].children[0].text(tokens.text()), "core");
    assert_eq!(spans[1].text(tokens.text()), "; note");
}

#[test]
fn test_extending_builtin_language() {
    let file = write_config(
        r#"
[[languages]]
name = "c-todo"
extends = "c"
extensions = ["ct"]
rules = [ { name = "todo", pattern = 'TODO' } ]
"#,
    );

    let config = Config::load_from(file.path()).unwrap();
    let highlighter = Highlighter::from_config(&config);
    let tokens = highlighter.tokenize("c-todo", "TODO int");
    let tags: Vec<_> = tokens.spans().iter().map(|s| s.tag.as_str()).collect();
    assert_eq!(tags, vec!["todo", "support.type"]);
}

#[test]
fn test_misspelled_rule_key_keeps_rest_of_file() {
    let file = write_config(
        r#"
[render]
class_prefix = "hl-"

[[languages]]
name = "ini"
extensions = ["ini"]
rules = [
    { name = "comment", pattern = ';[^\n]*' },
    { name = "section", patern = '^\[\w+\]' },
]
"#,
    );

    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.render.class_prefix, "hl-");

    let mut registry = spangle::Registry::new();
    let reports = config.apply_languages(&mut registry);
    assert_eq!(reports[0].accepted, 1);
    assert!(matches!(
        &reports[0].dropped[..],
        [HighlightError::MalformedRule { index: 1, .. }]
    ));

    let highlighter = Highlighter::from_config(&config);
    assert_eq!(highlighter.detect_language(Path::new("app.ini")), Some("ini"));
    assert_eq!(
        highlighter.highlight("ini", "[core] ; note"),
        "[core] <span class=\"hl-comment\">; note</span>"
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, HighlightError::Io(_)));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = write_config("[limits\nmax_spans = ");
    let err = Config::load_from(file.path()).unwrap_err();
    assert!(matches!(err, HighlightError::Config(_)));
}

#[test]
fn test_unknown_key_is_rejected() {
    let file = write_config("colour = \"red\"\n");
    assert!(Config::load_from(file.path()).is_err());
}
