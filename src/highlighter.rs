//! Highlighting entry point
//!
//! A `Highlighter` owns a registry plus the settings that shape one
//! `highlight` call. Registration happens through `registry_mut` before
//! use; afterwards the highlighter is only read, so it can be shared
//! across threads behind an `Arc` (or a `RwLock` if tables change later).

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::render::{
    unescape_html, wrap_code_block, AnsiRenderer, HtmlRenderer, OutputFormat, Render,
    RenderOptions,
};
use crate::syntax::{tokenize, try_tokenize, Limits, Registry, Theme, Tokens};

/// Registry, limits and render settings bundled together
pub struct Highlighter {
    registry: Registry,
    limits: Limits,
    options: RenderOptions,
    theme: Theme,
}

impl Highlighter {
    /// Create a highlighter with the built-in languages and default settings
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Create a highlighter around an existing registry
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            limits: Limits::default(),
            options: RenderOptions::default(),
            theme: Theme::default(),
        }
    }

    /// Create a highlighter from configuration: built-ins, then configured languages
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Registry::new();
        let reports = config.apply_languages(&mut registry);
        debug!(languages = reports.len(), "applied configured languages");

        Self {
            registry,
            limits: config.limits,
            options: config.render.clone(),
            theme: config.theme(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// Detect language from filename
    pub fn detect_language(&self, filename: &Path) -> Option<&str> {
        self.registry.detect_language(filename)
    }

    /// Tokenize, falling back to plain text
    pub fn tokenize<'t>(&self, language: &str, text: &'t str) -> Tokens<'t> {
        tokenize(&self.registry, language, text, &self.limits)
    }

    /// Tokenize, reporting unknown languages and oversized input
    pub fn try_tokenize<'t>(&self, language: &str, text: &'t str) -> Result<Tokens<'t>> {
        try_tokenize(&self.registry, language, text, &self.limits)
    }

    /// Render tokens in the configured output format
    pub fn render(&self, tokens: &Tokens<'_>) -> String {
        match self.options.format {
            OutputFormat::Html => {
                let body = HtmlRenderer::from_options(&self.options).render(tokens);
                if self.options.wrap {
                    wrap_code_block(&body, tokens.language())
                } else {
                    body
                }
            }
            OutputFormat::Ansi => AnsiRenderer::new(self.theme.clone()).render(tokens),
        }
    }

    /// Tokenize and render in one step.
    ///
    /// With `pre_escaped` set, `text` is decoded first so entities such as
    /// `&amp;` reach the rules as the characters they stand for.
    pub fn highlight(&self, language: &str, text: &str) -> String {
        let text = if self.options.pre_escaped {
            Cow::Owned(unescape_html(text))
        } else {
            Cow::Borrowed(text)
        };
        self.render(&self.tokenize(language, &text))
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::strip_markup;
    use crate::syntax::RuleDef;

    #[test]
    fn test_highlight_html() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("lispy", "(+ 1 2)");
        assert!(html.starts_with("<span class=\"keyword operator\">(</span>"));
        assert_eq!(strip_markup(&html), "(+ 1 2)");
    }

    #[test]
    fn test_unknown_language_only_escapes() {
        let highlighter = Highlighter::new();
        assert_eq!(highlighter.highlight("cobol", "a < b & c"), "a &lt; b &amp; c");
        assert!(highlighter.try_tokenize("cobol", "x").is_err());
    }

    #[test]
    fn test_wrapped_output() {
        let mut highlighter = Highlighter::new();
        highlighter.set_options(RenderOptions {
            wrap: true,
            class_prefix: "hl-".to_string(),
            ..RenderOptions::default()
        });
        let html = highlighter.highlight("c", "int");
        assert_eq!(
            html,
            "<pre><code data-language=\"c\"><span class=\"hl-support hl-type\">int</span></code></pre>"
        );
    }

    #[test]
    fn test_pre_escaped_input() {
        let mut highlighter = Highlighter::new();
        highlighter.set_options(RenderOptions {
            pre_escaped: true,
            ..RenderOptions::default()
        });
        let html = highlighter.highlight("c", "x &amp;&amp; y &lt; 2");
        assert_eq!(
            html,
            "x <span class=\"keyword operator\">&amp;</span>\
             <span class=\"keyword operator\">&amp;</span> y \
             <span class=\"keyword operator\">&lt;</span> \
             <span class=\"constant numeric\">2</span>"
        );
        assert!(!html.contains("&amp;amp;"));
    }

    #[test]
    fn test_ansi_output() {
        let mut highlighter = Highlighter::new();
        highlighter.set_options(RenderOptions {
            format: OutputFormat::Ansi,
            ..RenderOptions::default()
        });
        let styled = highlighter.highlight("c", "/* note */");
        assert!(styled.contains('\x1b'));
        assert!(styled.contains("/* note */"));
    }

    #[test]
    fn test_registry_mut() {
        let mut highlighter = Highlighter::new();
        highlighter
            .registry_mut()
            .register("words", vec![RuleDef::new("word", r"\w+")], false);
        assert_eq!(highlighter.tokenize("words", "hi there").spans().len(), 2);
    }

    #[test]
    fn test_from_config() {
        let config = Config::parse(
            r#"
[limits]
max_text_len = 3

[[languages]]
name = "tiny"
rules = [ { name = "digit", pattern = '\d' } ]
"#,
        )
        .unwrap();
        let highlighter = Highlighter::from_config(&config);
        assert_eq!(highlighter.tokenize("tiny", "123").spans().len(), 3);
        assert!(highlighter.tokenize("tiny", "1234").is_plain());
    }

    #[test]
    fn test_parallel_tokenization() {
        let highlighter = &Highlighter::new();
        let inputs = ["int a = 1;", "(+ 1 2)", "// c", "nothing"];
        std::thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|&text| scope.spawn(move || strip_markup(&highlighter.highlight("c", text))))
                .collect();
            for (handle, text) in handles.into_iter().zip(inputs) {
                assert_eq!(handle.join().unwrap(), text);
            }
        });
    }
}
