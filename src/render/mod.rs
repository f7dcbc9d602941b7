//! Renderers for tokenized text
//!
//! Rendering walks the original text left to right. Untagged stretches
//! go through `Render::text` with no scopes; tagged stretches are bracketed
//! by `open`/`close` and their text carries the enclosing tags. Every byte
//! of the source is emitted exactly once and in order.

mod ansi;
mod html;

use std::ops::Range;

use serde::Deserialize;

use crate::syntax::{Span, Tokens};

pub use ansi::AnsiRenderer;
pub use html::{escape_html, strip_markup, unescape_html, wrap_code_block, HtmlRenderer};

/// Output markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `<span class="…">` markup
    #[default]
    Html,
    /// ANSI terminal escapes
    Ansi,
}

/// Rendering settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Prepended to every generated HTML class name
    pub class_prefix: String,
    /// Wrap HTML output in `<pre><code data-language="…">`
    pub wrap: bool,
    /// Input text is already HTML-escaped. `Highlighter` decodes it before
    /// tokenizing, so rules never see entities and output is escaped once.
    pub pre_escaped: bool,
}

/// A markup target
pub trait Render {
    /// Emit the start marker of a span tagged `tag`
    fn open(&self, out: &mut String, tag: &str);

    /// Emit the end marker of a span tagged `tag`
    fn close(&self, out: &mut String, tag: &str);

    /// Emit a stretch of source text; `scopes` lists enclosing tags, outermost first
    fn text(&self, out: &mut String, text: &str, scopes: &[&str]);

    /// Render the whole text with its spans
    fn render(&self, tokens: &Tokens<'_>) -> String {
        let text = tokens.text();
        let mut out = String::with_capacity(text.len() * 2);
        let mut scopes = Vec::new();
        render_spans(self, &mut out, text, 0..text.len(), tokens.spans(), &mut scopes);
        out
    }
}

fn render_spans<'s, R: Render + ?Sized>(
    renderer: &R,
    out: &mut String,
    text: &str,
    range: Range<usize>,
    spans: &'s [Span],
    scopes: &mut Vec<&'s str>,
) {
    let mut pos = range.start;
    for span in spans {
        if span.start > pos {
            renderer.text(out, &text[pos..span.start], scopes);
        }
        renderer.open(out, &span.tag);
        scopes.push(&span.tag);
        render_spans(renderer, out, text, span.start..span.end, &span.children, scopes);
        scopes.pop();
        renderer.close(out, &span.tag);
        pos = span.end;
    }
    if pos < range.end {
        renderer.text(out, &text[pos..range.end], scopes);
    }
}

/// Render tokens as HTML with the default class naming
pub fn render(tokens: &Tokens<'_>) -> String {
    HtmlRenderer::new().render(tokens)
}
