//! HTML rendering
//!
//! A span tagged `constant.numeric` becomes
//! `<span class="constant numeric">…</span>`: each dot-separated scope is
//! its own class, so stylesheets can target `.constant` or
//! `.constant.numeric`. Source text is escaped once per emitted stretch,
//! never after markers are inserted.

use std::borrow::Cow;

use super::{Render, RenderOptions};

/// Characters with meaning in HTML text or attribute values
const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

/// Renders spans as `<span class="…">` elements
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    class_prefix: String,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer from configured options
    pub fn from_options(options: &RenderOptions) -> Self {
        Self {
            class_prefix: options.class_prefix.clone(),
        }
    }

    /// Builder: prefix every class name, e.g. `hl-` gives `hl-comment`
    pub fn with_class_prefix(mut self, prefix: &str) -> Self {
        self.class_prefix = prefix.to_string();
        self
    }

    /// Class attribute value for a tag
    pub fn class_names(&self, tag: &str) -> String {
        tag.split('.')
            .filter(|scope| !scope.is_empty())
            .map(|scope| format!("{}{}", self.class_prefix, scope))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Render for HtmlRenderer {
    fn open(&self, out: &mut String, tag: &str) {
        out.push_str("<span class=\"");
        out.push_str(&escape_html(&self.class_names(tag)));
        out.push_str("\">");
    }

    fn close(&self, out: &mut String, _tag: &str) {
        out.push_str("</span>");
    }

    fn text(&self, out: &mut String, text: &str, _scopes: &[&str]) {
        out.push_str(&escape_html(text));
    }
}

/// Escape `& < > " '` for use in HTML text and attributes
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ENTITIES.iter().find(|(_, c)| *c == ch) {
            Some((entity, _)) => escaped.push_str(entity),
            None => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Reverse `escape_html`. Unknown entities are left as they are.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Remove all markup elements and un-escape what is left.
///
/// For output of `HtmlRenderer` on raw input this gives back the exact
/// source text.
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        rest = match rest[open..].find('>') {
            Some(close) => &rest[open + close + 1..],
            None => "",
        };
    }

    text.push_str(rest);
    unescape_html(&text)
}

/// Wrap rendered spans in a code block element
pub fn wrap_code_block(body: &str, language: Option<&str>) -> String {
    match language {
        Some(lang) => format!(
            "<pre><code data-language=\"{}\">{}</code></pre>",
            escape_html(lang),
            body
        ),
        None => format!("<pre><code>{}</code></pre>", body),
    }
}
