//! spangle - pattern-table syntax highlighting
//!
//! A language is an ordered table of named regex rules. Tokenizing runs
//! the rules in order, each claiming the text it matches that no earlier
//! rule claimed, and yields disjoint tagged spans over the original text.
//! Renderers turn those spans into HTML or ANSI-styled text without
//! losing or reordering a single character.
//!
//! ```
//! use spangle::{render, strip_markup, Limits, Registry, tokenize};
//!
//! let registry = Registry::new();
//! let tokens = tokenize(&registry, "c", "int x = 5;", &Limits::default());
//! let html = render(&tokens);
//! assert!(html.starts_with("<span class=\"support type\">int</span>"));
//! assert_eq!(strip_markup(&html), "int x = 5;");
//! ```

pub mod config;
pub mod error;
pub mod highlighter;
pub mod render;
pub mod syntax;

pub use config::{Config, LanguageConfig};
pub use error::{HighlightError, Result};
pub use highlighter::Highlighter;
pub use render::{
    render, strip_markup, AnsiRenderer, HtmlRenderer, OutputFormat, Render, RenderOptions,
};
pub use syntax::{
    tokenize, try_tokenize, Limits, ReservedMask, Registration, Registry, Rule, RuleDef, Span,
    Theme, Tokens,
};
