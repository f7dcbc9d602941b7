//! Style types for terminal rendering
//!
//! Tags are dot-scoped (`constant.numeric`). A theme maps tags to styles,
//! and lookup falls back to shorter scopes, so a `constant` entry styles
//! every `constant.*` tag that has no entry of its own.

use std::collections::HashMap;

use serde::Deserialize;

/// Terminal colors (ANSI 16-color palette for compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Tag to style mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    styles: HashMap<String, Style>,
}

impl Theme {
    /// A theme with no entries; everything renders unstyled
    pub fn empty() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    /// Set the style for a tag
    pub fn set(&mut self, tag: &str, style: Style) {
        self.styles.insert(tag.to_string(), style);
    }

    /// Builder: apply entries on top of this theme
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Style)>,
    {
        for (tag, style) in overrides {
            self.set(tag, *style);
        }
        self
    }

    /// Style for `tag`, trying `a.b.c`, then `a.b`, then `a`
    pub fn style_for(&self, tag: &str) -> Option<Style> {
        let mut scope = tag;
        loop {
            if let Some(style) = self.styles.get(scope) {
                return Some(*style);
            }
            scope = &scope[..scope.rfind('.')?];
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        let mut theme = Self::empty();
        theme.set("comment", Style::fg(Color::BrightBlack).with_italic());
        theme.set("constant", Style::fg(Color::BrightRed));
        theme.set("constant.numeric", Style::fg(Color::Cyan));
        theme.set("constant.string", Style::fg(Color::Green));
        theme.set("constant.character", Style::fg(Color::Green));
        theme.set("keyword", Style::fg(Color::Magenta).with_bold());
        theme.set("keyword.operator", Style::fg(Color::BrightWhite));
        theme.set("keyword.library", Style::fg(Color::Blue));
        theme.set("meta.preprocessor", Style::fg(Color::BrightMagenta));
        theme.set("meta.prompt", Style::fg(Color::BrightBlue).with_bold());
        theme.set("meta.error", Style::fg(Color::Red));
        theme.set("meta.version", Style::fg(Color::BrightBlack));
        theme.set("meta.exit", Style::fg(Color::BrightBlack));
        theme.set("storage", Style::fg(Color::Yellow));
        theme.set("support.type", Style::fg(Color::Yellow));
        theme
    }
}
