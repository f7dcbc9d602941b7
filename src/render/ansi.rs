//! Terminal rendering using crossterm styling

use std::borrow::Cow;
use std::fmt::Write;

use crossterm::style::{self as ct, Attribute, ContentStyle, StyledContent};

use super::Render;
use crate::syntax::{Color, Style, Theme};

/// Renders spans as ANSI-styled text.
///
/// Each stretch of text takes the style of its innermost tag that the
/// theme knows about; unknown tags and plain text pass through unstyled.
#[derive(Debug, Clone, Default)]
pub struct AnsiRenderer {
    theme: Theme,
}

impl AnsiRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }
}

impl Render for AnsiRenderer {
    fn open(&self, _out: &mut String, _tag: &str) {}

    fn close(&self, _out: &mut String, _tag: &str) {}

    fn text(&self, out: &mut String, text: &str, scopes: &[&str]) {
        let text = printable(text);
        let style = scopes
            .iter()
            .rev()
            .find_map(|tag| self.theme.style_for(tag))
            .filter(|style| !style.is_default());

        match style {
            Some(style) => {
                let _ = write!(out, "{}", StyledContent::new(content_style(style), &*text));
            }
            None => out.push_str(&text),
        }
    }
}

/// Replace control characters the terminal would act on (ESC, BEL, DEL,
/// ...) with their Unicode control pictures. Line breaks and tabs stay.
fn printable(text: &str) -> Cow<'_, str> {
    let is_unsafe = |c: char| c.is_control() && !matches!(c, '\n' | '\r' | '\t');
    if !text.contains(is_unsafe) {
        return Cow::Borrowed(text);
    }

    text.chars()
        .map(|c| match c {
            '\x7f' => '\u{2421}',
            c if c < ' ' && is_unsafe(c) => char::from_u32(0x2400 + c as u32).unwrap_or('\u{fffd}'),
            c if is_unsafe(c) => '\u{fffd}',
            c => c,
        })
        .collect()
}

fn content_style(style: Style) -> ContentStyle {
    let mut content = ContentStyle::new();
    content.foreground_color = terminal_color(style.fg);
    content.background_color = terminal_color(style.bg);
    if style.bold {
        content.attributes.set(Attribute::Bold);
    }
    if style.italic {
        content.attributes.set(Attribute::Italic);
    }
    if style.underline {
        content.attributes.set(Attribute::Underlined);
    }
    content
}

/// Map a palette color to crossterm's; `Default` leaves the terminal's own
fn terminal_color(color: Color) -> Option<ct::Color> {
    let mapped = match color {
        Color::Default => return None,
        Color::Black => ct::Color::Black,
        Color::Red => ct::Color::DarkRed,
        Color::Green => ct::Color::DarkGreen,
        Color::Yellow => ct::Color::DarkYellow,
        Color::Blue => ct::Color::DarkBlue,
        Color::Magenta => ct::Color::DarkMagenta,
        Color::Cyan => ct::Color::DarkCyan,
        Color::White => ct::Color::Grey,
        Color::BrightBlack => ct::Color::DarkGrey,
        Color::BrightRed => ct::Color::Red,
        Color::BrightGreen => ct::Color::Green,
        Color::BrightYellow => ct::Color::Yellow,
        Color::BrightBlue => ct::Color::Blue,
        Color::BrightMagenta => ct::Color::Magenta,
        Color::BrightCyan => ct::Color::Cyan,
        Color::BrightWhite => ct::Color::White,
    };
    Some(mapped)
}
