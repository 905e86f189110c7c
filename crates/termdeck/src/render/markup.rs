//! Bracket markup for styled terminal lines.
//!
//! `[bold cyan]text[/]` opens a style and `[/]` closes the innermost one.
//! Colours are names (`red`, `dark_grey`) or `#rrggbb`; `on <colour>` sets
//! the background. A literal bracket is written `\[`. Markup never counts
//! toward a line's visible width.

use crossterm::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Open(String),
    Close,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub dim: bool,
    pub underline: bool,
    pub reverse: bool,
}

impl Style {
    /// Layer the tokens of an opening tag over this style.
    fn with_tag(mut self, tag: &str) -> Style {
        let mut words = tag.split_whitespace();
        while let Some(word) = words.next() {
            match word {
                "bold" | "b" => self.bold = true,
                "italic" | "i" => self.italic = true,
                "dim" => self.dim = true,
                "underline" | "u" => self.underline = true,
                "reverse" => self.reverse = true,
                "on" => {
                    if let Some(color) = words.next().and_then(parse_color) {
                        self.bg = Some(color);
                    }
                }
                other => {
                    if let Some(color) = parse_color(other) {
                        self.fg = Some(color);
                    }
                }
            }
        }
        self
    }
}

/// Resolve a colour name or `#rrggbb` value.
pub fn parse_color(name: &str) -> Option<Color> {
    let name = name.trim().to_lowercase().replace('-', "_");
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb { r, g, b });
    }
    let color = match name.as_str() {
        "default" | "reset" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "dark_grey" | "dark_gray" => Color::DarkGrey,
        "dark_red" => Color::DarkRed,
        "dark_green" => Color::DarkGreen,
        "dark_yellow" => Color::DarkYellow,
        "dark_blue" | "navy" | "navy_blue" => Color::DarkBlue,
        "dark_magenta" => Color::DarkMagenta,
        "dark_cyan" => Color::DarkCyan,
        _ => return None,
    };
    Some(color)
}

/// Escape text so it renders literally.
pub fn escape(text: &str) -> String {
    text.replace('[', "\\[")
}

/// Wrap `text` in a colour tag. Unknown colours leave the text unstyled.
pub fn paint(text: &str, color: &str) -> String {
    if text.is_empty() || parse_color(color).is_none() {
        return text.to_string();
    }
    format!("[{color}]{text}[/]")
}

const STYLE_WORDS: &[&str] = &[
    "bold", "b", "italic", "i", "dim", "underline", "u", "reverse", "on",
];

/// Only bodies made entirely of style words and colours are tags, so
/// ordinary bracketed text such as `x[0]` stays literal.
fn is_tag(body: &str) -> bool {
    if body == "/" {
        return true;
    }
    let mut words = body.split_whitespace().peekable();
    words.peek().is_some()
        && words.all(|word| STYLE_WORDS.contains(&word) || parse_color(word).is_some())
}

pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        if c == '\\' && rest[1..].starts_with('[') {
            text.push('[');
            rest = &rest[2..];
            continue;
        }
        if c == '[' {
            if let Some(end) = rest.find(']') {
                let body = &rest[1..end];
                if is_tag(body) {
                    if !text.is_empty() {
                        tokens.push(Token::Text(std::mem::take(&mut text)));
                    }
                    if body == "/" {
                        tokens.push(Token::Close);
                    } else {
                        tokens.push(Token::Open(body.to_string()));
                    }
                    rest = &rest[end + 1..];
                    continue;
                }
            }
        }
        text.push(c);
        rest = &rest[c.len_utf8()..];
    }
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

/// The visible text with all markup removed.
pub fn strip(line: &str) -> String {
    tokenize(line)
        .into_iter()
        .filter_map(|token| match token {
            Token::Text(text) => Some(text),
            _ => None,
        })
        .collect()
}

/// Visible column width of a markup line.
pub fn width(line: &str) -> usize {
    UnicodeWidthStr::width(strip(line).as_str())
}

/// Resolve a line into styled runs, starting from `base`.
pub fn spans(line: &str, base: Style) -> Vec<(String, Style)> {
    let mut stack = vec![base];
    let mut out = Vec::new();
    for token in tokenize(line) {
        match token {
            Token::Text(text) => {
                let style = stack.last().copied().unwrap_or(base);
                out.push((text, style));
            }
            Token::Open(tag) => {
                let style = stack.last().copied().unwrap_or(base).with_tag(&tag);
                stack.push(style);
            }
            Token::Close => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
        }
    }
    out
}

/// Cut a markup line to at most `max` visible columns, closing any tags
/// left open by the cut.
pub fn truncate(line: &str, max: usize) -> String {
    if width(line) <= max {
        return line.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    let mut open = 0usize;
    'tokens: for token in tokenize(line) {
        match token {
            Token::Text(text) => {
                for c in text.chars() {
                    let w = c.width().unwrap_or(0);
                    if used + w > max {
                        break 'tokens;
                    }
                    used += w;
                    if c == '[' {
                        out.push('\\');
                    }
                    out.push(c);
                }
            }
            Token::Open(tag) => {
                open += 1;
                out.push('[');
                out.push_str(&tag);
                out.push(']');
            }
            Token::Close => {
                open = open.saturating_sub(1);
                out.push_str("[/]");
            }
        }
    }
    for _ in 0..open {
        out.push_str("[/]");
    }
    out
}

/// Truncate or right-pad a markup line to exactly `target` visible columns.
pub fn fit(line: &str, target: usize) -> String {
    let line = truncate(line, target);
    let pad = target.saturating_sub(width(&line));
    format!("{line}{}", " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_and_width_ignore_markup() {
        let line = "[bold cyan]Hello[/] [#ff0000 on black]world[/]";
        assert_eq!(strip(line), "Hello world");
        assert_eq!(width(line), 11);
    }

    #[test]
    fn test_escaped_bracket_is_literal() {
        let line = escape("[link](url) and [bold]");
        assert_eq!(strip(&line), "[link](url) and [bold]");
    }

    #[test]
    fn test_non_tag_brackets_are_text() {
        assert_eq!(strip("array[0] = x[i+1]"), "array[0] = x[i+1]");
    }

    #[test]
    fn test_spans_nest_styles() {
        let runs = spans("[bold]a[red]b[/]c[/]d", Style::default());
        assert_eq!(runs.len(), 4);
        assert!(runs[0].1.bold && runs[0].1.fg.is_none());
        assert_eq!(runs[1].1.fg, Some(Color::Red));
        assert!(runs[1].1.bold);
        assert!(runs[2].1.bold && runs[2].1.fg.is_none());
        assert_eq!(runs[3].1, Style::default());
    }

    #[test]
    fn test_background_colour() {
        let runs = spans("[#102030 on #405060]▀[/]", Style::default());
        assert_eq!(runs[0].1.fg, Some(Color::Rgb { r: 0x10, g: 0x20, b: 0x30 }));
        assert_eq!(runs[0].1.bg, Some(Color::Rgb { r: 0x40, g: 0x50, b: 0x60 }));
    }

    #[test]
    fn test_truncate_closes_open_tags() {
        let cut = truncate("[bold]abcdef[/] tail", 3);
        assert_eq!(cut, "[bold]abc[/]");
        assert_eq!(width(&cut), 3);
    }

    #[test]
    fn test_fit_pads_to_width() {
        let fitted = fit("[dim]ab[/]", 5);
        assert_eq!(width(&fitted), 5);
        assert_eq!(strip(&fitted), "ab   ");
    }

    #[test]
    fn test_wide_chars_count_double() {
        assert_eq!(width("日本"), 4);
        assert_eq!(width(&truncate("日本語", 5)), 4);
    }

    #[test]
    fn test_paint_skips_unknown_colours() {
        assert_eq!(paint("x", "red"), "[red]x[/]");
        assert_eq!(paint("x", "chartreuse"), "x");
    }

    #[test]
    fn test_parse_color_names() {
        assert_eq!(parse_color("navy_blue"), Some(Color::DarkBlue));
        assert_eq!(parse_color("Dark-Grey"), Some(Color::DarkGrey));
        assert_eq!(parse_color("#abc"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }
}
