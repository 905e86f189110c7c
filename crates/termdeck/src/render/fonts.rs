//! Heading "fonts". A terminal has one glyph size, so fonts are text
//! transformations: `plain`, `caps` (upper case), `wide` (letter-spaced
//! upper case) and `bold`.

use super::markup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Plain,
    Caps,
    Wide,
    Bold,
}

impl Font {
    pub fn from_name(name: &str) -> Option<Font> {
        match name.trim().to_lowercase().as_str() {
            "plain" | "standard" => Some(Font::Plain),
            "caps" | "upper" => Some(Font::Caps),
            "wide" | "spaced" => Some(Font::Wide),
            "bold" => Some(Font::Bold),
            _ => None,
        }
    }

    /// First supported font in a comma-separated preference list.
    pub fn resolve(list: &str) -> Font {
        list.split(',')
            .find_map(Font::from_name)
            .unwrap_or(Font::Plain)
    }

    fn apply(self, text: &str) -> String {
        match self {
            Font::Plain | Font::Bold => text.to_string(),
            Font::Caps => text.to_uppercase(),
            Font::Wide => text
                .split_whitespace()
                .map(|word| {
                    word.to_uppercase()
                        .chars()
                        .map(String::from)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join("   "),
        }
    }

    /// Next font to try when this one is too wide for the available space.
    fn narrower(self) -> Option<Font> {
        match self {
            Font::Wide => Some(Font::Caps),
            _ => None,
        }
    }
}

/// Render heading text in the preferred font, wrapped to `width` columns
/// and coloured. A `wide` heading that does not fit on one line falls back
/// to `caps` before wrapping.
pub fn render_heading(text: &str, fonts: &str, color: &str, width: usize) -> Vec<String> {
    let mut font = Font::resolve(fonts);
    let mut styled = font.apply(text);
    while markup::width(&styled) > width {
        match font.narrower() {
            Some(next) => {
                font = next;
                styled = font.apply(text);
            }
            None => break,
        }
    }

    let style = if font == Font::Bold {
        format!("bold {color}")
    } else {
        color.to_string()
    };
    textwrap::wrap(&styled, width.max(1))
        .into_iter()
        .map(|line| {
            let line = markup::escape(&line);
            if markup::parse_color(color).is_some() {
                format!("[{style}]{line}[/]")
            } else if font == Font::Bold {
                format!("[bold]{line}[/]")
            } else {
                line
            }
        })
        .collect()
}
