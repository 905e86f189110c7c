use std::sync::LazyLock;

use regex::Regex;
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use unicode_width::UnicodeWidthStr;

use super::markup;
use crate::parser::segments::{is_progressive_bullet, is_static_bullet};
use crate::theme::Theme;

pub const PROGRESSIVE_GLYPH: &str = "•";
pub const STATIC_GLYPH: &str = "–";

static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\*\*([^*]+)\*\*|__([^_]+)__|`([^`]+)`|\*([^*\s](?:[^*]*[^*\s])?)\*|\b_([^_\s](?:[^_]*[^_\s])?)_\b",
    )
    .expect("Invalid inline style regex")
});

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("Invalid heading regex"));

static ORDERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+[.)])\s+(.*)$").expect("Invalid ordered list regex"));

/// Inline emphasis markers resolved to markup tags.
fn inline_runs(text: &str) -> Vec<(&str, Option<&'static str>)> {
    let mut runs = Vec::new();
    let mut cursor = 0;
    for caps in INLINE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > cursor {
            runs.push((&text[cursor..whole.start()], None));
        }
        let (inner, tag) = if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
            (m.as_str(), "bold")
        } else if let Some(m) = caps.get(3) {
            (m.as_str(), "green")
        } else if let Some(m) = caps.get(4).or_else(|| caps.get(5)) {
            (m.as_str(), "italic")
        } else {
            continue;
        };
        runs.push((inner, Some(tag)));
        cursor = whole.end();
    }
    if cursor < text.len() {
        runs.push((&text[cursor..], None));
    }
    runs
}

/// One wrappable word. It may mix several styles, e.g. `**bold**,`.
#[derive(Debug, Default)]
struct Word {
    markup: String,
    width: usize,
    whitespace: usize,
}

impl Word {
    fn push(&mut self, piece: &str, tag: Option<&str>) {
        let escaped = markup::escape(piece);
        match tag {
            Some(tag) => self.markup.push_str(&format!("[{tag}]{escaped}[/]")),
            None => self.markup.push_str(&escaped),
        }
        self.width += UnicodeWidthStr::width(piece);
    }

    fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }
}

impl Fragment for Word {
    fn width(&self) -> f64 {
        self.width as f64
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace as f64
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

fn words(text: &str) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    let mut current = Word::default();
    for (run, tag) in inline_runs(text) {
        for (i, piece) in run.split(' ').enumerate() {
            if i > 0 {
                if current.is_empty() {
                    if let Some(last) = words.last_mut() {
                        last.whitespace += 1;
                    }
                } else {
                    current.whitespace = 1;
                    words.push(std::mem::take(&mut current));
                }
            }
            if !piece.is_empty() {
                current.push(piece, tag);
            }
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Wrap styled text to `width` columns. Continuation lines are indented by
/// the width of `prefix` so list items hang.
pub fn wrap(text: &str, width: usize, prefix: &str) -> Vec<String> {
    let indent = " ".repeat(markup::width(prefix));
    let available = width.saturating_sub(indent.len()).max(1);
    let words = words(text);
    if words.is_empty() {
        return vec![prefix.trim_end().to_string()];
    }

    wrap_first_fit(&words, &[available as f64])
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let mut out = if i == 0 {
                prefix.to_string()
            } else {
                indent.clone()
            };
            for (j, word) in line.iter().enumerate() {
                out.push_str(&word.markup);
                if j + 1 < line.len() {
                    out.push_str(&" ".repeat(word.whitespace));
                }
            }
            out
        })
        .collect()
}

/// Render a text segment into markup lines no wider than `width` (except
/// for single words that cannot be broken).
pub fn render(text: &str, width: usize, theme: &Theme) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let depth = (line.len() - line.trim_start().len()).min(width / 4);
        let lead = " ".repeat(depth);
        let body = line.trim_start();

        if is_progressive_bullet(line) {
            let prefix = format!("{lead}{PROGRESSIVE_GLYPH} ");
            lines.extend(wrap(body[1..].trim_start(), width, &prefix));
        } else if is_static_bullet(line) {
            let prefix = format!("{lead}{STATIC_GLYPH} ");
            lines.extend(wrap(body[1..].trim_start(), width, &prefix));
        } else if let Some(caps) = ORDERED_RE.captures(body) {
            let prefix = format!("{lead}{} ", &caps[1]);
            lines.extend(wrap(&caps[2], width, &prefix));
        } else if let Some(caps) = HEADING_RE.captures(body) {
            let color = match caps[1].len() {
                1 => &theme.h1.color,
                2 => &theme.h2.color,
                _ => &theme.h3.color,
            };
            let style = if markup::parse_color(color).is_some() {
                format!("bold {color}")
            } else {
                "bold".to_string()
            };
            for wrapped in textwrap::wrap(&caps[2], width.max(1)) {
                lines.push(format!("[{style}]{}[/]", markup::escape(&wrapped)));
            }
        } else if let Some(quote) = body.strip_prefix('>') {
            for wrapped in wrap(quote.trim_start(), width.saturating_sub(2), "") {
                lines.push(format!("[dim]│[/] [italic]{wrapped}[/]"));
            }
        } else {
            lines.extend(wrap(body, width, &lead));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn theme() -> Theme {
        Theme::from_settings(&Settings::default())
    }

    #[test]
    fn test_bullet_glyphs() {
        let lines = render("* one\n- two\nplain", 40, &theme());
        assert_eq!(lines, vec!["• one", "– two", "plain"]);
    }

    #[test]
    fn test_hidden_bullet_blank_line_kept() {
        let lines = render("* one\n\n- three", 40, &theme());
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
    }

    #[test]
    fn test_inline_styles_become_markup() {
        let lines = render("a **bold** and *it* with `code`", 80, &theme());
        assert_eq!(
            lines[0],
            "a [bold]bold[/] and [italic]it[/] with [green]code[/]"
        );
        assert_eq!(markup::strip(&lines[0]), "a bold and it with code");
    }

    #[test]
    fn test_wrapping_hangs_under_bullet() {
        let lines = render("* alpha beta gamma delta", 14, &theme());
        assert_eq!(lines.len(), 2);
        assert_eq!(markup::strip(&lines[0]), "• alpha beta");
        assert_eq!(markup::strip(&lines[1]), "  gamma delta");
        assert!(lines.iter().all(|l| markup::width(l) <= 14));
    }

    #[test]
    fn test_styled_word_wraps_as_unit() {
        let lines = wrap("xxxx **bold**, yy", 8, "");
        let plain: Vec<String> = lines.iter().map(|l| markup::strip(l)).collect();
        assert_eq!(plain, vec!["xxxx", "bold, yy"]);
        assert_eq!(lines[1], "[bold]bold[/], yy");
    }

    #[test]
    fn test_brackets_in_prose_stay_literal() {
        let lines = render("see [docs](http://x) and [bold]", 80, &theme());
        assert_eq!(markup::strip(&lines[0]), "see [docs](http://x) and [bold]");
    }

    #[test]
    fn test_inline_heading_uses_heading_colour() {
        let lines = render("## Part", 40, &theme());
        assert_eq!(lines, vec!["[bold cyan]Part[/]"]);
    }

    #[test]
    fn test_multiple_spaces_preserved() {
        assert_eq!(wrap("a  b", 20, ""), vec!["a  b"]);
    }
}
