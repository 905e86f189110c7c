use std::sync::LazyLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::markup;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const TAB: &str = "    ";

/// Find a syntax by file extension first, then by name.
fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    let language = language.trim();
    if language.is_empty() {
        return None;
    }
    SYNTAXES
        .find_syntax_by_extension(language)
        .or_else(|| SYNTAXES.find_syntax_by_token(language))
        .or_else(|| SYNTAXES.find_syntax_by_name(language))
}

/// Highlight a code block into colour markup, one entry per source line.
/// Unknown languages and highlighting failures fall back to plain text.
pub fn highlight(code: &str, language: Option<&str>, theme_name: &str) -> Vec<String> {
    let code = code.replace('\t', TAB);
    let (Some(syntax), Some(theme)) = (
        language.and_then(find_syntax),
        THEMES.themes.get(theme_name),
    ) else {
        return plain(&code);
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(&code) {
        let ranges = match highlighter.highlight_line(line, &SYNTAXES) {
            Ok(ranges) => ranges,
            Err(e) => {
                tracing::debug!("syntax highlighting failed: {e}");
                return plain(&code);
            }
        };
        let mut out = String::new();
        for (style, text) in ranges {
            let text = text.trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                continue;
            }
            let c = style.foreground;
            out.push_str(&format!(
                "[#{:02x}{:02x}{:02x}]{}[/]",
                c.r,
                c.g,
                c.b,
                markup::escape(text)
            ));
        }
        lines.push(out);
    }
    lines
}

fn plain(code: &str) -> Vec<String> {
    code.lines().map(markup::escape).collect()
}
