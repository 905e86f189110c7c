use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::fence::{SpanKind, tokenize};
use crate::settings::{self, SettingValue};

static OVERRIDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--[ \t]*([A-Za-z][\w-]*)[ \t]*:[ \t]*(.*?)[ \t]*-->")
        .expect("Invalid override comment regex")
});

static BLANK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^<!--\s*intentionally\s+blank\s*-->$").expect("Invalid blank marker regex")
});

/// Whether a trimmed slide body is only the intentionally-blank marker.
pub fn is_blank_marker(trimmed: &str) -> bool {
    BLANK_RE.is_match(trimmed)
}

/// Collect `<!-- key: value -->` directives outside code fences and return
/// them with the content those comments removed from.
///
/// Only recognized directives (known key, value of the right shape) are
/// recorded and stripped; the last occurrence of a key wins. Anything else
/// is reported through `warnings` and left in place. Removing a comment can
/// join its neighbours into a new directive, so passes repeat until nothing
/// more is stripped.
pub fn extract(
    content: &str,
    first_line: usize,
    warnings: &mut Vec<String>,
) -> (BTreeMap<String, SettingValue>, String) {
    let mut overrides = BTreeMap::new();
    let (removals, mut stripped) = pass(content, first_line, &mut overrides, warnings);
    if removals == 0 {
        return (overrides, stripped);
    }
    loop {
        // Earlier passes already reported what they left behind.
        let mut repeated = Vec::new();
        let (removals, next) = pass(&stripped, first_line, &mut overrides, &mut repeated);
        if removals == 0 {
            return (overrides, stripped);
        }
        stripped = next;
    }
}

/// One scan over `content`. Returns how many comments were removed along
/// with the stripped text.
fn pass(
    content: &str,
    first_line: usize,
    overrides: &mut BTreeMap<String, SettingValue>,
    warnings: &mut Vec<String>,
) -> (usize, String) {
    let mut removals: Vec<Range<usize>> = Vec::new();

    for span in tokenize(content) {
        if span.kind != SpanKind::Text {
            continue;
        }
        let text = &content[span.range.clone()];
        for caps in OVERRIDE_RE.captures_iter(text) {
            let (Some(whole), Some(key), Some(value)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let start = span.range.start + whole.start();
            let line = first_line + content[..start].matches('\n').count();

            let Some(spec) = settings::lookup(key.as_str()) else {
                warnings.push(format!(
                    "line {line}: unknown override '{}', ignoring",
                    key.as_str()
                ));
                continue;
            };
            if !spec.kind.matches_override_token(value.as_str()) {
                warnings.push(format!(
                    "line {line}: override '{}' has malformed value '{}', ignoring",
                    spec.key,
                    value.as_str()
                ));
                continue;
            }
            let parsed = SettingValue::parse(value.as_str());
            if let Err(reason) = settings::validate(spec, &parsed) {
                warnings.push(format!(
                    "line {line}: override '{}': {reason}, ignoring",
                    spec.key
                ));
                continue;
            }

            overrides.insert(spec.key.to_string(), settings::canonical(spec, parsed));
            removals.push(start..span.range.start + whole.end());
        }
    }

    (removals.len(), strip(content, &removals))
}

/// Remove the given ranges. A line left holding only whitespace by a
/// removal is dropped entirely. The result is trimmed.
fn strip(content: &str, removals: &[Range<usize>]) -> String {
    if removals.is_empty() {
        return content.trim().to_string();
    }

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for range in removals {
        let line_start = content[..range.start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = content[range.end..]
            .find('\n')
            .map_or(content.len(), |i| range.end + i + 1);
        let whole_line = content[line_start..range.start].trim().is_empty()
            && content[range.end..line_end].trim().is_empty();
        let cut = if whole_line && line_start >= cursor {
            line_start..line_end
        } else {
            range.clone()
        };
        out.push_str(&content[cursor..cut.start]);
        cursor = cut.end;
    }
    out.push_str(&content[cursor..]);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(content: &str) -> (BTreeMap<String, SettingValue>, String, Vec<String>) {
        let mut warnings = Vec::new();
        let (overrides, stripped) = extract(content, 1, &mut warnings);
        (overrides, stripped, warnings)
    }

    #[test]
    fn test_pagination_override_is_recorded_and_stripped() {
        let (overrides, stripped, warnings) = run("# Title\n<!-- pagination: false -->\nBody");
        assert!(warnings.is_empty());
        assert_eq!(overrides.get("pagination"), Some(&SettingValue::Bool(false)));
        assert_eq!(stripped, "# Title\nBody");
        assert!(!stripped.contains("<!--"));
    }

    #[test]
    fn test_alias_is_canonicalized() {
        let (overrides, _, _) = run("<!-- title_font: wide,caps -->\n# Hi");
        assert_eq!(
            overrides.get("h1_font"),
            Some(&SettingValue::Text("wide,caps".into()))
        );
    }

    #[test]
    fn test_last_occurrence_wins() {
        let (overrides, _, _) = run("<!-- border_color: red -->\ntext\n<!-- border_color: green -->");
        assert_eq!(
            overrides.get("border_color"),
            Some(&SettingValue::Text("green".into()))
        );
    }

    #[test]
    fn test_override_inside_code_fence_is_not_applied() {
        let content = "Example:\n```html\n<!-- background: red -->\n```";
        let (overrides, stripped, _) = run(content);
        assert!(overrides.is_empty());
        assert_eq!(stripped, content);
    }

    #[test]
    fn test_unknown_key_warns_and_stays() {
        let (overrides, stripped, warnings) = run("<!-- speaker: notes here -->\nBody");
        assert!(overrides.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown override 'speaker'"));
        assert!(stripped.contains("<!-- speaker"));
    }

    #[test]
    fn test_malformed_colour_value_is_rejected() {
        let (overrides, _, warnings) = run("<!-- background: dark-red -->\nBody");
        assert!(overrides.is_empty());
        assert!(warnings[0].contains("malformed value"));
    }

    #[test]
    fn test_word_override_is_lower_cased() {
        let (overrides, _, _) = run("<!-- pagination_mode: Left -->\nBody");
        assert_eq!(
            overrides.get("pagination_mode"),
            Some(&SettingValue::Text("left".into()))
        );
    }

    #[test]
    fn test_inline_comment_keeps_surrounding_text() {
        let (_, stripped, _) = run("Hello <!-- footer: Q3 review --> world");
        assert_eq!(stripped, "Hello  world");
    }

    #[test]
    fn test_stripping_is_idempotent() {
        let content = "<!-- h2_color: red -->\n## Part\n\n<!-- pagination: true -->\n* one";
        let (_, once, _) = run(content);
        let (again_overrides, twice, _) = run(&once);
        assert!(again_overrides.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_comment_joined_by_removal_is_stripped_too() {
        let content = "<!<!-- pagination: false -->-- pagination: true -->\nbody";
        let (overrides, once, warnings) = run(content);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(once, "body");
        assert_eq!(overrides.get("pagination"), Some(&SettingValue::Bool(true)));

        let (again_overrides, twice, _) = run(&once);
        assert!(again_overrides.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blank_marker_case_insensitive() {
        assert!(is_blank_marker("<!-- Intentionally Blank -->"));
        assert!(is_blank_marker("<!--intentionally   blank-->"));
        assert!(!is_blank_marker("<!-- intentionally blank --> text"));
    }

    #[test]
    fn test_warning_reports_source_line() {
        let mut warnings = Vec::new();
        extract("a\nb\n<!-- nope: x -->", 10, &mut warnings);
        assert!(warnings[0].starts_with("line 12:"), "{warnings:?}");
    }
}
