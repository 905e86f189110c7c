use crate::error::ParseError;
use crate::settings::{SettingValue, Settings};

/// Result of splitting the leading configuration block off a document.
#[derive(Debug)]
pub struct Extracted<'a> {
    pub settings: Settings,
    pub body: &'a str,
    /// 1-based source line of the first body line.
    pub body_start_line: usize,
}

/// Extract the optional `---` delimited frontmatter block and apply its
/// `key: value` entries on top of `base`. Unknown keys and unusable values
/// are pushed to `warnings` and otherwise ignored.
pub fn extract<'a>(
    content: &'a str,
    base: Settings,
    warnings: &mut Vec<String>,
) -> Result<Extracted<'a>, ParseError> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(no_frontmatter(content, base));
    };
    if first.trim_end() != "---" {
        return Ok(no_frontmatter(content, base));
    }

    let mut settings = base;
    let mut offset = first.len();
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        offset += line.len();
        let trimmed = line.trim();

        if line.trim_end() == "---" {
            return Ok(Extracted {
                settings,
                body: &content[offset..],
                body_start_line: line_no + 1,
            });
        }
        if trimmed.is_empty() {
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            warnings.push(format!(
                "frontmatter line {line_no}: expected 'key: value', got '{trimmed}'"
            ));
            continue;
        };
        let value = SettingValue::parse(strip_quotes(value.trim()));
        if let Err(reason) = settings.set(key, value) {
            warnings.push(format!("frontmatter line {line_no}: {reason}, ignoring"));
        }
    }

    Err(ParseError::UnterminatedFrontmatter)
}

fn no_frontmatter(content: &str, settings: Settings) -> Extracted<'_> {
    Extracted {
        settings,
        body: content,
        body_start_line: 1,
    }
}

/// Remove one layer of matching single or double quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BACKGROUND, FOOTER, H1_FONT, PAGINATION};

    fn run(content: &str) -> (Result<Extracted<'_>, ParseError>, Vec<String>) {
        let mut warnings = Vec::new();
        let result = extract(content, Settings::default(), &mut warnings);
        (result, warnings)
    }

    #[test]
    fn test_extract_frontmatter() {
        let content = "---\nbackground: black\nfooter: \"Acme: 2026\"\n---\n\n# Hello";
        let (result, warnings) = run(content);
        let extracted = result.unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(extracted.settings.text(BACKGROUND), "black");
        assert_eq!(extracted.settings.text(FOOTER), "Acme: 2026");
        assert_eq!(extracted.body, "\n# Hello");
        assert_eq!(extracted.body_start_line, 5);
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just a slide\n\nSome content";
        let (result, _) = run(content);
        let extracted = result.unwrap();
        assert_eq!(extracted.body, content);
        assert_eq!(extracted.body_start_line, 1);
        assert_eq!(extracted.settings, Settings::default());
    }

    #[test]
    fn test_booleans_and_aliases() {
        let content = "---\npagination: false\ntitle_font: 'wide,caps'\n---\nBody";
        let (result, _) = run(content);
        let settings = result.unwrap().settings;
        assert!(!settings.flag(PAGINATION));
        assert_eq!(settings.text(H1_FONT), "wide,caps");
    }

    #[test]
    fn test_unknown_key_warns_and_continues() {
        let content = "---\ntheme: dark\nbackground: navy\n---\nBody";
        let (result, warnings) = run(content);
        let extracted = result.unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown setting 'theme'"));
        assert_eq!(extracted.settings.text(BACKGROUND), "navy");
    }

    #[test]
    fn test_line_without_colon_warns() {
        let content = "---\njust words\n---\nBody";
        let (result, warnings) = run(content);
        assert!(result.is_ok());
        assert!(warnings[0].contains("line 2"));
    }

    #[test]
    fn test_unterminated_frontmatter_is_fatal() {
        let (result, _) = run("---\nbackground: black\n\n# Slide");
        assert_eq!(result.unwrap_err(), ParseError::UnterminatedFrontmatter);
    }

    #[test]
    fn test_bom_is_ignored() {
        let (result, _) = run("\u{feff}---\nbackground: red\n---\nBody");
        assert_eq!(result.unwrap().settings.text(BACKGROUND), "red");
    }
}
