use super::Slide;
use super::fence::{SpanKind, tokenize};
use super::overrides;

/// A delimiter-separated piece of the body before trimming.
struct Chunk<'a> {
    text: &'a str,
    /// 1-based source line of the chunk's first line.
    line: usize,
}

/// Split a document body into numbered slides.
///
/// Slide delimiters are whole lines of `---`, `___` or `***` outside fenced
/// code. Empty chunks are dropped before numbering, so slide numbers are
/// always `1..=N`. `body_start_line` is the 1-based source line of the
/// body's first line.
pub fn split(body: &str, body_start_line: usize, warnings: &mut Vec<String>) -> Vec<Slide> {
    let spans = tokenize(body);

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut chunk_start = 0;
    let mut chunk_line = 0;
    for span in &spans {
        match &span.kind {
            SpanKind::Delimiter => {
                chunks.push(Chunk {
                    text: &body[chunk_start..span.range.start],
                    line: body_start_line + chunk_line,
                });
                chunk_start = span.range.end;
                chunk_line = span.line + 1;
            }
            SpanKind::Fence { closed: false, .. } => {
                warnings.push(format!(
                    "line {}: code fence is never closed, treating the rest of the slide as code",
                    body_start_line + span.line
                ));
            }
            _ => {}
        }
    }
    chunks.push(Chunk {
        text: &body[chunk_start..],
        line: body_start_line + chunk_line,
    });

    if chunks.len() == 1 {
        warnings.push(
            "no slide delimiters found (---, ___ or ***); the entire document is a single slide"
                .to_string(),
        );
    }

    let mut slides = Vec::new();
    for chunk in chunks {
        let trimmed = chunk.text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let leading = chunk.text.len() - chunk.text.trim_start().len();
        let line = chunk.line + chunk.text[..leading].matches('\n').count();
        let number = slides.len() + 1;

        if overrides::is_blank_marker(trimmed) {
            slides.push(Slide::blank(number, line));
            continue;
        }

        let (slide_overrides, content) = overrides::extract(trimmed, line, warnings);
        slides.push(Slide::new(number, content, line, slide_overrides));
    }
    slides
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_all(body: &str) -> (Vec<Slide>, Vec<String>) {
        let mut warnings = Vec::new();
        let slides = split(body, 1, &mut warnings);
        (slides, warnings)
    }

    #[test]
    fn test_dash_separator() {
        let (slides, warnings) = split_all("Slide one\n\n---\n\nSlide two");
        assert!(warnings.is_empty());
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].content, "Slide one");
        assert_eq!(slides[1].content, "Slide two");
    }

    #[test]
    fn test_all_delimiter_spellings() {
        let (slides, _) = split_all("one\n---\ntwo\n___\nthree\n***  \nfour");
        let contents: Vec<&str> = slides.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_numbers_dense_after_empty_chunks() {
        let (slides, _) = split_all("---\n\n---\none\n---\n   \n---\ntwo\n---\n");
        let numbers: Vec<usize> = slides.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(slides[1].content, "two");
    }

    #[test]
    fn test_fenced_rules_do_not_split() {
        let body = "# Demo\n\n```markdown\n---\nmore\n---\nend\n---\n```";
        let (slides, warnings) = split_all(body);
        assert_eq!(slides.len(), 1);
        assert!(slides[0].content.contains("more\n---\nend"));
        assert!(warnings[0].contains("no slide delimiters"));
    }

    #[test]
    fn test_single_slide_warns() {
        let (slides, warnings) = split_all("\n\n# Only slide\n\ntext\n\n");
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].content, "# Only slide\n\ntext");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_line_numbers_track_source() {
        let body = "# One\n\n---\n\n\n## Two\n---\nThree";
        let (slides, _) = split_all(body);
        let lines: Vec<usize> = slides.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![1, 6, 8]);

        let mut warnings = Vec::new();
        let offset = split(body, 4, &mut warnings);
        assert_eq!(offset[1].line, 9);
    }

    #[test]
    fn test_blank_marker_slide() {
        let (slides, warnings) =
            split_all("one\n---\n<!-- INTENTIONALLY BLANK -->\n---\n<!-- pagination: false -->");
        assert!(warnings.is_empty());
        assert_eq!(slides.len(), 3);
        assert!(slides[1].is_blank);
        assert!(slides[1].content.is_empty());
        assert!(slides[1].overrides.is_empty());
        assert!(!slides[2].is_blank);
        assert!(slides[2].overrides.contains_key("pagination"));
    }

    #[test]
    fn test_inline_dashes_are_content() {
        let (slides, _) = split_all("a --- b\n--- not alone");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_unclosed_fence_warns() {
        let (slides, warnings) = split_all("one\n---\n```\n---\nnever closed");
        assert_eq!(slides.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("line 3: code fence is never closed")));
    }
}
