use std::ops::Range;

/// Structural classification of a run of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Text,
    /// A fenced code block, including its opening and closing lines.
    Fence {
        language: Option<String>,
        closed: bool,
    },
    /// A whole-line slide delimiter (`---`, `___` or `***`).
    Delimiter,
}

/// A contiguous byte range of the tokenized text. Spans are emitted in
/// document order and together cover the input exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub range: Range<usize>,
    /// 0-based index of the span's first line within the tokenized text.
    pub line: usize,
}

impl Span {
    /// The code between the fence lines. Empty for non-fence spans.
    pub fn code<'a>(&self, text: &'a str) -> &'a str {
        let SpanKind::Fence { closed, .. } = self.kind else {
            return "";
        };
        let body = &text[self.range.clone()];
        let after_open = body.find('\n').map(|i| &body[i + 1..]).unwrap_or("");
        if !closed {
            return after_open;
        }
        let trimmed = after_open.trim_end_matches(['\n', '\r']);
        match trimmed.rfind('\n') {
            Some(i) => &after_open[..i + 1],
            None => "",
        }
    }
}

struct OpenFence {
    start: usize,
    line: usize,
    language: Option<String>,
    ticks: usize,
}

/// Split text into text, fence and delimiter spans in a single pass.
/// Lines inside a fence are never treated as delimiters.
pub fn tokenize(text: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut open: Option<OpenFence> = None;
    let mut offset = 0;

    for (line_no, line) in text.split_inclusive('\n').enumerate() {
        let start = offset;
        offset += line.len();
        let content = line.trim_end_matches(['\n', '\r']);
        let trimmed = content.trim();

        if let Some(fence) = open.take() {
            if closes_fence(trimmed, fence.ticks) {
                spans.push(Span {
                    kind: SpanKind::Fence {
                        language: fence.language,
                        closed: true,
                    },
                    range: fence.start..offset,
                    line: fence.line,
                });
            } else {
                open = Some(fence);
            }
            continue;
        }

        if let Some((ticks, language)) = opens_fence(trimmed) {
            open = Some(OpenFence {
                start,
                line: line_no,
                language,
                ticks,
            });
            continue;
        }

        if is_delimiter(content) {
            spans.push(Span {
                kind: SpanKind::Delimiter,
                range: start..offset,
                line: line_no,
            });
            continue;
        }

        match spans.last_mut() {
            Some(last) if last.kind == SpanKind::Text && last.range.end == start => {
                last.range.end = offset;
            }
            _ => spans.push(Span {
                kind: SpanKind::Text,
                range: start..offset,
                line: line_no,
            }),
        }
    }

    if let Some(fence) = open {
        spans.push(Span {
            kind: SpanKind::Fence {
                language: fence.language,
                closed: false,
            },
            range: fence.start..text.len(),
            line: fence.line,
        });
    }

    spans
}

/// A slide delimiter, matched against the whole line with trailing
/// whitespace ignored.
pub fn is_delimiter(line: &str) -> bool {
    matches!(line.trim_end(), "---" | "___" | "***")
}

fn opens_fence(trimmed: &str) -> Option<(usize, Option<String>)> {
    let ticks = trimmed.chars().take_while(|&c| c == '`').count();
    if ticks < 3 {
        return None;
    }
    let info = trimmed[ticks..].trim();
    // Backticks in the info string mean this is inline code, not a fence
    if info.contains('`') {
        return None;
    }
    let language = info
        .split_whitespace()
        .next()
        .map(str::to_string)
        .filter(|s| !s.is_empty());
    Some((ticks, language))
}

fn closes_fence(trimmed: &str, ticks: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == '`').count();
    count >= ticks && trimmed[count..].trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<SpanKind> {
        tokenize(text).into_iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_spans_cover_input() {
        let text = "intro\n```rust\nfn main() {}\n```\n---\noutro";
        let spans = tokenize(text);
        let mut pos = 0;
        for span in &spans {
            assert_eq!(span.range.start, pos, "gap before {span:?}");
            pos = span.range.end;
        }
        assert_eq!(pos, text.len());
    }

    #[test]
    fn test_delimiter_inside_fence_is_code() {
        let text = "```\n---\n***\n___\n```\n";
        assert_eq!(
            kinds(text),
            vec![SpanKind::Fence {
                language: None,
                closed: true
            }]
        );
    }

    #[test]
    fn test_delimiters_whole_line_only() {
        let text = "a --- b\n---   \n***\nnot *** here";
        assert_eq!(
            kinds(text),
            vec![
                SpanKind::Text,
                SpanKind::Delimiter,
                SpanKind::Delimiter,
                SpanKind::Text
            ]
        );
    }

    #[test]
    fn test_fence_language_and_code() {
        let text = "```python\nprint('hi')\n# comment\n```\nafter";
        let spans = tokenize(text);
        assert_eq!(
            spans[0].kind,
            SpanKind::Fence {
                language: Some("python".into()),
                closed: true
            }
        );
        assert_eq!(spans[0].code(text), "print('hi')\n# comment\n");
        assert_eq!(spans[1].line, 4);
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let text = "before\n```\n---\nstill code";
        let spans = tokenize(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(
            spans[1].kind,
            SpanKind::Fence {
                language: None,
                closed: false
            }
        );
        assert_eq!(spans[1].code(text), "---\nstill code");
    }

    #[test]
    fn test_longer_fence_needs_longer_close() {
        let text = "````md\n```\ninner\n```\n````\n";
        let spans = tokenize(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].code(text), "```\ninner\n```\n");
    }

    #[test]
    fn test_empty_fence_has_no_code() {
        let text = "```\n```";
        assert_eq!(tokenize(text)[0].code(text), "");
    }
}
