use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::fence::{SpanKind, tokenize};

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)(?:\{width=(\d+)\})?").expect("Invalid image regex")
});

static PROGRESSIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*\s").expect("Invalid progressive bullet regex"));

static STATIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s").expect("Invalid static bullet regex"));

/// A typed fragment of a slide body, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Code {
        language: Option<String>,
        code: String,
    },
    Image {
        alt: String,
        source: String,
        width: Option<usize>,
    },
}

/// An image reference found outside code fences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub range: Range<usize>,
    pub alt: String,
    pub source: String,
    pub width: Option<usize>,
}

impl ImageRef {
    pub fn to_segment(&self) -> Segment {
        Segment::Image {
            alt: self.alt.clone(),
            source: self.source.clone(),
            width: self.width,
        }
    }
}

/// Image references in `text`, skipping any that sit inside a fenced code
/// block. Fences are located first so their contents never match.
pub fn find_images(text: &str) -> Vec<ImageRef> {
    let mut images = Vec::new();
    for span in tokenize(text) {
        if span.kind != SpanKind::Text {
            continue;
        }
        let chunk = &text[span.range.clone()];
        for caps in IMAGE_RE.captures_iter(chunk) {
            let Some(whole) = caps.get(0) else { continue };
            images.push(ImageRef {
                range: span.range.start + whole.start()..span.range.start + whole.end(),
                alt: caps.get(1).map_or("", |m| m.as_str()).to_string(),
                source: caps.get(2).map_or("", |m| m.as_str()).to_string(),
                // Digits only, so a failed parse is an overflow.
                width: caps.get(3).map(|m| m.as_str().parse().unwrap_or(usize::MAX)),
            });
        }
    }
    images
}

/// Break a slide body into text, code and image segments. Every byte of the
/// body outside code and image matches lands in exactly one text segment.
pub fn parse(body: &str) -> Vec<Segment> {
    if body.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(Range<usize>, Segment)> = Vec::new();
    for span in tokenize(body) {
        if let SpanKind::Fence { language, .. } = &span.kind {
            let code = span.code(body).to_string();
            matches.push((
                span.range.clone(),
                Segment::Code {
                    language: language.clone(),
                    code,
                },
            ));
        }
    }
    for image in find_images(body) {
        matches.push((image.range.clone(), image.to_segment()));
    }

    if matches.is_empty() {
        return vec![Segment::Text(body.to_string())];
    }
    matches.sort_by_key(|(range, _)| range.start);

    let mut segments = Vec::with_capacity(matches.len() * 2 + 1);
    let mut cursor = 0;
    for (range, segment) in matches {
        if range.start > cursor {
            segments.push(Segment::Text(body[cursor..range.start].to_string()));
        }
        segments.push(segment);
        cursor = range.end;
    }
    if cursor < body.len() {
        segments.push(Segment::Text(body[cursor..].to_string()));
    }
    segments
}

pub fn is_progressive_bullet(line: &str) -> bool {
    PROGRESSIVE_RE.is_match(line.trim_end_matches(['\n', '\r']))
}

pub fn is_static_bullet(line: &str) -> bool {
    STATIC_RE.is_match(line.trim_end_matches(['\n', '\r']))
}

/// Number of progressive bullets outside code fences.
pub fn count_progressive(body: &str) -> usize {
    tokenize(body)
        .iter()
        .filter(|span| span.kind == SpanKind::Text)
        .flat_map(|span| body[span.range.clone()].lines())
        .filter(|line| is_progressive_bullet(line))
        .count()
}

/// Hides progressive bullets past the visible threshold. The counter is
/// carried across every text segment fed through one filter, so several
/// segments (or columns) share a single reveal order.
#[derive(Debug, Clone)]
pub struct Reveal {
    visible: usize,
    seen: usize,
}

impl Reveal {
    pub fn new(visible: usize) -> Self {
        Self { visible, seen: 0 }
    }

    /// Reveal everything.
    pub fn all() -> Self {
        Self::new(usize::MAX)
    }

    /// Progressive bullets encountered so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// Replace hidden bullets with blank lines so later lines keep their
    /// vertical position and the body keeps its height. `text` starts at a
    /// line boundary.
    pub fn filter_text(&mut self, text: &str) -> String {
        self.filter(text, true)
    }

    fn filter(&mut self, text: &str, line_start: bool) -> String {
        let mut out = String::with_capacity(text.len());
        for (i, line) in text.split_inclusive('\n').enumerate() {
            if (i > 0 || line_start) && is_progressive_bullet(line) {
                self.seen += 1;
                if self.seen > self.visible {
                    out.push('\n');
                    continue;
                }
            }
            out.push_str(line);
        }
        out
    }

    /// Filter the text segments of one body. Text that follows an inline
    /// image continues that image's line, so it never opens a bullet.
    pub fn apply(&mut self, segments: Vec<Segment>) -> Vec<Segment> {
        let mut line_start = true;
        let mut out = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Text(text) => {
                    let filtered = self.filter(&text, line_start);
                    line_start = text.ends_with('\n');
                    out.push(Segment::Text(filtered));
                }
                Segment::Image { .. } => {
                    line_start = false;
                    out.push(segment);
                }
                Segment::Code { .. } => {
                    line_start = true;
                    out.push(segment);
                }
            }
        }
        out
    }
}
