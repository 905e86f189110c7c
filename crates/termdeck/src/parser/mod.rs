pub mod fence;
pub mod frontmatter;
pub mod overrides;
pub mod segments;
pub mod splitter;

use std::cell::OnceCell;
use std::collections::BTreeMap;

use crate::error::{ClassifyError, ParseError};
use crate::settings::{SettingValue, Settings};

#[derive(Debug, Clone)]
pub struct Presentation {
    pub settings: Settings,
    pub slides: Vec<Slide>,
    /// Non-fatal problems found while compiling the document.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based position in the deck.
    pub number: usize,
    /// Markdown body with override comments removed.
    pub content: String,
    pub is_blank: bool,
    /// 1-based source line where the slide's content starts.
    pub line: usize,
    pub overrides: BTreeMap<String, SettingValue>,
    bullets: OnceCell<usize>,
    metrics: OnceCell<SlideMetrics>,
}

/// Size of a slide's body rendered with every bullet visible. Kept so the
/// body does not shift while bullets are revealed one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideMetrics {
    /// Interior size the body was measured against.
    pub width: usize,
    pub rows: usize,
    pub height: usize,
    pub max_line_len: usize,
}

impl Slide {
    pub fn new(
        number: usize,
        content: String,
        line: usize,
        overrides: BTreeMap<String, SettingValue>,
    ) -> Self {
        Self {
            number,
            content,
            is_blank: false,
            line,
            overrides,
            bullets: OnceCell::new(),
            metrics: OnceCell::new(),
        }
    }

    pub fn blank(number: usize, line: usize) -> Self {
        Self {
            is_blank: true,
            ..Self::new(number, String::new(), line, BTreeMap::new())
        }
    }

    /// Number of `*` bullets revealed one step at a time. Computed once.
    pub fn progressive_bullets(&self) -> usize {
        *self
            .bullets
            .get_or_init(|| segments::count_progressive(&self.content))
    }

    /// Measurements for a `width`×`rows` interior, computed by `measure` on
    /// first use and cached. A request for another size (after a terminal
    /// resize) is measured fresh without replacing the cached record. Failed
    /// measurements are never cached.
    pub fn metrics<E>(
        &self,
        width: usize,
        rows: usize,
        measure: impl FnOnce() -> Result<SlideMetrics, E>,
    ) -> Result<SlideMetrics, E> {
        match self.metrics.get() {
            Some(cached) if cached.width == width && cached.rows == rows => Ok(*cached),
            Some(_) => measure(),
            None => {
                let measured = measure()?;
                Ok(*self.metrics.get_or_init(|| measured))
            }
        }
    }

    /// Global settings with this slide's overrides applied.
    pub fn effective_settings(&self, global: &Settings) -> Settings {
        global.with_overrides(&self.overrides)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Title { text: String },
    Section { text: String },
    MultiColumn,
    Image,
    Content,
}

impl Layout {
    pub fn name(&self) -> &'static str {
        match self {
            Layout::Title { .. } => "title",
            Layout::Section { .. } => "section",
            Layout::MultiColumn => "multi-column",
            Layout::Image => "image",
            Layout::Content => "content",
        }
    }
}

/// Compile a whole document: frontmatter over `base`, then slides.
pub fn parse(content: &str, base: Settings) -> Result<Presentation, ParseError> {
    let mut warnings = Vec::new();
    let extracted = frontmatter::extract(content, base, &mut warnings)?;
    let slides = splitter::split(extracted.body, extracted.body_start_line, &mut warnings);
    Ok(Presentation {
        settings: extracted.settings,
        slides,
        warnings,
    })
}

/// Pick the render path for a slide.
///
/// Precedence: title, section, multi-column, image, content. A slide that
/// opens like a title or section but carries further heading lines is
/// rejected here rather than during drawing.
pub fn classify(slide: &Slide) -> Result<Layout, ClassifyError> {
    if slide.is_blank {
        return Ok(Layout::Content);
    }
    let lines: Vec<&str> = slide
        .content
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if let Some(result) = heading_slide(&lines, "# ", "title") {
        return result.map(|text| Layout::Title { text });
    }
    if let Some(result) = heading_slide(&lines, "## ", "section") {
        return result.map(|text| Layout::Section { text });
    }
    if has_column_separator(&slide.content) {
        return Ok(Layout::MultiColumn);
    }

    let (_, body) = split_header(&slide.content);
    if let Some(image) = segments::find_images(body).first() {
        let mut rest = String::with_capacity(body.len());
        rest.push_str(&body[..image.range.start]);
        rest.push_str(&body[image.range.end..]);
        if !rest.trim().is_empty() {
            return Ok(Layout::Image);
        }
    }

    Ok(Layout::Content)
}

/// `Some` when the slide is a heading-only slide for `marker`; the inner
/// result reports extra heading lines as a contract violation.
fn heading_slide(
    lines: &[&str],
    marker: &str,
    layout: &'static str,
) -> Option<Result<String, ClassifyError>> {
    let (first, rest) = lines.split_first()?;
    let text = first.trim_start().strip_prefix(marker)?.trim();
    if text.is_empty() || rest.iter().any(|l| !l.trim_start().starts_with('#')) {
        return None;
    }
    if !rest.is_empty() {
        return Some(Err(ClassifyError::ExtraContent {
            layout,
            extra: rest.join("\n"),
        }));
    }
    Some(Ok(text.to_string()))
}

/// Whether `content` has a `|||` line outside code fences.
pub fn has_column_separator(content: &str) -> bool {
    fence::tokenize(content)
        .iter()
        .filter(|span| span.kind == fence::SpanKind::Text)
        .flat_map(|span| content[span.range.clone()].lines())
        .any(|line| line.trim() == "|||")
}

/// Separate a leading `### ` header line from the rest of the body.
pub fn split_header(content: &str) -> (Option<&str>, &str) {
    let content = content.trim_start();
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    match first.trim_end().strip_prefix("### ") {
        Some(header) if !header.trim().is_empty() => (Some(header.trim()), rest.trim_start()),
        _ => (None, content),
    }
}
