pub mod fonts;
pub mod image_cache;
pub mod layouts;
pub mod markup;
pub mod panel;
pub mod syntax;
pub mod text;

use crossterm::style::Color;

use crate::error::{ClassifyError, DeckError, Result};
use crate::layout::{self, BORDER_HEIGHT};
use crate::navigation::{Action, KeyMap, NavState};
use crate::parser::segments::Reveal;
use crate::parser::{self, Layout, Presentation, Slide, SlideMetrics};
use crate::settings::{self, Settings};
use crate::theme::Theme;

use image_cache::ImageCache;
use panel::Panel;

/// Terminal size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    /// Size assumed when no terminal is attached.
    pub const FALLBACK: Viewport = Viewport {
        width: 80,
        height: 24,
    };

    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// One full screen of markup lines, each exactly `viewport.width` wide.
#[derive(Debug, Clone)]
pub struct Frame {
    pub lines: Vec<String>,
    pub background: Color,
    pub foreground: Color,
}

impl Frame {
    fn new(lines: Vec<String>, viewport: Viewport, settings: &Settings) -> Self {
        let color = |key| markup::parse_color(settings.text(key)).unwrap_or(Color::Reset);
        let mut lines: Vec<String> = lines
            .iter()
            .map(|line| markup::fit(line, viewport.width))
            .collect();
        lines.resize(viewport.height, " ".repeat(viewport.width));
        Self {
            lines,
            background: color(settings::BACKGROUND),
            foreground: color(settings::FOREGROUND),
        }
    }
}

/// What a layout needs to draw one slide body.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub theme: &'a Theme,
    pub images: &'a ImageCache,
    /// Columns available to the body.
    pub width: usize,
    /// Rows available to the body.
    pub rows: usize,
}

/// Screen areas of a slide for one set of effective settings.
struct Geometry {
    header: Option<String>,
    footer: bool,
    panel_height: usize,
}

impl Geometry {
    fn new(settings: &Settings, viewport: Viewport) -> Self {
        let header = settings.optional_text(settings::HEADER).map(str::to_string);
        let footer =
            settings.flag(settings::PAGINATION) || settings.optional_text(settings::FOOTER).is_some();
        let chrome = usize::from(header.is_some()) + usize::from(footer);
        Self {
            header,
            footer,
            panel_height: viewport.height.saturating_sub(chrome),
        }
    }
}

/// A slide's drawn content: `###` header rows centered across the panel,
/// then the body block.
pub struct Composed {
    pub header: Vec<String>,
    pub body: Vec<String>,
}

impl Composed {
    pub fn height(&self) -> usize {
        self.header.len() + self.body.len()
    }
}

/// Draw a slide's content for its layout, with progressive bullets filtered
/// through `reveal`.
pub fn compose(
    slide: &Slide,
    layout: &Layout,
    ctx: &Context,
    reveal: &mut Reveal,
) -> std::result::Result<Composed, ClassifyError> {
    let (header, body) = match layout {
        Layout::Title { text } => {
            return Ok(Composed {
                header: Vec::new(),
                body: layouts::heading::title(text, ctx),
            });
        }
        Layout::Section { text } => {
            return Ok(Composed {
                header: Vec::new(),
                body: layouts::heading::section(text, ctx),
            });
        }
        _ => parser::split_header(&slide.content),
    };

    let mut header_lines = Vec::new();
    if let Some(header) = header {
        header_lines.extend(layouts::content::header_lines(header, ctx));
        header_lines.push(String::new());
    }
    let body_ctx = Context {
        rows: ctx.rows.saturating_sub(header_lines.len()),
        ..*ctx
    };
    let body = match layout {
        Layout::MultiColumn => layouts::columns::render(body, &body_ctx, reveal),
        Layout::Image => layouts::image_slide::render(body, &body_ctx, reveal)?,
        _ => layouts::content::render(body, &body_ctx, reveal),
    };
    Ok(Composed {
        header: header_lines,
        body,
    })
}

fn classify_error(slide: &Slide) -> impl FnOnce(ClassifyError) -> DeckError {
    let (number, line) = (slide.number, slide.line);
    move |source| DeckError::Classify {
        number,
        line,
        source,
    }
}

/// Everything needed to draw one slide at one viewport size.
struct Plan<'a> {
    slide: &'a Slide,
    settings: Settings,
    theme: Theme,
    layout: Layout,
    geometry: Geometry,
}

impl<'a> Plan<'a> {
    fn new(pres: &'a Presentation, index: usize, viewport: Viewport) -> Result<Self> {
        let slide = &pres.slides[index];
        let settings = slide.effective_settings(&pres.settings);
        let layout = parser::classify(slide).map_err(classify_error(slide))?;
        tracing::trace!("slide {} is a {} slide", slide.number, layout.name());
        Ok(Self {
            slide,
            theme: Theme::from_settings(&settings),
            geometry: Geometry::new(&settings, viewport),
            settings,
            layout,
        })
    }

    fn panel(&self) -> Panel<'_> {
        Panel::new(self.theme.border_style, &self.theme.border_color)
    }

    fn context<'c>(&'c self, images: &'c ImageCache, viewport: Viewport) -> Context<'c> {
        Context {
            theme: &self.theme,
            images,
            width: self.panel().interior_width(viewport.width),
            rows: self.geometry.panel_height.saturating_sub(BORDER_HEIGHT),
        }
    }

    /// Size of the slide at full reveal, cached on the slide.
    fn metrics(&self, ctx: &Context) -> Result<SlideMetrics> {
        self.slide.metrics(ctx.width, ctx.rows, || -> Result<SlideMetrics> {
            let composed = compose(self.slide, &self.layout, ctx, &mut Reveal::all())
                .map_err(classify_error(self.slide))?;
            Ok(SlideMetrics {
                width: ctx.width,
                rows: ctx.rows,
                height: composed.height(),
                max_line_len: layout::max_line_len(&composed.body),
            })
        })
    }
}

/// Result of checking one slide against a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    pub metrics: SlideMetrics,
    /// Rows available inside the slide panel.
    pub available: usize,
}

impl Fit {
    pub fn overflows(&self) -> bool {
        self.metrics.height > self.available
    }
}

/// Classify and measure one slide without drawing it.
pub fn fit_slide(
    pres: &Presentation,
    index: usize,
    viewport: Viewport,
    images: &ImageCache,
) -> Result<Fit> {
    let plan = Plan::new(pres, index, viewport)?;
    let ctx = plan.context(images, viewport);
    Ok(Fit {
        metrics: plan.metrics(&ctx)?,
        available: ctx.rows,
    })
}

/// Draw slide `index` with `reveal` progressive bullets showing.
pub fn render_slide(
    pres: &Presentation,
    index: usize,
    reveal: usize,
    viewport: Viewport,
    images: &ImageCache,
) -> Result<Frame> {
    let slide = &pres.slides[index];
    if slide.is_blank {
        let settings = slide.effective_settings(&pres.settings);
        return Ok(Frame::new(Vec::new(), viewport, &settings));
    }

    let plan = Plan::new(pres, index, viewport)?;
    let ctx = plan.context(images, viewport);
    let metrics = plan.metrics(&ctx)?;
    let composed = compose(slide, &plan.layout, &ctx, &mut Reveal::new(reveal))
        .map_err(classify_error(slide))?;

    let padding = layout::vertical_padding(
        plan.geometry.panel_height,
        metrics.height,
        BORDER_HEIGHT,
        false,
    );
    let left = layout::horizontal_padding(ctx.width, metrics.max_line_len);
    let mut rows = vec![String::new(); padding.top];
    rows.extend(composed.header);
    rows.extend(layout::indent_block(&composed.body, left));

    let mut lines = Vec::with_capacity(viewport.height);
    if let Some(header) = &plan.geometry.header {
        let header = markup::paint(&markup::escape(header), "dark_grey");
        lines.extend(layout::center_block(&[header], viewport.width));
    }
    lines.extend(plan.panel().draw(&rows, viewport.width, plan.geometry.panel_height));
    if plan.geometry.footer {
        lines.push(footer_line(
            &plan.settings,
            slide.number,
            pres.slides.len(),
            viewport.width,
        ));
    }
    Ok(Frame::new(lines, viewport, &plan.settings))
}

/// Page indicator text for `pagination_style`.
pub fn pagination_label(style: &str, number: usize, total: usize) -> String {
    match style {
        "number" => number.to_string(),
        "slide" => format!("Slide {number} of {total}"),
        _ => format!("{number}/{total}"),
    }
}

fn footer_line(settings: &Settings, number: usize, total: usize, width: usize) -> String {
    let footer = settings
        .optional_text(settings::FOOTER)
        .map(markup::escape)
        .unwrap_or_default();
    let label = if settings.flag(settings::PAGINATION) {
        pagination_label(settings.text(settings::PAGINATION_STYLE), number, total)
    } else {
        String::new()
    };
    let inner = width.saturating_sub(2);
    let label_width = markup::width(&label);
    let line = match settings.text(settings::PAGINATION_MODE) {
        "left" => {
            let gap = inner.saturating_sub(label_width + markup::width(&footer));
            format!("{label}{}{footer}", " ".repeat(gap))
        }
        "center" => {
            let start = inner.saturating_sub(label_width) / 2;
            let lead = markup::fit(&footer, start);
            format!("{lead}{label}")
        }
        _ => {
            let gap = inner.saturating_sub(label_width + markup::width(&footer));
            format!("{footer}{}{label}", " ".repeat(gap))
        }
    };
    format!(" [dim]{}[/] ", markup::truncate(&line, inner))
}

/// Key binding list shown over the deck.
pub fn render_help(pres: &Presentation, viewport: Viewport, keymap: &KeyMap) -> Frame {
    let mut body = Vec::new();
    for action in Action::BOUND {
        let keys: Vec<String> = keymap.keys(action).iter().map(|k| k.label()).collect();
        body.push(format!(
            "[bold]{:<14}[/] {}",
            action.description(),
            markup::escape(&keys.join(", "))
        ));
    }
    body.push(String::new());
    body.push("[dim]Press any key to return[/]".to_string());

    let width = (layout::max_line_len(&body) + 6).min(viewport.width);
    let height = (body.len() + 2 * BORDER_HEIGHT).min(viewport.height);
    let theme = Theme::from_settings(&pres.settings);
    let panel = Panel::new(theme.border_style, &theme.border_color).title(Some("Help"));
    let rows = layout::pad_to_height(body, height.saturating_sub(BORDER_HEIGHT));
    let boxed = panel.draw(&rows, width, height);

    let padding = layout::vertical_padding(viewport.height, height, 0, false);
    let mut lines = vec![String::new(); padding.top];
    lines.extend(layout::center_block(&boxed, viewport.width));
    Frame::new(lines, viewport, &pres.settings)
}

/// Boundary screen shown after the last slide, with a key prompt on the
/// bottom row.
pub fn render_end(pres: &Presentation, viewport: Viewport, keymap: &KeyMap) -> Frame {
    let message = "[bold]End of presentation[/]".to_string();
    let first_key = |action| {
        keymap
            .keys(action)
            .first()
            .map(|k| k.label())
            .unwrap_or_default()
    };
    let prompt = format!(
        "[dim]{} back · {} quit[/]",
        markup::escape(&first_key(Action::Previous)),
        markup::escape(&first_key(Action::Exit))
    );

    let padding = layout::vertical_padding(viewport.height, 1, 0, true);
    let mut lines = vec![String::new(); padding.top];
    lines.extend(layout::center_block(&[message], viewport.width));
    lines.extend(std::iter::repeat_n(String::new(), padding.bottom.saturating_sub(1)));
    lines.truncate(viewport.height.saturating_sub(1));
    lines.extend(layout::center_block(&[prompt], viewport.width));
    Frame::new(lines, viewport, &pres.settings)
}

/// Draw whatever the navigation state calls for.
pub fn render_screen(
    pres: &Presentation,
    state: &NavState,
    viewport: Viewport,
    images: &ImageCache,
    keymap: &KeyMap,
) -> Result<Frame> {
    match *state {
        NavState::Viewing { slide, reveal } => render_slide(pres, slide, reveal, viewport, images),
        NavState::HelpOverlay { .. } => Ok(render_help(pres, viewport, keymap)),
        NavState::EndBoundary => Ok(render_end(pres, viewport, keymap)),
        NavState::Exited => Ok(Frame::new(Vec::new(), viewport, &pres.settings)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::settings::Settings;
    use image::{Rgba, RgbaImage};

    pub fn with_context(width: usize, rows: usize, f: impl FnOnce(&Context)) {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), width, rows, f);
    }

    /// Like [`with_context`] with a 20x20 `red.png` next to the deck.
    pub fn with_image(width: usize, rows: usize, f: impl FnOnce(&Context)) {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(20, 20, Rgba([255, 0, 0, 255]))
            .save(dir.path().join("red.png"))
            .unwrap();
        run(dir.path(), width, rows, f);
    }

    fn run(dir: &std::path::Path, width: usize, rows: usize, f: impl FnOnce(&Context)) {
        let theme = Theme::from_settings(&Settings::default());
        let images = ImageCache::new(image_cache::Base::Dir(dir.to_path_buf()));
        let ctx = Context {
            theme: &theme,
            images: &images,
            width,
            rows,
        };
        f(&ctx);
    }
}
