use crate::layout;
use crate::parser::segments::{self, Reveal, Segment};
use crate::render::{Context, fonts, markup, syntax, text};

/// Default layout: the body's segments in document order.
pub fn render(body: &str, ctx: &Context, reveal: &mut Reveal) -> Vec<String> {
    segments_block(body, ctx.width, ctx.rows, ctx, reveal)
}

/// A `###` header in the h3 font, centered across `ctx.width`.
pub fn header_lines(header: &str, ctx: &Context) -> Vec<String> {
    let h3 = &ctx.theme.h3;
    fonts::render_heading(header, &h3.fonts, &h3.color, ctx.width)
        .into_iter()
        .map(|line| {
            let pad = layout::horizontal_padding(ctx.width, markup::width(&line));
            format!("{}{line}", " ".repeat(pad))
        })
        .collect()
}

/// Segments of `body` drawn into a block `width` columns wide. Images get at
/// most `rows` rows.
pub fn segments_block(
    body: &str,
    width: usize,
    rows: usize,
    ctx: &Context,
    reveal: &mut Reveal,
) -> Vec<String> {
    let mut lines = Vec::new();
    for segment in reveal.apply(segments::parse(body)) {
        match segment {
            Segment::Text(t) => lines.extend(text::render(&t, width, ctx.theme)),
            Segment::Code { language, code } => {
                let code_width = width.saturating_sub(2);
                lines.extend(
                    syntax::highlight(&code, language.as_deref(), ctx.theme.code_theme)
                        .iter()
                        .map(|line| format!("  {}", markup::truncate(line, code_width))),
                );
            }
            Segment::Image { alt, source, width: requested } => {
                let cells = ctx.images.draw(&source, &alt, requested, width, rows);
                let pad = layout::horizontal_padding(width, layout::max_line_len(&cells));
                lines.extend(layout::indent_block(&cells, pad));
            }
        }
    }
    lines
}
