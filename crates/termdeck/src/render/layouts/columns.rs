use super::content;
use crate::layout::{self, COLUMN_GUTTER};
use crate::parser::fence::{SpanKind, tokenize};
use crate::parser::segments::Reveal;
use crate::render::{Context, markup};

/// Split a body on `|||` lines that sit outside code fences.
pub fn split_columns(body: &str) -> Vec<&str> {
    let mut columns = Vec::new();
    let mut start = 0;
    for span in tokenize(body) {
        if span.kind != SpanKind::Text {
            continue;
        }
        let mut offset = span.range.start;
        for line in body[span.range.clone()].split_inclusive('\n') {
            if line.trim() == "|||" {
                columns.push(&body[start..offset]);
                start = offset + line.len();
            }
            offset += line.len();
        }
    }
    columns.push(&body[start..]);
    columns
}

/// Equal-width columns side by side. Bullets reveal column by column, left
/// to right. An empty column still takes its share of the width.
pub fn render(body: &str, ctx: &Context, reveal: &mut Reveal) -> Vec<String> {
    let columns = split_columns(body);
    let widths = layout::column_widths(columns.len(), ctx.width);
    let rendered: Vec<Vec<String>> = columns
        .iter()
        .zip(&widths)
        .map(|(column, &width)| {
            let column = column.trim();
            if column.is_empty() {
                Vec::new()
            } else {
                content::segments_block(column, width, ctx.rows, ctx, reveal)
            }
        })
        .collect();

    let height = rendered.iter().map(Vec::len).max().unwrap_or(0);
    let gutter = " ".repeat(COLUMN_GUTTER);
    let mut lines = Vec::with_capacity(height);
    for row in 0..height {
        let cells: Vec<String> = rendered
            .iter()
            .zip(&widths)
            .map(|(column, &width)| {
                markup::fit(column.get(row).map(String::as_str).unwrap_or(""), width)
            })
            .collect();
        lines.push(cells.join(&gutter));
    }
    lines
}
