//! Pure placement arithmetic. Every function here works on sizes that were
//! already measured; nothing draws or touches the terminal.

use crate::render::markup;

/// Rows taken by a panel's top and bottom border.
pub const BORDER_HEIGHT: usize = 2;
/// Columns between adjacent columns of a multi-column slide.
pub const COLUMN_GUTTER: usize = 2;
/// Columns reserved around an image for its panel padding and border.
pub const IMAGE_ALLOWANCE: usize = 4;
/// Share of the width given to the text panel of an image slide.
pub const TEXT_PANEL_PERCENT: usize = 60;
/// Rows of the box drawn in place of an image that failed to load.
pub const PLACEHOLDER_HEIGHT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub top: usize,
    pub bottom: usize,
}

/// Split the free rows of a viewport around a block of content.
///
/// An odd remainder puts the extra row on top. Padding never goes negative;
/// with `keep_prompt` the bottom keeps at least one row for a trailing prompt.
pub fn vertical_padding(viewport: usize, content: usize, border: usize, keep_prompt: bool) -> Padding {
    let remaining = viewport.saturating_sub(content + border);
    let top = remaining.div_ceil(2);
    let mut bottom = remaining - top;
    if keep_prompt {
        bottom = bottom.max(1);
    }
    Padding { top, bottom }
}

/// Widest visible line, ignoring markup.
pub fn max_line_len<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .map(|l| markup::width(l.as_ref()))
        .max()
        .unwrap_or(0)
}

/// Left padding that centers a block of `max_line_len` columns.
pub fn horizontal_padding(available: usize, max_line_len: usize) -> usize {
    available.saturating_sub(max_line_len) / 2
}

/// Indent every line by the same amount so the block as a whole is
/// centered, whatever the individual line lengths.
pub fn center_block<S: AsRef<str>>(lines: &[S], available: usize) -> Vec<String> {
    indent_block(lines, horizontal_padding(available, max_line_len(lines)))
}

pub fn indent_block<S: AsRef<str>>(lines: &[S], pad: usize) -> Vec<String> {
    let indent = " ".repeat(pad);
    lines
        .iter()
        .map(|l| {
            let l = l.as_ref();
            if l.is_empty() {
                String::new()
            } else {
                format!("{indent}{l}")
            }
        })
        .collect()
}

/// Equal column widths with a fixed gutter between neighbours.
pub fn column_widths(count: usize, available: usize) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    let gutters = COLUMN_GUTTER * (count - 1);
    let share = available.saturating_sub(gutters) / count;
    vec![share.max(1); count]
}

/// Text and image panel widths for an image slide.
pub fn panel_split(width: usize) -> (usize, usize) {
    let left = width * TEXT_PANEL_PERCENT / 100;
    (left, width - left)
}

/// Image width in cells: the requested width clamped to what the panel can
/// hold, or 80% of the panel when nothing was requested.
pub fn image_width(requested: Option<usize>, available: usize) -> usize {
    let max = available.saturating_sub(IMAGE_ALLOWANCE).max(1);
    match requested {
        Some(w) => w.clamp(1, max),
        None => (available * 4 / 5).clamp(1, max),
    }
}

/// Rows needed to draw a `px_width`×`px_height` image `width` cells wide
/// with two pixel rows per cell.
pub fn image_rows(width: usize, px_width: u32, px_height: u32) -> usize {
    if px_width == 0 {
        return 0;
    }
    let scaled = (px_height as usize * width).div_ceil(px_width as usize);
    scaled.div_ceil(2).max(1)
}

/// Narrow an image until its rows fit `available_rows`, keeping the aspect
/// ratio.
pub fn fit_image(width: usize, px_width: u32, px_height: u32, available_rows: usize) -> usize {
    let rows = image_rows(width, px_width, px_height);
    if rows <= available_rows || rows == 0 {
        return width;
    }
    let mut fitted = (width * available_rows / rows).max(1);
    while fitted > 1 && image_rows(fitted, px_width, px_height) > available_rows {
        fitted -= 1;
    }
    fitted
}

/// Pad a block with blank lines to exactly `height` rows, centering it
/// vertically. Blocks taller than `height` are cut.
pub fn pad_to_height(mut lines: Vec<String>, height: usize) -> Vec<String> {
    lines.truncate(height);
    let padding = vertical_padding(height, lines.len(), 0, false);
    let mut out = Vec::with_capacity(height);
    out.extend(std::iter::repeat_n(String::new(), padding.top));
    out.extend(lines);
    out.extend(std::iter::repeat_n(String::new(), padding.bottom));
    out
}
