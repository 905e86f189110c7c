use super::content;
use crate::error::ClassifyError;
use crate::layout;
use crate::parser::segments::{Reveal, find_images};
use crate::render::{Context, markup};

/// Text on the left 60%, the first image on the right 40%. Each panel is
/// vertically centered in the full body height on its own.
pub fn render(
    body: &str,
    ctx: &Context,
    reveal: &mut Reveal,
) -> Result<Vec<String>, ClassifyError> {
    let image = find_images(body)
        .into_iter()
        .next()
        .ok_or(ClassifyError::MissingImage)?;

    let rows = ctx.rows;
    let mut text = String::with_capacity(body.len());
    text.push_str(&body[..image.range.start]);
    text.push_str(&body[image.range.end..]);

    let (left_width, right_width) = layout::panel_split(ctx.width);
    let left = content::segments_block(text.trim(), left_width.saturating_sub(1), rows, ctx, reveal);
    let right = ctx
        .images
        .draw(&image.source, &image.alt, image.width, right_width, rows);
    let right = layout::center_block(&right, right_width);

    let height = rows.max(left.len()).max(right.len());
    let left = layout::pad_to_height(left, height);
    let right = layout::pad_to_height(right, height);
    Ok(left
        .iter()
        .zip(&right)
        .map(|(l, r)| format!("{}{}", markup::fit(l, left_width), markup::fit(r, right_width)))
        .collect())
}
