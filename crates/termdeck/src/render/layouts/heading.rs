use crate::layout;
use crate::render::fonts;
use crate::render::markup;
use crate::render::Context;

/// Title slide: the `#` heading in the h1 font, lines centered on each
/// other.
pub fn title(text: &str, ctx: &Context) -> Vec<String> {
    let h1 = &ctx.theme.h1;
    centered(fonts::render_heading(text, &h1.fonts, &h1.color, ctx.width))
}

/// Section slide: the `##` heading in the h2 font over a short rule.
pub fn section(text: &str, ctx: &Context) -> Vec<String> {
    let h2 = &ctx.theme.h2;
    let mut lines = fonts::render_heading(text, &h2.fonts, &h2.color, ctx.width);
    let rule_width = layout::max_line_len(&lines).min(ctx.width);
    lines.push(String::new());
    lines.push(markup::paint(&"─".repeat(rule_width), &ctx.theme.border_color));
    centered(lines)
}

fn centered(lines: Vec<String>) -> Vec<String> {
    let width = layout::max_line_len(&lines);
    lines
        .iter()
        .map(|line| match layout::horizontal_padding(width, markup::width(line)) {
            _ if line.is_empty() => String::new(),
            pad => format!("{}{line}", " ".repeat(pad)),
        })
        .collect()
}
