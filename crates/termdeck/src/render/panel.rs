use super::markup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Rounded,
    Square,
    Double,
    Heavy,
    Ascii,
    None,
}

/// Corner and edge characters: top-left, top-right, bottom-left,
/// bottom-right, horizontal, vertical.
struct Glyphs([char; 6]);

impl BorderStyle {
    /// Unknown names fall back to the default style.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "square" => Self::Square,
            "double" => Self::Double,
            "heavy" => Self::Heavy,
            "ascii" => Self::Ascii,
            "none" => Self::None,
            _ => Self::Rounded,
        }
    }

    fn glyphs(self) -> Glyphs {
        match self {
            Self::Rounded => Glyphs(['╭', '╮', '╰', '╯', '─', '│']),
            Self::Square => Glyphs(['┌', '┐', '└', '┘', '─', '│']),
            Self::Double => Glyphs(['╔', '╗', '╚', '╝', '═', '║']),
            Self::Heavy => Glyphs(['┏', '┓', '┗', '┛', '━', '┃']),
            Self::Ascii => Glyphs(['+', '+', '+', '+', '-', '|']),
            Self::None => Glyphs([' '; 6]),
        }
    }
}

/// A bordered box. The border always takes one cell on every side, even
/// for [`BorderStyle::None`], so geometry does not depend on the style.
#[derive(Debug, Clone)]
pub struct Panel<'a> {
    pub style: BorderStyle,
    pub color: &'a str,
    /// Blank columns between the border and the content on each side.
    pub padding: usize,
    pub title: Option<&'a str>,
}

impl<'a> Panel<'a> {
    pub fn new(style: BorderStyle, color: &'a str) -> Self {
        Self {
            style,
            color,
            padding: 1,
            title: None,
        }
    }

    pub fn title(mut self, title: Option<&'a str>) -> Self {
        self.title = title;
        self
    }

    /// Columns available to content inside a panel `width` wide.
    pub fn interior_width(&self, width: usize) -> usize {
        width.saturating_sub(2 + 2 * self.padding)
    }

    /// Draw `lines` into a `width`×`height` box. Lines are cut or padded to
    /// the interior; rows past the interior are dropped.
    pub fn draw<S: AsRef<str>>(&self, lines: &[S], width: usize, height: usize) -> Vec<String> {
        if width < 2 || height < 2 {
            return vec![" ".repeat(width); height];
        }
        let Glyphs([tl, tr, bl, br, h, v]) = self.style.glyphs();
        let inner = width - 2;
        let content_width = self.interior_width(width);
        let pad = " ".repeat(self.padding.min(inner / 2));
        let side = markup::paint(&v.to_string(), self.color);

        let mut out = Vec::with_capacity(height);
        out.push(self.top_edge(tl, tr, h, inner));
        for row in 0..height - 2 {
            let line = lines.get(row).map(AsRef::as_ref).unwrap_or("");
            let body = markup::fit(line, content_width);
            let filler = " ".repeat(inner.saturating_sub(content_width + 2 * pad.len()));
            out.push(format!("{side}{pad}{body}{filler}{pad}{side}"));
        }
        let bottom: String = std::iter::once(bl)
            .chain(std::iter::repeat_n(h, inner))
            .chain(std::iter::once(br))
            .collect();
        out.push(markup::paint(&bottom, self.color));
        out
    }

    fn top_edge(&self, tl: char, tr: char, h: char, inner: usize) -> String {
        let title = self
            .title
            .filter(|t| !t.is_empty() && inner > 4)
            .map(|t| markup::truncate(&format!(" {} ", markup::escape(t)), inner - 2));
        let Some(title) = title else {
            let edge: String = std::iter::once(tl)
                .chain(std::iter::repeat_n(h, inner))
                .chain(std::iter::once(tr))
                .collect();
            return markup::paint(&edge, self.color);
        };
        let used = markup::width(&title);
        let lead: String = std::iter::once(tl).chain(std::iter::once(h)).collect();
        let trail: String = std::iter::repeat_n(h, inner.saturating_sub(used + 1))
            .chain(std::iter::once(tr))
            .collect();
        format!(
            "{}{title}{}",
            markup::paint(&lead, self.color),
            markup::paint(&trail, self.color)
        )
    }
}
