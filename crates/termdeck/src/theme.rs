use crate::render::panel::BorderStyle;
use crate::settings::{self, Settings};

/// Heading font list and colour for one heading level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingStyle {
    pub fonts: String,
    pub color: String,
}

/// Drawing parameters resolved from one slide's effective settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub border_color: String,
    pub border_style: BorderStyle,
    pub h1: HeadingStyle,
    pub h2: HeadingStyle,
    pub h3: HeadingStyle,
    pub code_theme: &'static str,
}

impl Theme {
    pub fn from_settings(s: &Settings) -> Self {
        let heading = |font: &str, color: &str| HeadingStyle {
            fonts: s.text(font).to_string(),
            color: s.text(color).to_string(),
        };
        Self {
            border_color: s.text(settings::BORDER_COLOR).to_string(),
            border_style: BorderStyle::from_name(s.text(settings::BORDER_STYLE)),
            h1: heading(settings::H1_FONT, settings::H1_COLOR),
            h2: heading(settings::H2_FONT, settings::H2_COLOR),
            h3: heading(settings::H3_FONT, settings::H3_COLOR),
            code_theme: Self::code_theme_for(s.text(settings::BACKGROUND)),
        }
    }

    /// Pick a bundled highlighting theme that reads well on the background.
    fn code_theme_for(background: &str) -> &'static str {
        match background.to_lowercase().as_str() {
            "white" | "grey" | "gray" | "yellow" | "cyan" => "InspiredGitHub",
            _ => "base16-ocean.dark",
        }
    }
}
