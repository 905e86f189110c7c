//! Top-level presentation flow: load, compile, then either pre-flight or
//! run the interactive loop.

use crate::error::{DeckError, Result};
use crate::navigation::{Key, KeyMap, Navigator};
use crate::parser::{self, Presentation, Slide};
use crate::render::image_cache::ImageCache;
use crate::render::{self, Viewport};
use crate::settings::{SettingValue, Settings};
use crate::source::{self, Document};
use crate::terminal::{self, Session};
use crate::validate::{self, Report};

pub struct RunOptions {
    /// Path or `http(s)` URL of the document.
    pub input: String,
    /// Settings the document's frontmatter is applied over.
    pub settings: Settings,
    /// Command-line options, applied over the frontmatter.
    pub overrides: Vec<(String, SettingValue)>,
    pub keymap: KeyMap,
    /// 1-based slide to open on.
    pub start_slide: Option<usize>,
    pub strict: bool,
}

#[derive(Debug)]
pub enum Outcome {
    Presented,
    Validated(Report),
}

/// Compile the document over `settings`, then apply `overrides` on top of
/// its frontmatter. Compile warnings are logged.
pub fn compile(
    document: &Document,
    settings: Settings,
    overrides: &[(String, SettingValue)],
) -> Result<Presentation> {
    let mut pres = parser::parse(&document.text, settings).map_err(|source| DeckError::Parse {
        path: document.name.clone(),
        source,
    })?;
    for (key, value) in overrides {
        if let Err(e) = pres.settings.set(key, value.clone()) {
            pres.warnings.push(format!("command line: {e}"));
        }
    }
    for warning in &pres.warnings {
        tracing::warn!("{}: {warning}", document.name);
    }
    if pres.slides.is_empty() {
        return Err(DeckError::Empty(document.name.clone()));
    }
    tracing::info!("{} slides from {}", pres.slides.len(), document.name);
    Ok(pres)
}

pub fn run(options: RunOptions) -> Result<Outcome> {
    let document = source::load(&options.input)?;
    let pres = compile(&document, options.settings, &options.overrides)?;
    let images = ImageCache::new(document.base.clone());
    if let Some(path) = document.cached_path() {
        tracing::debug!("presenting cached copy {}", path.display());
    }

    if options.strict {
        let viewport = terminal::size().unwrap_or(Viewport::FALLBACK);
        return validate::check(&pres, viewport, &images).map(Outcome::Validated);
    }

    let totals: Vec<usize> = pres.slides.iter().map(Slide::progressive_bullets).collect();
    let start = options.start_slide.unwrap_or(1).saturating_sub(1);
    let mut nav = Navigator::starting_at(totals, start);

    let mut session = Session::start()?;
    loop {
        let frame = render::render_screen(
            &pres,
            nav.state(),
            session.viewport(),
            &images,
            &options.keymap,
        )?;
        session.draw(&frame)?;

        let key = session.read_key()?;
        if key == Key::Resize {
            continue;
        }
        let state = nav.apply(options.keymap.action(key));
        tracing::trace!("{key:?} -> {state:?}");
        if nav.is_exited() {
            break;
        }
    }
    drop(session);
    drop(document);
    Ok(Outcome::Presented)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_deck(text: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.md");
        std::fs::write(&path, text).unwrap();
        (dir, path.to_string_lossy().into_owned())
    }

    fn options(input: String) -> RunOptions {
        RunOptions {
            input,
            settings: Settings::default(),
            overrides: Vec::new(),
            keymap: KeyMap::default(),
            start_slide: None,
            strict: true,
        }
    }

    #[test]
    fn test_strict_run_reports_success() {
        let (_dir, path) = write_deck("# Hello\n---\n## World");
        let Outcome::Validated(report) = run(options(path)).unwrap() else {
            panic!("strict mode must not present");
        };
        assert_eq!(report.slides, 2);
    }

    #[test]
    fn test_command_line_beats_frontmatter() {
        let (_dir, path) = write_deck("---\nbackground: red\nfooter: Deck\n---\n# Hi");
        let document = source::load(&path).unwrap();
        let mut config = Settings::default();
        config.set("footer", SettingValue::parse("Config")).unwrap();
        config.set("border_style", SettingValue::parse("heavy")).unwrap();
        let overrides = vec![("background".to_string(), SettingValue::parse("navy"))];
        let pres = compile(&document, config, &overrides).unwrap();
        assert_eq!(pres.settings.text(crate::settings::BACKGROUND), "navy");
        assert_eq!(pres.settings.text(crate::settings::FOOTER), "Deck");
        assert_eq!(pres.settings.text(crate::settings::BORDER_STYLE), "heavy");
    }

    #[test]
    fn test_empty_deck_is_an_error() {
        let (_dir, path) = write_deck("\n\n---\n\n");
        let err = run(options(path)).unwrap_err();
        assert!(matches!(err, DeckError::Empty(_)));
    }

    #[test]
    fn test_unterminated_frontmatter_names_path() {
        let (_dir, path) = write_deck("---\ntitle: x\n# Hello");
        let err = run(options(path.clone())).unwrap_err();
        assert_eq!(err.to_string(), format!("failed to parse {path}"));
    }
}
