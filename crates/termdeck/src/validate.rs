//! Strict pre-flight: check every slide without presenting.

use crate::error::{DeckError, Result};
use crate::parser::Presentation;
use crate::render::image_cache::ImageCache;
use crate::render::{Viewport, fit_slide};

/// Outcome of a successful pre-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub slides: usize,
    pub viewport: Viewport,
}

/// Classify and measure every slide at full reveal against `viewport`.
/// Classification failures, overflowing slides and image failures are
/// collected and returned together.
pub fn check(pres: &Presentation, viewport: Viewport, images: &ImageCache) -> Result<Report> {
    let mut problems = Vec::new();
    for (index, slide) in pres.slides.iter().enumerate() {
        if slide.is_blank {
            continue;
        }
        match fit_slide(pres, index, viewport, images) {
            Ok(fit) if fit.overflows() => problems.push(format!(
                "slide {} (line {}): content needs {} rows but only {} fit in {}x{}",
                slide.number,
                slide.line,
                fit.metrics.height,
                fit.available,
                viewport.width,
                viewport.height
            )),
            Ok(_) => {}
            Err(e) => problems.push(format!("{:#}", anyhow::Error::from(e))),
        }
    }
    for (source, error) in images.failures() {
        problems.push(format!("image {source}: {error}"));
    }

    tracing::debug!(
        "checked {} slides at {}x{}, {} problem(s)",
        pres.slides.len(),
        viewport.width,
        viewport.height,
        problems.len()
    );
    if problems.is_empty() {
        Ok(Report {
            slides: pres.slides.len(),
            viewport,
        })
    } else {
        Err(DeckError::Validation(problems))
    }
}
