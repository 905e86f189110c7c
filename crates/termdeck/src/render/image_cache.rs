use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use image::DynamicImage;
use image::imageops::FilterType;

use super::markup;
use super::panel::{BorderStyle, Panel};
use crate::error::ResourceError;
use crate::layout::{self, PLACEHOLDER_HEIGHT};

/// Where relative image references are resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base {
    Dir(PathBuf),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Path(PathBuf),
    Url(String),
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

impl Base {
    fn resolve(&self, source: &str) -> Location {
        if is_url(source) {
            return Location::Url(source.to_string());
        }
        match self {
            Base::Dir(dir) => Location::Path(dir.join(source)),
            Base::Url(url) => Location::Url(join_url(url, source)),
        }
    }
}

/// Resolve `source` against a document URL. Absolute paths keep the
/// scheme and host; relative paths replace the last path segment.
fn join_url(base: &str, source: &str) -> String {
    let base = base.split(['?', '#']).next().unwrap_or(base);
    let after_scheme = base.find("://").map_or(0, |i| i + 3);
    let host_end = base[after_scheme..]
        .find('/')
        .map_or(base.len(), |i| after_scheme + i);
    if let Some(absolute) = source.strip_prefix('/') {
        return format!("{}/{absolute}", &base[..host_end]);
    }
    let dir_end = base[host_end..]
        .rfind('/')
        .map_or(base.len(), |i| host_end + i);
    let source = source.strip_prefix("./").unwrap_or(source);
    format!("{}/{source}", &base[..dir_end])
}

type Entry = Result<Rc<DynamicImage>, ResourceError>;

/// Decoded images for one presentation session. Each source is fetched and
/// decoded at most once; failures are remembered too.
pub struct ImageCache {
    base: Base,
    entries: RefCell<HashMap<String, Entry>>,
}

impl ImageCache {
    pub fn new(base: Base) -> Self {
        Self {
            base,
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn load(&self, source: &str) -> Entry {
        if let Some(entry) = self.entries.borrow().get(source) {
            return entry.clone();
        }
        let entry = self.fetch(source).map(Rc::new);
        if let Err(e) = &entry {
            tracing::debug!("{e}");
        }
        self.entries
            .borrow_mut()
            .insert(source.to_string(), entry.clone());
        entry
    }

    fn fetch(&self, source: &str) -> Result<DynamicImage, ResourceError> {
        let bytes = match self.base.resolve(source) {
            Location::Path(path) => std::fs::read(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ResourceError::NotFound(path.display().to_string())
                } else {
                    ResourceError::Decode {
                        source_name: path.display().to_string(),
                        reason: e.to_string(),
                    }
                }
            })?,
            Location::Url(url) => {
                tracing::debug!("fetching image {url}");
                let network = |e: ureq::Error| ResourceError::Network {
                    url: url.clone(),
                    reason: e.to_string(),
                };
                let mut response = ureq::get(&url).call().map_err(network)?;
                response.body_mut().read_to_vec().map_err(network)?
            }
        };
        image::load_from_memory(&bytes).map_err(|e| ResourceError::Decode {
            source_name: source.to_string(),
            reason: e.to_string(),
        })
    }

    /// Every image that failed to load so far, by source.
    pub fn failures(&self) -> Vec<(String, ResourceError)> {
        let mut failures: Vec<_> = self
            .entries
            .borrow()
            .iter()
            .filter_map(|(source, entry)| {
                entry.as_ref().err().map(|e| (source.clone(), e.clone()))
            })
            .collect();
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        failures
    }

    /// Draw an image no wider than `max_width` cells and no taller than
    /// `max_rows`, or a placeholder of the same footprint when it cannot
    /// be loaded.
    pub fn draw(
        &self,
        source: &str,
        alt: &str,
        requested: Option<usize>,
        max_width: usize,
        max_rows: usize,
    ) -> Vec<String> {
        let width = layout::image_width(requested, max_width);
        match self.load(source) {
            Ok(img) => {
                let width = layout::fit_image(width, img.width(), img.height(), max_rows);
                cells(&img, width)
            }
            Err(_) => placeholder(alt, width, PLACEHOLDER_HEIGHT.min(max_rows.max(3))),
        }
    }
}

/// Half-block cells: each character holds two vertically stacked pixels,
/// the upper as foreground and the lower as background.
pub fn cells(img: &DynamicImage, width: usize) -> Vec<String> {
    let rows = layout::image_rows(width, img.width(), img.height());
    if rows == 0 || width == 0 {
        return Vec::new();
    }
    let resized = img
        .resize_exact(width as u32, (rows * 2) as u32, FilterType::Triangle)
        .to_rgba8();
    (0..rows as u32)
        .map(|row| {
            (0..width as u32)
                .map(|x| {
                    let top = resized.get_pixel(x, row * 2).0;
                    let bottom = resized.get_pixel(x, row * 2 + 1).0;
                    if top[3] < 128 && bottom[3] < 128 {
                        " ".to_string()
                    } else {
                        format!(
                            "[#{:02x}{:02x}{:02x} on #{:02x}{:02x}{:02x}]▀[/]",
                            top[0], top[1], top[2], bottom[0], bottom[1], bottom[2]
                        )
                    }
                })
                .collect()
        })
        .collect()
}

/// A dim box with the alt text, standing in for an image that failed.
pub fn placeholder(alt: &str, width: usize, height: usize) -> Vec<String> {
    let label = if alt.trim().is_empty() {
        "Image not available"
    } else {
        alt.trim()
    };
    let panel = Panel::new(BorderStyle::Square, "dark_grey");
    let interior = panel.interior_width(width);
    let text = markup::escape(&markup::strip(label));
    let text = layout::center_block(&[markup::truncate(&text, interior)], interior);
    let rows = layout::pad_to_height(text, height.saturating_sub(layout::BORDER_HEIGHT));
    panel.draw(&rows, width.max(2), height.max(2))
}
