//! Loading the presentation document from disk or over HTTP.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{DeckError, Result};
use crate::render::image_cache::{Base, is_url};

/// Markdown text plus where its relative references resolve from.
pub struct Document {
    pub text: String,
    /// Display name for diagnostics: the path or URL as given.
    pub name: String,
    pub base: Base,
    /// Local copy of a remote document, removed when the document drops.
    cache: Option<NamedTempFile>,
}

impl Document {
    /// Path of the on-disk copy for remote documents.
    pub fn cached_path(&self) -> Option<&Path> {
        self.cache.as_ref().map(NamedTempFile::path)
    }
}

pub fn load(input: &str) -> Result<Document> {
    if is_url(input) {
        load_url(input)
    } else {
        load_path(Path::new(input))
    }
}

fn load_path(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path).map_err(|source| DeckError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok(Document {
        text,
        name: path.display().to_string(),
        base: Base::Dir(dir),
        cache: None,
    })
}

fn load_url(url: &str) -> Result<Document> {
    tracing::info!("fetching {url}");
    let fetch = |reason: String| DeckError::Fetch {
        url: url.to_string(),
        reason,
    };
    let mut response = ureq::get(url).call().map_err(|e| fetch(e.to_string()))?;
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| fetch(e.to_string()))?;

    let mut cache = tempfile::Builder::new()
        .prefix("termdeck-")
        .suffix(".md")
        .tempfile()
        .map_err(|e| fetch(e.to_string()))?;
    cache
        .write_all(text.as_bytes())
        .map_err(|e| fetch(e.to_string()))?;
    tracing::debug!("cached remote document at {}", cache.path().display());

    Ok(Document {
        text,
        name: url.to_string(),
        base: Base::Url(url.to_string()),
        cache: Some(cache),
    })
}
