//! Personal bookmark grid model.
//!
//! # Invariants
//! - `name` and `url` are non-blank after trim.
//! - `url` always carries an `http://` or `https://` scheme.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

/// Favicon size used by the bookmark grid tiles.
pub const GRID_FAVICON_SIZE: u32 = 64;
/// Favicon size used by the native bookmark panel rows.
pub const PANEL_FAVICON_SIZE: u32 = 16;

const FAVICON_ENDPOINT: &str = "https://www.google.com/s2/favicons";

/// One tile of the personal bookmark grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub name: String,
    pub url: String,
}

impl Bookmark {
    /// Builds a bookmark from raw form input.
    ///
    /// A URL without an explicit http(s) scheme is prefixed with `https://`.
    pub fn new(
        name: impl AsRef<str>,
        url: impl AsRef<str>,
    ) -> Result<Self, BookmarkValidationError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(BookmarkValidationError::MissingName);
        }
        let url = url.as_ref().trim();
        if url.is_empty() {
            return Err(BookmarkValidationError::MissingUrl);
        }

        Ok(Self {
            name: name.to_string(),
            url: normalize_bookmark_url(url),
        })
    }

    pub fn host(&self) -> String {
        host_or_raw(&self.url)
    }

    pub fn favicon_url(&self, size: u32) -> String {
        favicon_url(&self.url, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkValidationError {
    MissingName,
    MissingUrl,
}

impl Display for BookmarkValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "missing bookmark name"),
            Self::MissingUrl => write!(f, "missing bookmark url"),
        }
    }
}

impl Error for BookmarkValidationError {}

/// Prefixes `https://` unless the input already names an http(s) scheme.
pub fn normalize_bookmark_url(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

/// Host part of `url`, or `url` itself when it does not parse.
pub fn host_or_raw(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

pub fn favicon_url(url: &str, size: u32) -> String {
    format!("{FAVICON_ENDPOINT}?domain={}&sz={size}", host_or_raw(url))
}
