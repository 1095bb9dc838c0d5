//! Search engines and the search box dispatcher.
//!
//! # Responsibility
//! - Enumerate supported engines and their query URL prefixes.
//! - Decide whether search box input is a direct navigation or a query.

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use url::Url;

/// Bytes escaped in query text: everything except the URI component
/// unreserved set `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,}$").expect("valid domain regex")
});

/// Supported search engines. Serialized as the persisted engine id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    #[default]
    Bing,
    Baidu,
    DuckDuckGo,
    Yahoo,
}

impl SearchEngine {
    pub fn all() -> &'static [SearchEngine] {
        &[
            SearchEngine::Google,
            SearchEngine::Bing,
            SearchEngine::Baidu,
            SearchEngine::DuckDuckGo,
            SearchEngine::Yahoo,
        ]
    }

    /// Stable id stored under `defaultSearchEngine`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::Baidu => "baidu",
            Self::DuckDuckGo => "duckduckgo",
            Self::Yahoo => "yahoo",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Bing => "Bing",
            Self::Baidu => "百度",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Yahoo => "Yahoo",
        }
    }

    pub fn query_prefix(&self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com/search?q=",
            Self::Bing => "https://cn.bing.com/search?q=",
            Self::Baidu => "https://www.baidu.com/s?wd=",
            Self::DuckDuckGo => "https://duckduckgo.com/?q=",
            Self::Yahoo => "https://search.yahoo.com/search?p=",
        }
    }

    pub fn query_url(&self, text: &str) -> String {
        format!(
            "{}{}",
            self.query_prefix(),
            utf8_percent_encode(text, QUERY_COMPONENT)
        )
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|engine| engine.id() == id.trim().to_ascii_lowercase())
    }
}

impl Display for SearchEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SearchEngine {
    type Err = UnknownEngine;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_id(value).ok_or_else(|| UnknownEngine(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEngine(pub String);

impl Display for UnknownEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let known = SearchEngine::all()
            .iter()
            .map(SearchEngine::id)
            .collect::<Vec<_>>()
            .join("|");
        write!(f, "unknown search engine `{}`; expected {known}", self.0)
    }
}

impl Error for UnknownEngine {}

/// Where the search box sends the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// Input looked like a URL or bare domain.
    Navigate(String),
    /// Input is a free-text query for `engine`.
    Query { engine: SearchEngine, url: String },
}

impl SearchTarget {
    pub fn url(&self) -> &str {
        match self {
            Self::Navigate(url) => url,
            Self::Query { url, .. } => url,
        }
    }
}

/// Maps search box input to a navigation target.
///
/// Returns `None` for blank input.
pub fn dispatch(text: &str, engine: SearchEngine) -> Option<SearchTarget> {
    let query = text.trim();
    if query.is_empty() {
        return None;
    }

    if is_url_shaped(query) {
        let url = if query.starts_with("http") {
            query.to_string()
        } else {
            format!("https://{query}")
        };
        return Some(SearchTarget::Navigate(url));
    }

    Some(SearchTarget::Query {
        engine,
        url: engine.query_url(query),
    })
}

/// True for absolute http(s) URLs and for bare domains like `docs.rs`.
///
/// Input that parses as an absolute URL with another scheme is not
/// URL-shaped, even if it would also match the domain pattern.
pub fn is_url_shaped(text: &str) -> bool {
    match Url::parse(text) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => DOMAIN_RE.is_match(text),
    }
}
