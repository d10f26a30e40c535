//! Request URL construction for the book search service.
//!
//! URLs always carry their parameters in the order `q`, `format`, `limit`,
//! form-url-encoded the same way a browser's `URLSearchParams` would.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

pub const DEFAULT_ROOT_URL: &str = "http://api.book-seller-example.com";
pub const DEFAULT_LIMIT: u32 = 10;

// Body format requested from the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            other => Err(format!("unsupported response format: {other}")),
        }
    }
}

/// What to send as `limit` when none was configured explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Leave `limit` out of the query string.
    #[default]
    OmitIfUnset,
    /// Always send `limit`, falling back to this value.
    DefaultTo(u32),
}

// Search endpoints exposed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPath {
    ByAuthor,
    ByPublisher,
}

impl SearchPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPath::ByAuthor => "/by-author",
            SearchPath::ByPublisher => "/by-publisher",
        }
    }

    fn segment(&self) -> &'static str {
        self.as_str().trim_start_matches('/')
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchOptions {
    pub root_url: String,
    pub format: ResponseFormat,
    pub limit: Option<u32>,
    pub limit_policy: LimitPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            format: ResponseFormat::default(),
            limit: None,
            limit_policy: LimitPolicy::default(),
        }
    }
}

impl SearchOptions {
    pub fn with_root_url(mut self, root_url: impl Into<String>) -> Self {
        self.root_url = root_url.into();
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_limit_policy(mut self, policy: LimitPolicy) -> Self {
        self.limit_policy = policy;
        self
    }

    /// The `limit` value that goes on the wire, if any.
    pub fn effective_limit(&self) -> Option<u32> {
        match (self.limit, self.limit_policy) {
            (Some(limit), _) => Some(limit),
            (None, LimitPolicy::DefaultTo(fallback)) => Some(fallback),
            (None, LimitPolicy::OmitIfUnset) => None,
        }
    }
}

/// Parses a root URL that search paths can be appended to.
///
/// The root must be able to carry a path and must not already have a query
/// or fragment.
pub fn parse_root_url(root_url: &str) -> Result<Url, SearchError> {
    let url = Url::parse(root_url)?;
    if url.cannot_be_a_base() || url.query().is_some() || url.fragment().is_some() {
        return Err(SearchError::UnsupportedRootUrl(root_url.to_string()));
    }
    Ok(url)
}

/// Builds `{root_url}{path}?q={term}&format={format}[&limit={n}]`.
pub fn build_url(
    options: &SearchOptions,
    path: SearchPath,
    term: &str,
) -> Result<Url, SearchError> {
    if term.trim().is_empty() {
        return Err(SearchError::InvalidTerm(term.to_string()));
    }

    let limit = options.effective_limit();
    if limit == Some(0) {
        return Err(SearchError::InvalidLimit(0));
    }

    let mut url = parse_root_url(&options.root_url)?;
    url.path_segments_mut()
        .map_err(|_| SearchError::UnsupportedRootUrl(options.root_url.clone()))?
        .pop_if_empty()
        .push(path.segment());

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("q", term)
            .append_pair("format", options.format.as_str());
        if let Some(limit) = limit {
            query.append_pair("limit", &limit.to_string());
        }
    }

    Ok(url)
}
