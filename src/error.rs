// Error types shared by the query builder, the normalizers and the client
use thiserror::Error;

/// Every way a single search can fail.
///
/// The client never returns this directly from a search; it is captured into
/// [`SearchResult::error`](crate::SearchResult) alongside an empty book list.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid search term: {0:?}")]
    InvalidTerm(String),

    #[error("invalid limit: {0} (must be a positive integer)")]
    InvalidLimit(u32),

    #[error("invalid root url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported root url {0:?}: it must carry a path and no query or fragment")]
    UnsupportedRootUrl(String),

    // Transport failures are reported exactly as the transport phrased them
    #[error(transparent)]
    Transport(anyhow::Error),

    #[error("code:{status}, {status_text}")]
    Status { status: u16, status_text: String },

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("type error: cannot map over rows, response body is {found} and not an array")]
    NotAnArray { found: &'static str },

    #[error("XML parse error: {0}")]
    XmlParse(String),
}

impl SearchError {
    /// HTTP status carried by a [`SearchError::Status`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Errors raised while constructing a client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}
