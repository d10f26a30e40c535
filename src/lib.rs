// Client library for the book-seller search service

pub mod book;
pub mod client;
pub mod dom;
pub mod error;
pub mod normalizer;
pub mod query;
pub mod transport;

// Re-export key types for convenience
pub use book::{Book, SearchResult};
pub use client::{BookSearchClient, ClientConfig, SearchRequest, StatusPolicy};
pub use dom::{Element, Node, QuickXmlParser, XmlParser};
pub use error::{ClientError, SearchError};
pub use normalizer::{normalize_json, normalize_xml};
pub use query::{build_url, LimitPolicy, ResponseFormat, SearchOptions, SearchPath};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
