// Book search client: one GET per search, normalized into a SearchResult
use crate::book::{Book, SearchResult};
use crate::dom::{QuickXmlParser, XmlParser};
use crate::error::{ClientError, SearchError};
use crate::normalizer::{normalize_json, normalize_xml};
use crate::query::{build_url, parse_root_url, ResponseFormat, SearchOptions, SearchPath};
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport, DEFAULT_USER_AGENT};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Which responses count as successful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Status must be exactly 200 and the transport must report ok.
    #[default]
    Exact200,
    /// Any 2xx status the transport reports as ok.
    AnySuccess,
}

impl StatusPolicy {
    pub fn accepts(&self, response: &HttpResponse) -> bool {
        match self {
            StatusPolicy::Exact200 => response.ok && response.status == 200,
            StatusPolicy::AnySuccess => response.ok && (200..300).contains(&response.status),
        }
    }
}

// Client configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub options: SearchOptions,
    pub status_policy: StatusPolicy,
    // Only applied by the default reqwest transport
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            options: SearchOptions::default(),
            status_policy: StatusPolicy::default(),
            timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ClientError> {
        parse_root_url(&self.options.root_url)
            .map_err(|e| ClientError::ConfigError(e.to_string()))?;
        if self.options.effective_limit() == Some(0) {
            return Err(ClientError::ConfigError(
                "limit must be a positive integer".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::ConfigError(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct BookSearchClient<T = ReqwestTransport> {
    transport: T,
    xml_parser: Arc<dyn XmlParser>,
    options: SearchOptions,
    status_policy: StatusPolicy,
}

impl BookSearchClient<ReqwestTransport> {
    /// Validates `config` and builds a client on the default reqwest transport.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = ReqwestTransport::new(
            Duration::from_millis(config.timeout_ms),
            &config.user_agent,
        )
        .map_err(|e| ClientError::InitError(e.to_string()))?;

        debug!(root_url = %config.options.root_url, "Initialized book search client");
        Ok(Self::with_config(transport, config))
    }
}

impl<T: HttpTransport> BookSearchClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            xml_parser: Arc::new(QuickXmlParser),
            options: config.options,
            status_policy: config.status_policy,
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn with_xml_parser(mut self, parser: impl XmlParser + 'static) -> Self {
        self.xml_parser = Arc::new(parser);
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn search_by_author(&self, author: impl Into<String>) -> SearchRequest<'_, T> {
        SearchRequest::new(self, SearchPath::ByAuthor, author.into())
    }

    pub fn search_by_publisher(&self, publisher: impl Into<String>) -> SearchRequest<'_, T> {
        SearchRequest::new(self, SearchPath::ByPublisher, publisher.into())
    }

    #[instrument(skip_all, fields(path = %path, term = %term, format = %options.format))]
    async fn execute(&self, path: SearchPath, term: &str, options: &SearchOptions) -> SearchResult {
        match self.fetch_books(path, term, options).await {
            Ok(books) => {
                debug!(count = books.len(), "book search succeeded");
                SearchResult::success(books)
            }
            Err(error) => {
                warn!(%error, "book search failed");
                SearchResult::failure(error)
            }
        }
    }

    async fn fetch_books(
        &self,
        path: SearchPath,
        term: &str,
        options: &SearchOptions,
    ) -> Result<Vec<Book>, SearchError> {
        let url = build_url(options, path, term)?;
        debug!(url = %url, "sending book search request");

        let response = self
            .transport
            .get(url.as_str())
            .await
            .map_err(SearchError::Transport)?;

        if !self.status_policy.accepts(&response) {
            return Err(SearchError::Status {
                status: response.status,
                status_text: response.status_text,
            });
        }

        match options.format {
            ResponseFormat::Json => {
                let value = response
                    .json()
                    .map_err(|e| SearchError::Decode(e.to_string()))?;
                normalize_json(&value)
            }
            ResponseFormat::Xml => {
                let text = response
                    .text()
                    .map_err(|e| SearchError::Decode(e.to_string()))?;
                normalize_xml(self.xml_parser.as_ref(), &text)
            }
        }
    }
}

/// A pending search; adjust it with [`format`](Self::format) and
/// [`limit`](Self::limit), then run it with [`go`](Self::go) or `.await`.
///
/// Overrides apply to this request only, never to the client.
#[must_use = "a search request does nothing until it is awaited"]
pub struct SearchRequest<'a, T> {
    client: &'a BookSearchClient<T>,
    path: SearchPath,
    term: String,
    options: SearchOptions,
}

impl<'a, T: HttpTransport> SearchRequest<'a, T> {
    fn new(client: &'a BookSearchClient<T>, path: SearchPath, term: String) -> Self {
        Self {
            client,
            path,
            term,
            options: client.options.clone(),
        }
    }

    pub fn format(mut self, format: ResponseFormat) -> Self {
        self.options.format = format;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// The URL this request will GET.
    pub fn url(&self) -> Result<Url, SearchError> {
        build_url(&self.options, self.path, &self.term)
    }

    pub async fn go(self) -> SearchResult {
        self.client
            .execute(self.path, &self.term, &self.options)
            .await
    }
}

impl<'a, T: HttpTransport + 'a> IntoFuture for SearchRequest<'a, T> {
    type Output = SearchResult;
    type IntoFuture = BoxFuture<'a, SearchResult>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.go())
    }
}

// Recording transport for tests
#[cfg(test)]
pub mod mock_transport {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    pub enum MockReply {
        Respond(HttpResponse),
        Reject(String),
    }

    pub struct MockTransport {
        reply: MockReply,
        requests: Mutex<Vec<String>>,
    }

    impl MockTransport {
        pub fn responding(response: HttpResponse) -> Arc<Self> {
            Arc::new(Self {
                reply: MockReply::Respond(response),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn ok(body: &'static str) -> Arc<Self> {
            Self::responding(HttpResponse::new(200, "OK", body))
        }

        pub fn rejecting(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: MockReply::Reject(message.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn requested_urls(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &str) -> anyhow::Result<HttpResponse> {
            self.requests.lock().push(url.to_string());
            match &self.reply {
                MockReply::Respond(response) => Ok(response.clone()),
                MockReply::Reject(message) => Err(anyhow!("{}", message)),
            }
        }
    }
}
