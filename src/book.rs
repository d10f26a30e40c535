use crate::error::SearchError;
use serde::{Deserialize, Serialize};

// One catalog entry as returned by the search service
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Book {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    // May be NaN when an XML row carried non-numeric text
    pub quantity: Option<f64>,
    pub price: Option<f64>,
}

/// Outcome of one search call.
///
/// `result` is always present and is empty whenever `error` is set; partial
/// results are never returned. Check `error` before trusting `result`.
#[derive(Debug, Default)]
pub struct SearchResult {
    pub result: Vec<Book>,
    pub error: Option<SearchError>,
}

impl SearchResult {
    pub fn success(books: Vec<Book>) -> Self {
        Self {
            result: books,
            error: None,
        }
    }

    pub fn failure(error: SearchError) -> Self {
        Self {
            result: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<Book>, SearchError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

impl From<Result<Vec<Book>, SearchError>> for SearchResult {
    fn from(outcome: Result<Vec<Book>, SearchError>) -> Self {
        match outcome {
            Ok(books) => SearchResult::success(books),
            Err(error) => SearchResult::failure(error),
        }
    }
}
