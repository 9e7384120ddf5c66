use serde::{Deserialize, Serialize};

pub use book::{Book, REQUIRED_COLUMNS};

mod book;

pub const BROWSE_REASON: &str = "Browsing books based on selected filters.";

/// Request body for `POST /recommend`. Every field may be missing or null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Categorical filters applied before browsing or searching.
/// Empty strings count as "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationFilters {
    pub language: Option<String>,
    pub genre: Option<String>,
}

impl RecommendationFilters {
    pub fn new(language: Option<String>, genre: Option<String>) -> Self {
        Self {
            language: language.filter(|l| !l.is_empty()),
            genre: genre.filter(|g| !g.is_empty()),
        }
    }
}

/// A recommended book together with the reason it was picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub language: String,
    pub reason: String,
}

impl Recommendation {
    pub fn from_book(book: &Book, reason: impl Into<String>) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            language: book.language.clone(),
            reason: reason.into(),
        }
    }

    pub fn search_reason(query: &str) -> String {
        format!("This book matches your interest in {}.", query.to_lowercase())
    }
}

/// Successful response for `POST /recommend`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub selected_language: Option<String>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub books: usize,
    pub indexed_books: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageDetectionRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageDetectionResponse {
    pub language: String,
    /// English name of the language, absent when nothing was detected.
    pub name: Option<String>,
    pub confidence: Option<f64>,
    pub reliable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_are_ignored() {
        let filters = RecommendationFilters::new(Some(String::new()), Some("Fantasy".into()));
        assert_eq!(filters.language, None);
        assert_eq!(filters.genre.as_deref(), Some("Fantasy"));
    }

    #[test]
    fn test_request_accepts_missing_and_null_fields() {
        let request: RecommendationRequest =
            serde_json::from_str(r#"{"query": null, "genre": "Fantasy"}"#).unwrap();
        assert_eq!(request.query, None);
        assert_eq!(request.language, None);
        assert_eq!(request.genre.as_deref(), Some("Fantasy"));
    }

    #[test]
    fn test_search_reason_lowercases_query() {
        assert_eq!(
            Recommendation::search_reason("Space Exploration"),
            "This book matches your interest in space exploration."
        );
    }
}
