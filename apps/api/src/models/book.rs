use serde::{Deserialize, Serialize};

/// Columns every catalog file must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["title", "author", "genre", "language", "description"];

/// A single catalog row. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub language: String,
    pub description: String,
    /// Any additional dataset columns, kept verbatim and in file order.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        language: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            language: language.into(),
            description: description.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Exact match on the language code.
    pub fn matches_language(&self, language: &str) -> bool {
        self.language == language
    }

    /// Case-insensitive exact match on the genre name.
    pub fn matches_genre(&self, genre: &str) -> bool {
        self.genre.to_lowercase() == genre.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_match_ignores_case() {
        let book = Book::new("Dune", "Frank Herbert", "Sci-Fi", "en", "Desert planet");
        assert!(book.matches_genre("sci-fi"));
        assert!(book.matches_genre("SCI-FI"));
        assert!(!book.matches_genre("sci"));
    }

    #[test]
    fn test_language_match_is_exact() {
        let book = Book::new("Dune", "Frank Herbert", "Sci-Fi", "en", "Desert planet");
        assert!(book.matches_language("en"));
        assert!(!book.matches_language("EN"));
        assert!(!book.matches_language("en-US"));
    }

    #[test]
    fn test_extra_columns_are_flattened() {
        let mut book = Book::new("Dune", "Frank Herbert", "Sci-Fi", "en", "Desert planet");
        book.extra
            .insert("year".to_string(), serde_json::Value::String("1965".into()));

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["year"], "1965");
        assert_eq!(json["title"], "Dune");
    }
}
