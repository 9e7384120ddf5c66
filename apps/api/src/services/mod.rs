pub mod catalog;
pub mod language;
pub mod recommendation;

// Re-export public types
pub use catalog::{Catalog, TOP_BOOKS_PER_GENRE};
pub use language::{detect_language, DetectedLanguage};
pub use recommendation::RecommendationService;
