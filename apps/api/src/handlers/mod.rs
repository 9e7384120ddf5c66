pub mod health;
pub mod language;
pub mod recommendations;
pub mod top_books;

pub use health::health_check;
pub use language::detect_language;
pub use recommendations::recommend;
pub use top_books::get_top_books;
