use crate::{
    error::{ApiError, Result},
    models::{Book, REQUIRED_COLUMNS},
};
use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};
use serde_json::{Number, Value};
use std::{fs::File, io::Read, path::Path};

/// Number of books returned per genre by [`Catalog::top_books`].
pub const TOP_BOOKS_PER_GENRE: usize = 10;

/// The book dataset, loaded once and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    columns: Vec<String>,
    books: Vec<Book>,
}

impl Catalog {
    pub fn from_books(books: Vec<Book>) -> Self {
        Self {
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            books,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading catalog from {}", path.display());
        let file = File::open(path).map_err(|e| {
            ApiError::Catalog(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_reader(file)?;
        info!(
            "Loaded {} books across {} genres",
            catalog.len(),
            catalog.genres().len()
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns: Vec<String> = headers.iter().map(str::to_string).collect();
        let layout = ColumnLayout::resolve(&columns)?;

        let mut books = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| {
                ApiError::Catalog(format!("Failed to read catalog row {}: {}", row + 1, e))
            })?;
            books.push(layout.book(&columns, &record));
        }

        if books.is_empty() {
            warn!("Catalog file has a header but no books");
        }

        Ok(Self { columns, books })
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Distinct genres in order of first appearance.
    pub fn genres(&self) -> Vec<&str> {
        let mut genres: Vec<&str> = Vec::new();
        for book in &self.books {
            if !genres.contains(&book.genre.as_str()) {
                genres.push(&book.genre);
            }
        }
        genres
    }

    /// The first `per_genre` books of every genre, in catalog order.
    pub fn top_books(&self, per_genre: usize) -> Vec<(&str, Vec<&Book>)> {
        self.genres()
            .into_iter()
            .map(|genre| {
                let books = self
                    .books
                    .iter()
                    .filter(|book| book.genre == genre)
                    .take(per_genre)
                    .collect();
                (genre, books)
            })
            .collect()
    }
}

/// Positions of the required columns within a header row.
struct ColumnLayout {
    title: usize,
    author: usize,
    genre: usize,
    language: usize,
    description: usize,
}

impl ColumnLayout {
    fn resolve(columns: &[String]) -> Result<Self> {
        let position = |name: &str| {
            columns.iter().position(|c| c == name).ok_or_else(|| {
                ApiError::Catalog(format!("Catalog is missing required column '{}'", name))
            })
        };

        Ok(Self {
            title: position("title")?,
            author: position("author")?,
            genre: position("genre")?,
            language: position("language")?,
            description: position("description")?,
        })
    }

    fn book(&self, columns: &[String], record: &StringRecord) -> Book {
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();

        let extra = columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !REQUIRED_COLUMNS.contains(&name.as_str()))
            .map(|(i, name)| (name.clone(), cell_value(record.get(i).unwrap_or_default())))
            .collect();

        Book {
            title: field(self.title),
            author: field(self.author),
            genre: field(self.genre),
            language: field(self.language),
            description: field(self.description),
            extra,
        }
    }
}

/// Extra columns keep their JSON type: integers and finite floats become
/// numbers, empty cells become null, anything else stays a string.
fn cell_value(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = cell.parse::<i64>() {
        return Value::Number(n.into());
    }
    cell.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}
