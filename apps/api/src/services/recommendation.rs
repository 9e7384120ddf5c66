use crate::{
    error::{Rejection, Result},
    ml::{Embedder, FlatL2Index},
    models::{Book, Recommendation, RecommendationFilters, BROWSE_REASON},
    services::catalog::Catalog,
};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info};

/// Minimum number of whitespace separated words in a search query.
pub const MIN_QUERY_WORDS: usize = 2;

/// True when a non-empty query is too short to search on.
pub fn is_weak_query(query: &str) -> bool {
    query.split_whitespace().count() < MIN_QUERY_WORDS
}

/// Filters the catalog and either browses it or ranks it against a query.
pub struct RecommendationService {
    catalog: Arc<Catalog>,
    embedder: Embedder,
    catalog_index: Option<FlatL2Index>,
}

impl RecommendationService {
    pub fn new(catalog: Arc<Catalog>, embedder: Embedder) -> Self {
        Self {
            catalog,
            embedder,
            catalog_index: None,
        }
    }

    /// Embed the whole catalog once and keep the resulting index around.
    ///
    /// Searches always rank a freshly built index over the filtered subset;
    /// this one is only reported through [`Self::indexed_books`].
    pub async fn prebuild_catalog_index(&mut self) -> Result<()> {
        info!(
            "Embedding {} catalog descriptions with {}",
            self.catalog.len(),
            self.embedder.name()
        );
        let descriptions: Vec<String> = self
            .catalog
            .books()
            .iter()
            .map(|book| book.description.clone())
            .collect();

        let index = self.embedder.build_index(&descriptions).await?;
        info!(
            "Catalog index ready: {} vectors of dimension {}",
            index.len(),
            index.dimensions()
        );
        self.catalog_index = Some(index);
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn indexed_books(&self) -> Option<usize> {
        self.catalog_index.as_ref().map(FlatL2Index::len)
    }

    /// Recommend up to `top_k` books.
    ///
    /// An empty `query` browses the filtered catalog in file order; anything
    /// else ranks the filtered books by embedding distance to the query.
    /// Returned titles are unique.
    pub async fn recommend(
        &self,
        query: &str,
        filters: &RecommendationFilters,
        top_k: usize,
    ) -> Result<Vec<Recommendation>> {
        let candidates = self.filter(filters)?;

        if query.is_empty() {
            let results = browse(&candidates, top_k);
            info!(
                candidates = candidates.len(),
                results = results.len(),
                "Browse mode"
            );
            return Ok(results);
        }

        if is_weak_query(query) {
            return Err(Rejection::WeakQuery.into());
        }

        let results = self.search(query, &candidates, top_k).await?;
        info!(
            candidates = candidates.len(),
            results = results.len(),
            "Search mode"
        );
        Ok(results)
    }

    fn filter(&self, filters: &RecommendationFilters) -> Result<Vec<&Book>> {
        let mut candidates: Vec<&Book> = self.catalog.books().iter().collect();

        if let Some(language) = &filters.language {
            candidates.retain(|book| book.matches_language(language));
            debug!("{} books in language {}", candidates.len(), language);
            if candidates.is_empty() {
                return Err(Rejection::NoBooksInLanguage(language.clone()).into());
            }
        }

        if let Some(genre) = &filters.genre {
            candidates.retain(|book| book.matches_genre(genre));
            debug!("{} books in genre {}", candidates.len(), genre);
            if candidates.is_empty() {
                return Err(Rejection::NoBooksForGenre(genre.clone()).into());
            }
        }

        Ok(candidates)
    }

    async fn search(
        &self,
        query: &str,
        candidates: &[&Book],
        top_k: usize,
    ) -> Result<Vec<Recommendation>> {
        let descriptions: Vec<String> = candidates
            .iter()
            .map(|book| book.description.clone())
            .collect();
        let index = self.embedder.build_index(&descriptions).await?;

        let query_embedding = self.embedder.encode(query).await?;
        let neighbors = index.search(&query_embedding, top_k)?;
        debug!(
            "Nearest distances: {:?}",
            neighbors.iter().map(|n| n.distance).collect::<Vec<_>>()
        );

        let reason = Recommendation::search_reason(query);
        Ok(dedup_by_title(
            neighbors.iter().map(|n| candidates[n.position]),
            &reason,
        ))
    }
}

fn browse(candidates: &[&Book], top_k: usize) -> Vec<Recommendation> {
    dedup_by_title(candidates.iter().take(top_k).copied(), BROWSE_REASON)
}

fn dedup_by_title<'a>(
    books: impl Iterator<Item = &'a Book>,
    reason: &str,
) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    books
        .filter(|&book| seen.insert(&book.title))
        .map(|book| Recommendation::from_book(book, reason))
        .collect()
}
