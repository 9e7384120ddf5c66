use book_recommender_api::{
    ml::{Embedder, HashingEmbedder},
    models::RecommendationFilters,
    services::{Catalog, RecommendationService},
    ApiError, Rejection,
};
use std::{collections::HashSet, path::Path, sync::Arc};

fn bundled_catalog() -> Catalog {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/books.csv");
    Catalog::load(&path).expect("bundled catalog loads")
}

fn service(catalog: Catalog) -> RecommendationService {
    RecommendationService::new(
        Arc::new(catalog),
        Embedder::Hashing(HashingEmbedder::new(384).unwrap()),
    )
}

#[test]
fn test_bundled_catalog_has_required_fields() {
    let catalog = bundled_catalog();
    assert!(catalog.len() >= 20);
    assert!(catalog
        .books()
        .iter()
        .all(|b| !b.title.is_empty() && !b.description.is_empty()));
}

#[tokio::test]
async fn test_every_filter_pair_either_matches_or_names_the_failing_filter() {
    let catalog = bundled_catalog();
    let languages: HashSet<String> = catalog.books().iter().map(|b| b.language.clone()).collect();
    let genres: Vec<String> = catalog.genres().iter().map(|g| g.to_string()).collect();
    let service = service(catalog.clone());

    for language in &languages {
        for genre in &genres {
            let expected = catalog
                .books()
                .iter()
                .filter(|b| &b.language == language && b.genre.eq_ignore_ascii_case(genre))
                .count();

            let filters = RecommendationFilters::new(Some(language.clone()), Some(genre.clone()));
            let result = service
                .recommend("stories worth reading", &filters, 10)
                .await;

            match result {
                Ok(recommendations) => {
                    assert!(expected > 0);
                    assert!(!recommendations.is_empty());
                    assert!(recommendations.len() <= 10);
                    assert!(recommendations
                        .iter()
                        .all(|r| &r.language == language && r.genre.eq_ignore_ascii_case(genre)));
                }
                Err(ApiError::Rejected(Rejection::NoBooksForGenre(g))) => {
                    assert_eq!(expected, 0);
                    assert_eq!(&g, genre);
                }
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
    }
}

#[tokio::test]
async fn test_browse_truncates_to_top_k() {
    let catalog = bundled_catalog();
    let expected: Vec<String> = catalog
        .books()
        .iter()
        .take(5)
        .map(|b| b.title.clone())
        .collect();
    let service = service(catalog);

    let results = service
        .recommend("", &RecommendationFilters::default(), 5)
        .await
        .unwrap();
    let titles: Vec<String> = results.into_iter().map(|r| r.title).collect();
    assert_eq!(titles, expected);
}

#[tokio::test]
async fn test_search_over_whole_catalog_is_bounded_and_unique() {
    let service = service(bundled_catalog());
    let results = service
        .recommend(
            "a detective solving a murder",
            &RecommendationFilters::default(),
            10,
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 10);
    let titles: HashSet<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles.len(), results.len());
}
