use actix_web::web;
use book_recommender_api::{app::AppState, config::EmbeddingProvider, Config};
use std::io::Write;
use tempfile::NamedTempFile;

pub const CATALOG_CSV: &str = "\
title,author,genre,language,description,year
A,Author A,Sci-Fi,en,A space exploration adventure to a distant star,2001
Dragon Reign,Mira Holt,Fantasy,en,A young mage bonds with a dragon to save her kingdom,2010
B,Author B,Sci-Fi,en,Colonists terraform Mars and fight over water rights,1993
La sombra,Carlos Ruiz,Mystery,es,Un joven busca al autor de un libro olvidado en Barcelona,2001
Dragon Reign,Mira Holt,Fantasy,en,A young mage bonds with a dragon to save her kingdom,2010
C,Author C,Sci-Fi,en,An adventure aboard a generation ship lost in deep space,2015
Le Petit Prince,Antoine de Saint-Exupéry,Fantasy,fr,Un petit prince voyage de planète en planète,1943
";

/// Write `csv` to a temp file and build state against it with the offline embedder.
pub async fn state_from_csv(csv: &str) -> (web::Data<AppState>, NamedTempFile) {
    let mut file = NamedTempFile::new().expect("create temp catalog");
    file.write_all(csv.as_bytes()).expect("write temp catalog");

    let config = Config {
        dataset_path: file.path().to_path_buf(),
        embedding_provider: EmbeddingProvider::Hashing,
        embedding_dimensions: 256,
        ..Config::default()
    };

    let state = AppState::build(&config).await.expect("build app state");
    (web::Data::new(state), file)
}
