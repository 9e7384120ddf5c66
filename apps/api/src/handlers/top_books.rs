use crate::{app::AppState, services::TOP_BOOKS_PER_GENRE};
use actix_web::{get, web, HttpResponse};
use serde_json::{Map, Value};

/// The first books of every genre, keyed by genre in catalog order.
#[get("/top-books")]
pub async fn get_top_books(state: web::Data<AppState>) -> crate::error::Result<HttpResponse> {
    let mut shelves = Map::new();
    for (genre, books) in state.service.catalog().top_books(TOP_BOOKS_PER_GENRE) {
        shelves.insert(genre.to_string(), serde_json::to_value(books)?);
    }

    Ok(HttpResponse::Ok().json(Value::Object(shelves)))
}
