use crate::{app::AppState, models::HealthResponse};
use actix_web::{get, web, HttpResponse};

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        books: state.service.catalog().len(),
        indexed_books: state.service.indexed_books(),
    })
}
