use actix_web::{web, Scope};

use crate::handlers::{detect_language, get_top_books, health_check, recommend};

/// Configure all routes for the API
pub fn api_routes() -> Scope {
    web::scope("")
        .service(health_check)
        .service(recommend)
        .service(get_top_books)
        .service(detect_language)
}
