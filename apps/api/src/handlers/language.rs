use crate::{
    error::{ApiError, Result},
    models::{LanguageDetectionRequest, LanguageDetectionResponse},
    services::language::{self, language_code},
};
use actix_web::{post, web, HttpResponse};
use log::debug;

/// Identify the language of a piece of text; `"unknown"` when nothing can be detected.
#[post("/detect-language")]
pub async fn detect_language(request: web::Json<LanguageDetectionRequest>) -> Result<HttpResponse> {
    if request.text.trim().is_empty() {
        return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
    }

    let detected = language::detect_language(&request.text);
    debug!("Language detection result: {:?}", detected);

    Ok(HttpResponse::Ok().json(LanguageDetectionResponse {
        language: language_code(detected.as_ref()).to_string(),
        name: detected.as_ref().map(|d| d.name.to_string()),
        confidence: detected.as_ref().map(|d| d.confidence),
        reliable: detected.map_or(false, |d| d.reliable),
    }))
}
