use crate::{
    app::AppState,
    error::{Rejection, Result},
    models::{RecommendationFilters, RecommendationRequest, RecommendationResponse},
    services::recommendation::is_weak_query,
};
use actix_web::{post, web, HttpResponse};
use log::info;

/// Recommend books for an optional free-text interest and optional filters.
///
/// Input problems (short query, filters matching nothing) come back as a
/// 200 response with an `error` field and no recommendations.
#[post("/recommend")]
pub async fn recommend(
    request: web::Json<RecommendationRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let RecommendationRequest {
        query,
        language,
        genre,
    } = request.into_inner();
    let query = query.as_deref().map(str::trim).unwrap_or_default();

    if !query.is_empty() && is_weak_query(query) {
        return Err(Rejection::WeakQuery.into());
    }

    info!(
        "Recommendation request: query={:?} language={:?} genre={:?}",
        query, language, genre
    );

    let filters = RecommendationFilters::new(language.clone(), genre);
    let recommendations = state
        .service
        .recommend(query, &filters, state.top_k)
        .await?;

    Ok(HttpResponse::Ok().json(RecommendationResponse {
        selected_language: language,
        recommendations,
    }))
}
