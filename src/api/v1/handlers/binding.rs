/*
 * Responsibility
 * - GET /binding: the effective identity binding (cookie settings, claim types, open CORS paths)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::dto::binding::{BindingResponse, CorsPathResponse},
    services::cors::PatternSource,
    state::AppState,
};

pub async fn get_binding(State(state): State<AppState>) -> Json<BindingResponse> {
    let identity = &state.identity;

    let cors_paths = identity
        .cors
        .allow_list()
        .patterns()
        .iter()
        .map(|p| CorsPathResponse {
            pattern: p.as_str().to_string(),
            source: match p.source() {
                PatternSource::Static => "static",
                PatternSource::Registered => "registered",
            },
        })
        .collect();

    Json(BindingResponse {
        cookie: identity.cookie.clone(),
        claim_types: identity.claim_types.clone(),
        cors_paths,
    })
}
