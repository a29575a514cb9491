/*
 * Responsibility
 * - GET /profile/{user_id}: claims + activity for a subject
 * - GET /profile/{user_id}/assertion: the same claims, signed
 * - inactive subjects get no assertion
 */
use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::debug;

use crate::{
    api::v1::dto::profile::{AssertionResponse, ProfileQuery, ProfileResponse},
    error::AppError,
    state::AppState,
};

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileResponse>, AppError> {
    let requested = query
        .requested_types()
        .map_err(|msg| AppError::bad_request("INVALID_CLAIMS", msg))?;

    let profile = state
        .identity
        .profile
        .profile(&user_id, requested.as_deref())
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(ProfileResponse {
        subject: user_id,
        active: profile.active,
        claims: profile.claims,
    }))
}

pub async fn get_assertion(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AssertionResponse>, AppError> {
    // Only routed when a signer is configured.
    let signer = state.assertions.as_ref().ok_or(AppError::Internal)?;

    let profile = state
        .identity
        .profile
        .profile(&user_id, None)
        .await?
        .ok_or(AppError::not_found("user"))?;
    if !profile.active {
        debug!(user_id = %user_id, "assertion refused for inactive subject");
        return Err(AppError::forbidden("subject is not active"));
    }

    let signed = signer.sign(&profile.claims)?;

    Ok(Json(AssertionResponse {
        assertion: signed.token,
        token_type: "JWT",
        expires_in: signed.expires_in,
    }))
}
