/*
 * Responsibility
 * - v1 URL layout
 * - the v1 paths that are CORS-open, registered with the identity configurator at startup
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{
    binding::get_binding,
    health::health,
    profile::{get_assertion, get_profile},
};

pub const PUBLIC_CORS_PATHS: [&str; 1] = ["/api/v1/health"];

pub fn routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/binding", get(get_binding))
        .route("/profile/{user_id}", get(get_profile));

    // The assertion endpoint only exists when a signing key is configured.
    if state.assertions.is_some() {
        router.route("/profile/{user_id}/assertion", get(get_assertion))
    } else {
        router
    }
}
