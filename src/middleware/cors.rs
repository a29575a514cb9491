//! CORS enforcement driven by `CorsPolicyDecider`.
//!
//! Note:
//! - CORS is enforced by browsers. Native apps and server-to-server calls
//!   are not restricted by it; a denial here only withholds headers.
//! - Apply at the Router level (not inside handlers), after all routes are mounted.
//!
//! Behavior:
//! - Preflight (`OPTIONS` + `Origin` + `Access-Control-Request-Method`):
//!   answered here. Allowed → 204 with the decision's headers; denied → 403
//!   without any CORS header.
//! - Other requests run normally. `Access-Control-Allow-Origin` is added
//!   only when allowed; `Vary: Origin` whenever an origin was sent.
//! - Credentials are never allowed.
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::services::cors::{CorsDecision, CorsPolicyDecider};

const PREFLIGHT_MAX_AGE_SECONDS: u64 = 60 * 10;

pub fn apply(router: Router, decider: Arc<CorsPolicyDecider>) -> Router {
    router.layer(middleware::from_fn_with_state(decider, cors_middleware))
}

async fn cors_middleware(
    State(decider): State<Arc<CorsPolicyDecider>>,
    OriginalUri(original_uri): OriginalUri,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    // Nested routers see a stripped path; decide on the one the client sent.
    let path = original_uri.path().to_owned();
    let preflight = is_preflight(&req);

    let decision = decider.decide(&path, origin.as_deref()).await;

    if preflight {
        if !decision.allowed {
            debug!(
                path = %path,
                origin = origin.as_deref().unwrap_or_default(),
                "preflight rejected"
            );
            return StatusCode::FORBIDDEN.into_response();
        }
        let mut res = StatusCode::NO_CONTENT.into_response();
        write_preflight_headers(res.headers_mut(), &decision);
        return res;
    }

    let mut res = next.run(req).await;
    let headers = res.headers_mut();
    if origin.is_some() {
        headers.append(header::VARY, HeaderValue::from_static("origin"));
    }
    if let Some(value) = allow_origin_value(&decision) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    res
}

fn is_preflight(req: &Request<Body>) -> bool {
    req.method() == Method::OPTIONS
        && req.headers().contains_key(header::ORIGIN)
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

fn allow_origin_value(decision: &CorsDecision) -> Option<HeaderValue> {
    if !decision.allowed {
        return None;
    }
    decision
        .allowed_origin
        .as_deref()
        .and_then(|o| HeaderValue::from_str(o).ok())
}

fn write_preflight_headers(headers: &mut HeaderMap, decision: &CorsDecision) {
    if let Some(value) = allow_origin_value(decision) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    if !decision.allowed_methods.is_empty()
        && let Ok(value) = HeaderValue::from_str(&decision.allowed_methods.join(", "))
    {
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, value);
    }
    if !decision.allowed_headers.is_empty()
        && let Ok(value) = HeaderValue::from_str(&decision.allowed_headers.join(", "))
    {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from(PREFLIGHT_MAX_AGE_SECONDS),
    );
    headers.insert(
        header::VARY,
        HeaderValue::from_static(
            "origin, access-control-request-method, access-control-request-headers",
        ),
    );
}
