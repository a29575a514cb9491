mod common;

use axum::http::StatusCode;
use common::{AUDIENCE, ISSUER, PUBLIC_KEY, get, read_json};
use identity_binding::services::claims::UserRecord;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Value, json};
use tower::ServiceExt;

#[tokio::test]
async fn profile_lists_identity_claims_in_order() {
    let app = common::test_app().await;

    let response = app
        .router
        .oneshot(get("/api/v1/profile/alice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["subject"], "alice");
    assert_eq!(body["active"], true);
    assert_eq!(
        body["claims"],
        json!([
            {"type": "sub", "value": "alice"},
            {"type": "name", "value": "Alice"},
            {"type": "role", "value": "admin"},
            {"type": "role", "value": "user"},
        ])
    );
}

#[tokio::test]
async fn profile_filter_keeps_subject_claim() {
    let app = common::test_app().await;

    let response = app
        .router
        .oneshot(get("/api/v1/profile/alice?claims=role", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(
        body["claims"],
        json!([
            {"type": "sub", "value": "alice"},
            {"type": "role", "value": "admin"},
            {"type": "role", "value": "user"},
        ])
    );
}

#[tokio::test]
async fn profile_rejects_empty_claim_filter() {
    let app = common::test_app().await;

    let response = app
        .router
        .oneshot(get("/api/v1/profile/alice?claims=,", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_CLAIMS");
}

#[tokio::test]
async fn unknown_subject_is_not_found() {
    let app = common::test_app().await;

    let response = app
        .router
        .oneshot(get("/api/v1/profile/nobody", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn user_store_changes_are_visible_immediately() {
    let app = common::test_app().await;
    app.users
        .insert(UserRecord {
            id: "carol".into(),
            user_name: "Carol".into(),
            roles: vec!["auditor".into()],
            is_active: true,
        })
        .await;

    let response = app
        .router
        .oneshot(get("/api/v1/profile/carol?claims=name", None))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(
        body["claims"],
        json!([
            {"type": "sub", "value": "carol"},
            {"type": "name", "value": "Carol"},
        ])
    );
}

#[tokio::test]
async fn assertion_route_exists_only_with_a_signing_key() {
    let app = common::test_app().await;

    let response = app
        .router
        .oneshot(get("/api/v1/profile/alice/assertion", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assertion_is_signed_with_identity_claims() {
    let app = common::test_app_with_signer().await;

    let response = app
        .router
        .oneshot(get("/api/v1/profile/alice/assertion", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["token_type"], "JWT");
    assert_eq!(body["expires_in"], 300);

    let key = DecodingKey::from_ed_pem(PUBLIC_KEY.as_bytes()).unwrap();
    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_issuer(&[ISSUER]);
    validation.set_audience(&[AUDIENCE]);
    let payload = jsonwebtoken::decode::<Value>(body["assertion"].as_str().unwrap(), &key, &validation)
        .unwrap()
        .claims;

    assert_eq!(payload["sub"], "alice");
    assert_eq!(payload["name"], "Alice");
    assert_eq!(payload["role"], json!(["admin", "user"]));
}

#[tokio::test]
async fn inactive_subject_gets_no_assertion() {
    let app = common::test_app_with_signer().await;

    let response = app
        .router
        .oneshot(get("/api/v1/profile/bob/assertion", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn binding_reports_effective_configuration() {
    let app = common::test_app().await;

    let response = app
        .router
        .oneshot(get("/api/v1/binding", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["cookie"]["scheme"], "idsrv");
    assert_eq!(body["cookie"]["login_path"], "/account/login");
    assert_eq!(body["claim_types"]["role"], "role");

    let paths = body["cors_paths"].as_array().unwrap();
    assert_eq!(paths.len(), 13);
    assert!(paths.contains(&json!({"pattern": "/connect/token", "source": "static"})));
    assert!(paths.contains(&json!({"pattern": "/api/v1/health", "source": "registered"})));
}
