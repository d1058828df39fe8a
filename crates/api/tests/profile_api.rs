mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use sqlx::PgPool;

use common::{
    body_json, build_test_app, get, get_auth, post_json, put_json_auth, TEST_ADMIN_KEY,
};

/// Sign up a client account, optionally with a full name, and return its
/// access token.
async fn client_token(pool: &PgPool, email: &str, full_name: Option<&str>) -> String {
    let mut body = json!({"email": email, "password": "correct-horse"});
    if let Some(name) = full_name {
        body["full_name"] = json!(name);
    }
    let app = build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}

/// Sign up an admin account and return its access token.
async fn admin_token(pool: &PgPool) -> String {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({
            "email": "ops@example.com",
            "password": "correct-horse",
            "admin_key": TEST_ADMIN_KEY,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}

/// PUT the onboarding update, asserting success, and return the profile.
async fn update_profile(pool: &PgPool, token: &str, body: Value) -> Value {
    let app = build_test_app(pool.clone());
    let response = put_json_auth(app, "/api/v1/profile", body, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Test: sign-up creates the profile the endpoint serves
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_is_created_at_signup(pool: PgPool) {
    let token = client_token(&pool, "dana@example.com", Some("Dana Q")).await;

    let app = build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/profile", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile = body_json(response).await;
    assert_eq!(profile["role"], "client");
    assert_eq!(profile["full_name"], "Dana Q");
    assert_eq!(profile["job_title"], Value::Null);
}

// ---------------------------------------------------------------------------
// Test: the profile endpoint requires authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_requires_auth(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let response = get(app, "/api/v1/profile").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: onboarding trims both fields and persists them
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn onboarding_update_trims_both_fields(pool: PgPool) {
    let token = client_token(&pool, "dana@example.com", None).await;

    let profile = update_profile(
        &pool,
        &token,
        json!({"full_name": "  Dana Q  ", "job_title": "  Product Owner "}),
    )
    .await;
    assert_eq!(profile["full_name"], "Dana Q");
    assert_eq!(profile["job_title"], "Product Owner");

    let app = build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/profile", &token).await;
    let stored = body_json(response).await;
    assert_eq!(stored["full_name"], "Dana Q");
    assert_eq!(stored["job_title"], "Product Owner");
}

// ---------------------------------------------------------------------------
// Test: blank input is treated as absent and keeps stored values
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_input_keeps_existing_values(pool: PgPool) {
    let token = client_token(&pool, "dana@example.com", Some("Dana Q")).await;

    let profile = update_profile(
        &pool,
        &token,
        json!({"full_name": "   ", "job_title": ""}),
    )
    .await;
    assert_eq!(profile["full_name"], "Dana Q");
    assert_eq!(profile["job_title"], Value::Null);
}

// ---------------------------------------------------------------------------
// Test: an admin finishing onboarding without a job title gets the default
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_onboarding_defaults_the_job_title(pool: PgPool) {
    let token = admin_token(&pool).await;

    let profile = update_profile(&pool, &token, json!({"full_name": "Ops Lead"})).await;
    assert_eq!(profile["role"], "admin");
    assert_eq!(profile["full_name"], "Ops Lead");
    assert_eq!(profile["job_title"], "Administrator");
}

// ---------------------------------------------------------------------------
// Test: an explicit admin job title wins over the default and sticks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_explicit_job_title_is_kept(pool: PgPool) {
    let token = admin_token(&pool).await;

    let profile = update_profile(
        &pool,
        &token,
        json!({"full_name": "Ops Lead", "job_title": "CTO"}),
    )
    .await;
    assert_eq!(profile["job_title"], "CTO");

    // A later update without a job title must not reapply the default.
    let profile = update_profile(&pool, &token, json!({"full_name": "Ops"})).await;
    assert_eq!(profile["full_name"], "Ops");
    assert_eq!(profile["job_title"], "CTO");
}

// ---------------------------------------------------------------------------
// Test: clients never receive the admin job-title default
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_never_gets_the_admin_default(pool: PgPool) {
    let token = client_token(&pool, "dana@example.com", None).await;

    let profile = update_profile(&pool, &token, json!({"full_name": "Dana"})).await;
    assert_eq!(profile["role"], "client");
    assert_eq!(profile["job_title"], Value::Null);
}

// ---------------------------------------------------------------------------
// Test: the role column cannot be changed through onboarding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_cannot_be_changed_by_onboarding(pool: PgPool) {
    let token = client_token(&pool, "dana@example.com", None).await;

    let profile = update_profile(
        &pool,
        &token,
        json!({"full_name": "Dana", "role": "admin"}),
    )
    .await;
    assert_eq!(profile["role"], "client");

    let app = build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/profile", &token).await;
    assert_eq!(body_json(response).await["role"], "client");
}