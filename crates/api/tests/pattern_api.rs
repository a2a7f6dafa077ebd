//! HTTP-level integration tests for pattern administration, tags, and the
//! health endpoint.

mod common;

use atelier_db::models::pattern::CreatePattern;
use atelier_db::repositories::PatternRepo;
use axum::http::StatusCode;
use common::{body_json, get, post_json};
use sqlx::PgPool;

async fn seed_pattern(pool: &PgPool, key: &str, active: bool) -> i64 {
    let pattern = PatternRepo::create_superseding(
        pool,
        &CreatePattern {
            pattern_type: "sender_domain".to_string(),
            pattern_key: key.to_string(),
            target_type: "project".to_string(),
            target_id: 1,
            confidence_boost: 0.15,
            auto_apply: false,
            created_from_suggestion_id: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    if !active {
        PatternRepo::deactivate(pool, pattern.id).await.unwrap();
    }
    pattern.id
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_patterns_defaults_to_active(pool: PgPool) {
    seed_pattern(&pool, "clientco.com", true).await;
    seed_pattern(&pool, "oldclient.com", false).await;

    let response = get(common::build_test_app(pool.clone()), "/api/v1/patterns").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let patterns = json["data"].as_array().unwrap();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0]["pattern_key"], "clientco.com");

    let response = get(
        common::build_test_app(pool),
        "/api/v1/patterns?active_only=false",
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivate_pattern(pool: PgPool) {
    let id = seed_pattern(&pool, "clientco.com", true).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/patterns/{id}/deactivate"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], false);
    assert!(!json["data"]["deactivated_at"].is_null());

    // A second deactivation conflicts; the row is never gone.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/patterns/{id}/deactivate"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/patterns/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivate_unknown_pattern_returns_404(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/patterns/999999/deactivate",
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_tag_is_idempotent_on_name(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/tags",
        serde_json::json!({"name": "Urgent"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["data"]["name"], "urgent");

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/tags",
        serde_json::json!({"name": "urgent"}),
    )
    .await;
    let second = body_json(response).await;
    assert_eq!(second["data"]["id"], first["data"]["id"]);

    let response = get(common::build_test_app(pool), "/api/v1/tags").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_tag_name_rejected(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/tags",
        serde_json::json!({"name": "  "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_reports_ok_with_reachable_db(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}
