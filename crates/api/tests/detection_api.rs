//! HTTP-level integration tests for detector ingestion: batch intake,
//! quarantine of malformed drafts, re-run de-duplication, degraded intake
//! on detector failure, pattern annotation, and auto-apply.

mod common;

use atelier_db::models::pattern::CreatePattern;
use atelier_db::repositories::{CatalogRepo, PatternRepo, SuggestionRepo};
use atelier_db::models::catalog::CreateProject;
use axum::http::StatusCode;
use common::{body_json, get, post_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_project(pool: &PgPool, code: &str) -> i64 {
    CatalogRepo::create_project(
        pool,
        &CreateProject {
            code: code.to_string(),
            name: format!("Project {code}"),
        },
    )
    .await
    .unwrap()
    .id
}

async fn create_document_via_api(pool: PgPool, sender: Option<&str>) -> i64 {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/documents",
        serde_json::json!({
            "title": "RE: Bangkok resort landscape fees",
            "sender": sender,
            "body_text": "Revised fee schedule attached."
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn link_draft(project_id: i64, confidence: f64) -> serde_json::Value {
    serde_json::json!({
        "suggestion_type": "link_project",
        "target_candidate": {"entity_type": "project", "entity_id": project_id},
        "confidence_score": confidence,
        "evidence": {
            "summary": "Subject mentions the project code",
            "detected_projects": ["25 BK-017"],
            "keywords": ["fee schedule"]
        },
        "suggested_actions": [{
            "id": "create_link",
            "action_type": "create_link",
            "description": "Link email to project",
            "database_change": "insert document_links row"
        }]
    })
}

// ---------------------------------------------------------------------------
// Batch intake
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ingest_creates_suggestions_and_quarantines_bad_drafts(pool: PgPool) {
    let doc_id = create_document_via_api(pool.clone(), None).await;
    let project_id = seed_project(&pool, "25 BK-017").await;

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/documents/{doc_id}/detections"),
        serde_json::json!({
            "drafts": [
                link_draft(project_id, 0.74),
                // Confidence out of range: quarantined, not persisted.
                link_draft(project_id, 1.4),
                // Unknown suggestion type: quarantined.
                {"suggestion_type": "link_invoice", "confidence_score": 0.5,
                 "evidence": {"summary": "x"}, "target_candidate": null}
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["created"].as_array().unwrap().len(), 1);
    assert!(json["data"]["updated"].as_array().unwrap().is_empty());

    let quarantined = json["data"]["quarantined"].as_array().unwrap();
    assert_eq!(quarantined.len(), 2);
    assert_eq!(quarantined[0]["index"].as_u64().unwrap(), 1);
    assert_eq!(quarantined[1]["index"].as_u64().unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rerun_updates_pending_suggestion_in_place(pool: PgPool) {
    let doc_id = create_document_via_api(pool.clone(), None).await;
    let project_id = seed_project(&pool, "25 BK-017").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/documents/{doc_id}/detections"),
        serde_json::json!({"drafts": [link_draft(project_id, 0.74)]}),
    )
    .await;
    let first = body_json(response).await;
    let first_id = first["data"]["created"][0]["id"].as_i64().unwrap();

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/documents/{doc_id}/detections"),
        serde_json::json!({"drafts": [link_draft(project_id, 0.81)]}),
    )
    .await;
    let second = body_json(response).await;

    assert!(second["data"]["created"].as_array().unwrap().is_empty());
    let updated = second["data"]["updated"].as_array().unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0]["id"].as_i64().unwrap(), first_id);
    assert_eq!(updated[0]["confidence"].as_f64().unwrap(), 0.81);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_detector_failure_becomes_degraded_suggestion(pool: PgPool) {
    let doc_id = create_document_via_api(pool.clone(), None).await;

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/documents/{doc_id}/detections"),
        serde_json::json!({"drafts": [], "failure": "LLM timeout after 30s"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let created = json["data"]["created"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["suggestion_type"], "categorization");
    assert_eq!(created[0]["confidence"].as_f64().unwrap(), 0.05);
    assert!(created[0]["evidence"]["summary"]
        .as_str()
        .unwrap()
        .contains("LLM timeout"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ingest_against_unknown_document_returns_404(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/documents/999999/detections",
        serde_json::json!({"drafts": []}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Pattern annotation at read time
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_matching_pattern_boosts_displayed_confidence(pool: PgPool) {
    let doc_id = create_document_via_api(pool.clone(), Some("pimjai@clientco.com")).await;
    let project_id = seed_project(&pool, "25 BK-017").await;

    post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/documents/{doc_id}/detections"),
        serde_json::json!({"drafts": [link_draft(project_id, 0.74)]}),
    )
    .await;

    // A pattern learned after ingestion influences the very next fetch.
    PatternRepo::create_superseding(
        &pool,
        &CreatePattern {
            pattern_type: "sender_domain".to_string(),
            pattern_key: "clientco.com".to_string(),
            target_type: "project".to_string(),
            target_id: project_id,
            confidence_boost: 0.15,
            auto_apply: false,
            created_from_suggestion_id: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let response = get(common::build_test_app(pool), "/api/v1/suggestions").await;
    let json = body_json(response).await;
    let item = &json["data"]["items"][0];

    // Stored confidence is untouched; the boost is display-only.
    assert_eq!(item["confidence"].as_f64().unwrap(), 0.74);
    let effective = item["annotation"]["effective_confidence"].as_f64().unwrap();
    assert!((effective - 0.89).abs() < 1e-9);
    assert_eq!(item["annotation"]["bucket"], "high");
    assert_eq!(
        item["annotation"]["matches"][0]["matched_on"],
        "clientco.com"
    );
}

// ---------------------------------------------------------------------------
// Auto-apply
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_auto_apply_pattern_resolves_matching_draft(pool: PgPool) {
    let doc_id = create_document_via_api(pool.clone(), Some("pimjai@clientco.com")).await;
    let project_id = seed_project(&pool, "25 BK-017").await;

    PatternRepo::create_superseding(
        &pool,
        &CreatePattern {
            pattern_type: "sender_domain".to_string(),
            pattern_key: "clientco.com".to_string(),
            target_type: "project".to_string(),
            target_id: project_id,
            confidence_boost: 0.15,
            auto_apply: true,
            created_from_suggestion_id: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/documents/{doc_id}/detections"),
        serde_json::json!({"drafts": [link_draft(project_id, 0.74)]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let auto_applied = json["data"]["auto_applied"].as_array().unwrap();
    assert_eq!(auto_applied.len(), 1);

    let suggestion_id = auto_applied[0].as_i64().unwrap();
    let suggestion = SuggestionRepo::find_by_id(&pool, suggestion_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(suggestion.status, "applied");
    assert_eq!(
        suggestion.resolved_by.as_deref().map(|r| r.starts_with("pattern:")),
        Some(true)
    );

    // The link exists without any reviewer involvement.
    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/documents/{doc_id}"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["links"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_auto_apply_skips_drafts_for_other_targets(pool: PgPool) {
    let doc_id = create_document_via_api(pool.clone(), Some("pimjai@clientco.com")).await;
    let pattern_target = seed_project(&pool, "25 BK-017").await;
    let other = seed_project(&pool, "24 SA-003").await;

    PatternRepo::create_superseding(
        &pool,
        &CreatePattern {
            pattern_type: "sender_domain".to_string(),
            pattern_key: "clientco.com".to_string(),
            target_type: "project".to_string(),
            target_id: pattern_target,
            confidence_boost: 0.15,
            auto_apply: true,
            created_from_suggestion_id: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    // The draft proposes a different project than the pattern's target, so
    // it must queue for manual review instead of auto-applying.
    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/documents/{doc_id}/detections"),
        serde_json::json!({"drafts": [link_draft(other, 0.74)]}),
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"]["auto_applied"].as_array().unwrap().is_empty());
    assert_eq!(json["data"]["created"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["created"][0]["status"], "pending");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_internal_sender_never_auto_applies(pool: PgPool) {
    let doc_id = create_document_via_api(pool.clone(), Some("colleague@bensley.com")).await;
    let project_id = seed_project(&pool, "25 BK-017").await;

    // Even a stale internal-domain pattern row must not fire.
    PatternRepo::create_superseding(
        &pool,
        &CreatePattern {
            pattern_type: "sender_domain".to_string(),
            pattern_key: "bensley.com".to_string(),
            target_type: "project".to_string(),
            target_id: project_id,
            confidence_boost: 0.15,
            auto_apply: true,
            created_from_suggestion_id: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/documents/{doc_id}/detections"),
        serde_json::json!({"drafts": [link_draft(project_id, 0.74)]}),
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"]["auto_applied"].as_array().unwrap().is_empty());
    assert_eq!(json["data"]["created"].as_array().unwrap().len(), 1);
}
