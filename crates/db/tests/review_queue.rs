//! Integration tests for review-queue ordering and keyset pagination:
//! - confidence DESC, created_at DESC, id DESC total order
//! - cursor continuation is exact (no skips, no repeats)
//! - rows resolved between pages do not disturb the cursor
//! - type and confidence-band filters

use atelier_core::detector::Evidence;
use atelier_core::queue::QueueCursor;
use atelier_db::models::document::CreateSourceDocument;
use atelier_db::models::suggestion::{NewSuggestion, Suggestion, SuggestionListParams};
use atelier_db::repositories::{DocumentRepo, SuggestionRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_document(pool: &PgPool, title: &str) -> i64 {
    DocumentRepo::create(
        pool,
        &CreateSourceDocument {
            doc_type: "email".to_string(),
            title: title.to_string(),
            sender: None,
            body_text: None,
            received_at: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_suggestion(
    pool: &PgPool,
    doc_id: i64,
    suggestion_type: &str,
    confidence: f64,
) -> Suggestion {
    SuggestionRepo::upsert_draft(
        pool,
        &NewSuggestion {
            suggestion_type: suggestion_type.to_string(),
            source_type: "email".to_string(),
            source_id: doc_id,
            target_type: None,
            target_id: None,
            confidence,
            evidence: Evidence {
                summary: format!("draft at {confidence}"),
                ..Evidence::default()
            },
            suggested_actions: Vec::new(),
        },
    )
    .await
    .unwrap()
}

fn cursor_for(s: &Suggestion) -> QueueCursor {
    QueueCursor {
        confidence: s.confidence,
        created_at: s.created_at,
        id: s.id,
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_queue_orders_by_confidence_desc(pool: PgPool) {
    for (i, confidence) in [0.51, 0.92, 0.2, 0.79].into_iter().enumerate() {
        let doc_id = seed_document(&pool, &format!("email {i}")).await;
        seed_suggestion(&pool, doc_id, "categorization", confidence).await;
    }

    let queue = SuggestionRepo::list_pending(&pool, &SuggestionListParams::default(), 20, None)
        .await
        .unwrap();

    let confidences: Vec<f64> = queue.iter().map(|s| s.confidence).collect();
    assert_eq!(confidences, vec![0.92, 0.79, 0.51, 0.2]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_equal_confidence_breaks_ties_by_recency_then_id(pool: PgPool) {
    let doc_id = seed_document(&pool, "email").await;
    let older = seed_suggestion(&pool, doc_id, "categorization", 0.7).await;
    let doc_id2 = seed_document(&pool, "email 2").await;
    let newer = seed_suggestion(&pool, doc_id2, "categorization", 0.7).await;

    let queue = SuggestionRepo::list_pending(&pool, &SuggestionListParams::default(), 20, None)
        .await
        .unwrap();

    // Same statement clock would make created_at equal; id DESC still puts
    // the later insert first.
    assert_eq!(queue[0].id, newer.id);
    assert_eq!(queue[1].id, older.id);
}

// ---------------------------------------------------------------------------
// Keyset pagination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cursor_pages_without_skips_or_repeats(pool: PgPool) {
    for i in 0..5 {
        let doc_id = seed_document(&pool, &format!("email {i}")).await;
        seed_suggestion(&pool, doc_id, "categorization", 0.9 - (i as f64) * 0.1).await;
    }

    let params = SuggestionListParams::default();
    let first_page = SuggestionRepo::list_pending(&pool, &params, 2, None)
        .await
        .unwrap();
    assert_eq!(first_page.len(), 2);

    let cursor = cursor_for(first_page.last().unwrap());
    let second_page = SuggestionRepo::list_pending(&pool, &params, 2, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(second_page.len(), 2);

    let cursor = cursor_for(second_page.last().unwrap());
    let third_page = SuggestionRepo::list_pending(&pool, &params, 2, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(third_page.len(), 1);

    let mut seen: Vec<i64> = first_page
        .iter()
        .chain(&second_page)
        .chain(&third_page)
        .map(|s| s.id)
        .collect();
    let total = seen.len();
    seen.dedup();
    assert_eq!(seen.len(), total);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rows_resolved_mid_pagination_do_not_shift_cursor(pool: PgPool) {
    let mut ids = Vec::new();
    for i in 0..4 {
        let doc_id = seed_document(&pool, &format!("email {i}")).await;
        ids.push(
            seed_suggestion(&pool, doc_id, "categorization", 0.9 - (i as f64) * 0.1)
                .await
                .id,
        );
    }

    let params = SuggestionListParams::default();
    let first_page = SuggestionRepo::list_pending(&pool, &params, 2, None)
        .await
        .unwrap();
    assert_eq!(first_page.len(), 2);

    // Another session resolves an item from the first page.
    let mut tx = pool.begin().await.unwrap();
    SuggestionRepo::mark_applied(&mut tx, first_page[0].id, None, None)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // Continuation still starts strictly after the last item seen.
    let cursor = cursor_for(first_page.last().unwrap());
    let second_page = SuggestionRepo::list_pending(&pool, &params, 2, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(second_page.len(), 2);
    assert_eq!(second_page[0].id, ids[2]);
    assert_eq!(second_page[1].id, ids[3]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cursor_round_trips_through_encoding(pool: PgPool) {
    let doc_id = seed_document(&pool, "email").await;
    let s = seed_suggestion(&pool, doc_id, "categorization", 0.79).await;

    // 0.79 is not exactly representable; the encoded cursor must compare
    // equal to the stored row when it comes back.
    let decoded = QueueCursor::decode(&cursor_for(&s).encode()).unwrap();
    let page = SuggestionRepo::list_pending(
        &pool,
        &SuggestionListParams::default(),
        20,
        Some(&decoded),
    )
    .await
    .unwrap();
    assert!(page.is_empty());
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_type_filter(pool: PgPool) {
    let a = seed_document(&pool, "email a").await;
    seed_suggestion(&pool, a, "categorization", 0.7).await;
    let b = seed_document(&pool, "email b").await;
    seed_suggestion(&pool, b, "new_contact", 0.6).await;

    let params = SuggestionListParams {
        suggestion_type: Some("new_contact".to_string()),
        ..SuggestionListParams::default()
    };
    let queue = SuggestionRepo::list_pending(&pool, &params, 20, None)
        .await
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].suggestion_type, "new_contact");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_confidence_band_filter(pool: PgPool) {
    for (i, confidence) in [0.92, 0.79, 0.51, 0.2].into_iter().enumerate() {
        let doc_id = seed_document(&pool, &format!("email {i}")).await;
        seed_suggestion(&pool, doc_id, "categorization", confidence).await;
    }

    let params = SuggestionListParams {
        min_confidence: Some(0.5),
        max_confidence: Some(0.8),
        ..SuggestionListParams::default()
    };
    let queue = SuggestionRepo::list_pending(&pool, &params, 20, None)
        .await
        .unwrap();
    let confidences: Vec<f64> = queue.iter().map(|s| s.confidence).collect();
    assert_eq!(confidences, vec![0.79, 0.51]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolved_rows_never_appear(pool: PgPool) {
    let doc_id = seed_document(&pool, "email").await;
    let s = seed_suggestion(&pool, doc_id, "categorization", 0.7).await;

    let mut tx = pool.begin().await.unwrap();
    SuggestionRepo::mark_rejected(&mut tx, s.id, "not_relevant", None)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let queue = SuggestionRepo::list_pending(&pool, &SuggestionListParams::default(), 20, None)
        .await
        .unwrap();
    assert!(queue.is_empty());
}
