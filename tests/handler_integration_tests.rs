mod common;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use common::{MemoryRepo, as_requester, seed_content, seed_content_full, seed_user, test_state};
use content_portal::{
    error::ApiError,
    handlers,
    models::{CreateContentRequest, UpdateContentRequest},
    query::ContentQuery,
};
use std::sync::Arc;
use std::time::Duration;

fn query(search: Option<&str>, page: Option<u32>) -> Query<ContentQuery> {
    Query(ContentQuery {
        search: search.map(str::to_string),
        page,
    })
}

// --- CRUD round trips ---

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    let (state, _) = test_state(repo);

    let payload = CreateContentRequest {
        title: "Rust Primer".to_string(),
        body: "An introduction to ownership and borrowing.".to_string(),
        summary: "Intro to Rust".to_string(),
        categories: "rust, systems".to_string(),
        document: None,
    };

    let (status, Json(created)) = handlers::create_content(
        as_requester(&author),
        State(state.clone()),
        Json(payload.clone()),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    // Author is taken from the requester, never from the payload.
    assert_eq!(created.author_id, author.id);

    let Json(fetched) =
        handlers::get_content_detail(as_requester(&author), State(state), Path(created.id))
            .await
            .unwrap();

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.title, payload.title);
    assert_eq!(fetched.body, payload.body);
    assert_eq!(fetched.summary, payload.summary);
    assert_eq!(fetched.categories, payload.categories);
    assert_eq!(fetched.document, None);
}

#[tokio::test]
async fn test_partial_update_preserves_unspecified_fields() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    let created = seed_content_full(
        &repo,
        &author,
        "Original",
        "Original body.",
        "Original summary",
        "a, b",
        None,
    )
    .await;
    let (state, _) = test_state(repo);

    // Make sure the refreshed timestamp is observably later.
    tokio::time::sleep(Duration::from_millis(5)).await;

    let Json(updated) = handlers::update_content(
        as_requester(&author),
        State(state),
        Path(created.id),
        Json(UpdateContentRequest {
            title: Some("X".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(updated.title, "X");
    assert_eq!(updated.body, created.body);
    assert_eq!(updated.summary, created.summary);
    assert_eq!(updated.categories, created.categories);
    assert_eq!(updated.document, created.document);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_delete_removes_row_and_stored_document() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    let created = seed_content_full(
        &repo,
        &author,
        "With doc",
        "Body.",
        "Summary",
        "docs",
        Some("documents/abc.pdf"),
    )
    .await;
    let (state, storage) = test_state(repo);

    let status =
        handlers::delete_content(as_requester(&author), State(state.clone()), Path(created.id))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The post-delete hook removed the stored file.
    assert_eq!(storage.deleted(), vec!["documents/abc.pdf".to_string()]);

    // And the row is gone.
    let err = handlers::get_content_detail(as_requester(&author), State(state), Path(created.id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

// --- Ownership and the collapsed 404 ---

#[tokio::test]
async fn test_update_nonowned_matches_missing() {
    let repo = Arc::new(MemoryRepo::new());
    let owner = seed_user(&repo, "owner@example.com", false).await;
    let intruder = seed_user(&repo, "intruder@example.com", false).await;
    let theirs = seed_content(&repo, &owner, "Theirs").await;
    let (state, _) = test_state(repo);

    let update = UpdateContentRequest {
        title: Some("Hijack".to_string()),
        ..Default::default()
    };

    let on_foreign = handlers::update_content(
        as_requester(&intruder),
        State(state.clone()),
        Path(theirs.id),
        Json(update.clone()),
    )
    .await
    .unwrap_err();

    let on_missing = handlers::update_content(
        as_requester(&intruder),
        State(state),
        Path(9999),
        Json(update),
    )
    .await
    .unwrap_err();

    // Unauthorized and nonexistent must be indistinguishable.
    assert_eq!(on_foreign.status(), StatusCode::NOT_FOUND);
    assert_eq!(on_missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_nonowned_matches_missing() {
    let repo = Arc::new(MemoryRepo::new());
    let owner = seed_user(&repo, "owner@example.com", false).await;
    let intruder = seed_user(&repo, "intruder@example.com", false).await;
    let theirs = seed_content(&repo, &owner, "Theirs").await;
    let (state, _) = test_state(repo.clone());

    let on_foreign =
        handlers::delete_content(as_requester(&intruder), State(state.clone()), Path(theirs.id))
            .await
            .unwrap_err();
    let on_missing = handlers::delete_content(as_requester(&intruder), State(state), Path(9999))
        .await
        .unwrap_err();

    assert_eq!(on_foreign.status(), StatusCode::NOT_FOUND);
    assert_eq!(on_missing.status(), StatusCode::NOT_FOUND);
    // The foreign row survived the attempt.
    assert_eq!(repo.contents.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_staff_can_read_and_modify_foreign_content() {
    let repo = Arc::new(MemoryRepo::new());
    let owner = seed_user(&repo, "owner@example.com", false).await;
    let admin = seed_user(&repo, "admin@example.com", true).await;
    let theirs = seed_content(&repo, &owner, "Theirs").await;
    let (state, _) = test_state(repo);

    let Json(fetched) =
        handlers::get_content_detail(as_requester(&admin), State(state.clone()), Path(theirs.id))
            .await
            .unwrap();
    assert_eq!(fetched.id, theirs.id);

    let status = handlers::delete_content(as_requester(&admin), State(state), Path(theirs.id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// --- Visibility in list and search ---

#[tokio::test]
async fn test_list_never_shows_foreign_content() {
    let repo = Arc::new(MemoryRepo::new());
    let alice = seed_user(&repo, "alice@example.com", false).await;
    let bob = seed_user(&repo, "bob@example.com", false).await;
    seed_content(&repo, &alice, "Alice post").await;
    let bobs = seed_content(&repo, &bob, "Bob post").await;
    let (state, _) = test_state(repo);

    let Json(page) = handlers::list_content(
        as_requester(&alice),
        State(state.clone()),
        query(None, None),
    )
    .await
    .unwrap();
    assert_eq!(page.count, 1);
    assert!(page.results.iter().all(|c| c.author_id == alice.id));

    // Searching for the other user's title must not surface it either.
    let Json(page) = handlers::list_content(
        as_requester(&alice),
        State(state),
        query(Some("Bob post"), None),
    )
    .await
    .unwrap();
    assert_eq!(page.count, 0);
    assert!(page.results.iter().all(|c| c.id != bobs.id));
}

#[tokio::test]
async fn test_staff_list_sees_everything() {
    let repo = Arc::new(MemoryRepo::new());
    let alice = seed_user(&repo, "alice@example.com", false).await;
    let bob = seed_user(&repo, "bob@example.com", false).await;
    let admin = seed_user(&repo, "admin@example.com", true).await;
    seed_content(&repo, &alice, "Alice post").await;
    seed_content(&repo, &bob, "Bob post").await;
    let (state, _) = test_state(repo);

    let Json(page) = handlers::list_content(as_requester(&admin), State(state), query(None, None))
        .await
        .unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.results.len(), 2);
}

#[tokio::test]
async fn test_search_matches_categories_case_insensitively() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    seed_content_full(&repo, &author, "Tagged", "Body.", "Summary", "A, B", None).await;
    let (state, _) = test_state(repo);

    let Json(hit) = handlers::list_content(
        as_requester(&author),
        State(state.clone()),
        query(Some("a"), None),
    )
    .await
    .unwrap();
    assert_eq!(hit.count, 1);

    let Json(miss) =
        handlers::list_content(as_requester(&author), State(state), query(Some("Z"), None))
            .await
            .unwrap();
    assert_eq!(miss.count, 0);
    assert!(miss.results.is_empty());
}

#[tokio::test]
async fn test_search_term_with_wildcard_characters_matches_literally() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    seed_content_full(&repo, &author, "Sale", "Save 50% today.", "Deal", "shop", None).await;
    seed_content_full(&repo, &author, "Songs", "50 ways to leave.", "List", "music", None).await;
    let (state, _) = test_state(repo);

    // "50%" is a literal substring of the first row only; the '%' must not
    // act as a wildcard and pull in the second.
    let Json(page) = handlers::list_content(
        as_requester(&author),
        State(state),
        query(Some("50%"), None),
    )
    .await
    .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].title, "Sale");
}

#[tokio::test]
async fn test_blank_search_is_no_filter() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    seed_content(&repo, &author, "One").await;
    seed_content(&repo, &author, "Two").await;
    let (state, _) = test_state(repo);

    let Json(page) = handlers::list_content(
        as_requester(&author),
        State(state),
        query(Some("   "), None),
    )
    .await
    .unwrap();
    assert_eq!(page.count, 2);
}

// --- Pagination ---

#[tokio::test]
async fn test_pagination_windows_and_markers() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    for i in 0..15 {
        seed_content(&repo, &author, &format!("Post {i:02}")).await;
    }
    let (state, _) = test_state(repo);

    let Json(first) = handlers::list_content(
        as_requester(&author),
        State(state.clone()),
        query(None, Some(1)),
    )
    .await
    .unwrap();
    assert_eq!(first.count, 15);
    assert_eq!(first.results.len(), 10);
    assert_eq!(first.next, Some(2));
    assert_eq!(first.previous, None);

    let Json(second) = handlers::list_content(
        as_requester(&author),
        State(state.clone()),
        query(None, Some(2)),
    )
    .await
    .unwrap();
    assert_eq!(second.results.len(), 5);
    assert_eq!(second.next, None);
    assert_eq!(second.previous, Some(1));

    // Pages are contiguous and ordered by id ascending across the boundary.
    let last_of_first = first.results.last().unwrap().id;
    let first_of_second = second.results.first().unwrap().id;
    assert!(first_of_second > last_of_first);
}

#[tokio::test]
async fn test_page_beyond_range_is_empty_not_error() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    seed_content(&repo, &author, "Only one").await;
    let (state, _) = test_state(repo);

    let Json(page) = handlers::list_content(
        as_requester(&author),
        State(state),
        query(None, Some(99)),
    )
    .await
    .unwrap();
    assert_eq!(page.count, 1);
    assert!(page.results.is_empty());
    assert_eq!(page.next, None);
}

// --- Write-path validation ---

#[tokio::test]
async fn test_create_rejects_overlong_title() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    let (state, _) = test_state(repo);

    let err = handlers::create_content(
        as_requester(&author),
        State(state),
        Json(CreateContentRequest {
            title: "t".repeat(31),
            body: "Body.".to_string(),
            summary: "Summary".to_string(),
            categories: "misc".to_string(),
            document: None,
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    match err {
        ApiError::Validation(fields) => assert!(fields.contains_key("title")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_rejects_non_pdf_document() {
    let repo = Arc::new(MemoryRepo::new());
    let author = seed_user(&repo, "author@example.com", false).await;
    let (state, _) = test_state(repo);

    let err = handlers::create_content(
        as_requester(&author),
        State(state),
        Json(CreateContentRequest {
            title: "Doc".to_string(),
            body: "Body.".to_string(),
            summary: "Summary".to_string(),
            categories: "misc".to_string(),
            document: Some("notes.docx".to_string()),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    match err {
        ApiError::Validation(fields) => assert!(fields.contains_key("document")),
        other => panic!("expected validation error, got {other:?}"),
    }
}
