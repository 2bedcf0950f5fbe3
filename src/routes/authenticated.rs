use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every route here sits behind the `AuthUser` extractor middleware applied
/// in `create_router`, so handlers always receive a resolved identity with
/// its capability flags. Authorization beyond "is authenticated" — the
/// ownership-or-admin gate on individual records — is decided inside the
/// handlers through the shared `can_access` predicate, not here.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/users/me
        // The requester's own profile.
        .route("/api/users/me", get(handlers::get_me))
        // GET /api/content?search=...&page=...
        // The access-filtered, searchable, paginated listing.
        // POST /api/content
        // Creates a record owned by the requester.
        .route(
            "/api/content",
            get(handlers::list_content).post(handlers::create_content),
        )
        // GET/PUT/DELETE /api/content/{id}
        // Detail, partial update, and delete, all behind the same
        // ownership-or-admin gate with the collapsed 404.
        .route(
            "/api/content/{id}",
            get(handlers::get_content_detail)
                .put(handlers::update_content)
                .delete(handlers::delete_content),
        )
        // POST /api/uploads/presigned
        // PDF-gated presigned PUT URL for document attachments.
        .route("/api/uploads/presigned", post(handlers::presigned_upload))
}
