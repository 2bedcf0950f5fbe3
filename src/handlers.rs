use crate::{
    AppState, auth,
    auth::AuthUser,
    error::ApiError,
    models::{
        Content, ContentPage, CreateContentRequest, LoginRequest, NewUser,
        PresignedUploadRequest, PresignedUploadResponse, RegisterRequest, TokenPair,
        UpdateContentRequest, UserProfile,
    },
    query::{self, ContentQuery, ContentScope},
    upload, validate,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

// --- User handlers ---

/// register_user
///
/// [Public Route] Creates an author account. Every field rule is checked
/// before the store is touched; the password is hashed here and the raw value
/// goes no further. The created profile is echoed back without anything
/// credential-shaped.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = UserProfile),
        (status = 400, description = "Validation failure or duplicate email")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    validate::validate_registration(&payload)?;

    let password_hash = auth::hash_password(&payload.password)?;

    // Self-registration is the author path; the staff flags are only ever set
    // by the admin seed.
    let new_user = NewUser {
        email: validate::normalize_email(&payload.email),
        password_hash,
        full_name: payload.full_name,
        phone: payload.phone,
        address: payload.address,
        city: payload.city,
        state: payload.state,
        country: payload.country,
        pincode: payload.pincode,
        is_staff: false,
        is_superuser: false,
        is_author: true,
    };

    let user = state.repo.create_user(new_user).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

/// login_user
///
/// [Public Route] Verifies credentials and issues the access/refresh token
/// pair. Unknown email and wrong password answer differently (404 vs 401),
/// matching the registration-facing contract; the existence-hiding rule
/// applies to content, not to accounts.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair", body = TokenPair),
        (status = 401, description = "Incorrect password"),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let email = validate::normalize_email(&payload.email);

    let user = state
        .repo
        .find_user_by_email(&email)
        .await
        .filter(|u| u.is_active)
        .ok_or(ApiError::UserNotFound)?;

    if !auth::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::BadCredentials);
    }

    let tokens = auth::issue_token_pair(user.id, &state.config)?;
    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(tokens))
}

/// get_me
///
/// [Authenticated Route] The requester's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state.repo.get_user(id).await.ok_or(ApiError::Unauthorized)?;
    Ok(Json(UserProfile::from(&user)))
}

// --- Content handlers ---

/// list_content
///
/// [Authenticated Route] The access-filtered listing. The visibility scope is
/// resolved from the requester's flags before anything else: staff sees every
/// row, everyone else only their own, and a search term can only narrow that
/// set. A page number past the end yields an empty page, not an error.
#[utoipa::path(
    get,
    path = "/api/content",
    params(ContentQuery),
    responses((status = 200, description = "Visible, matching, paginated content", body = ContentPage))
)]
pub async fn list_content(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ContentQuery>,
) -> Result<Json<ContentPage>, ApiError> {
    let scope = ContentScope::for_requester(&user);
    let search = params.normalized_search();
    let page = params.effective_page();

    let count = state.repo.count_content(scope, search.clone()).await;
    let window = query::page_window(page);
    let results = state
        .repo
        .list_content(scope, search, window.limit, window.offset)
        .await;
    let (next, previous) = query::page_links(page, count);

    Ok(Json(ContentPage {
        count,
        next,
        previous,
        results,
    }))
}

/// create_content
///
/// [Authenticated Route] Creates a content record. The author is always the
/// authenticated requester; nothing in the payload can assign authorship. An
/// attached document key must pass the upload gate.
#[utoipa::path(
    post,
    path = "/api/content",
    request_body = CreateContentRequest,
    responses(
        (status = 201, description = "Created", body = Content),
        (status = 400, description = "Validation or upload failure")
    )
)]
pub async fn create_content(
    AuthUser { id: author_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<Content>), ApiError> {
    validate::validate_new_content(&payload)?;
    let content = state.repo.create_content(author_id, payload).await?;
    Ok((StatusCode::CREATED, Json(content)))
}

/// get_content_detail
///
/// [Authenticated Route] Single-record fetch, gated by the shared
/// ownership-or-admin predicate. A row the requester may not see answers with
/// the same 404 as a row that does not exist.
#[utoipa::path(
    get,
    path = "/api/content/{id}",
    params(("id" = i64, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Found", body = Content),
        (status = 404, description = "Absent or unauthorized (indistinguishable)")
    )
)]
pub async fn get_content_detail(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Content>, ApiError> {
    let content = state.repo.get_content(id).await.ok_or(ApiError::NotFound)?;
    if !query::can_access(&user, &content) {
        return Err(ApiError::NotFound);
    }
    Ok(Json(content))
}

/// update_content
///
/// [Authenticated Route] Partial update: only supplied fields are
/// overwritten, and updated_at is refreshed. The same ownership-or-admin gate
/// as the detail fetch applies, with the same collapsed 404.
#[utoipa::path(
    put,
    path = "/api/content/{id}",
    params(("id" = i64, Path, description = "Content ID")),
    request_body = UpdateContentRequest,
    responses(
        (status = 200, description = "Updated", body = Content),
        (status = 400, description = "Validation or upload failure"),
        (status = 404, description = "Absent or unauthorized (indistinguishable)")
    )
)]
pub async fn update_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateContentRequest>,
) -> Result<Json<Content>, ApiError> {
    let existing = state.repo.get_content(id).await.ok_or(ApiError::NotFound)?;
    if !query::can_access(&user, &existing) {
        return Err(ApiError::NotFound);
    }

    validate::validate_content_update(&payload)?;

    // The row can vanish between the access check and the update; a
    // concurrent delete wins and this answers 404 like any other absence.
    match state.repo.update_content(id, payload).await {
        Some(content) => Ok(Json(content)),
        None => Err(ApiError::NotFound),
    }
}

/// delete_content
///
/// [Authenticated Route] Deletes a record under the same gate, then runs the
/// post-delete hook: best-effort removal of the stored document. A failed
/// file removal is logged and ignored; the row deletion stands.
#[utoipa::path(
    delete,
    path = "/api/content/{id}",
    params(("id" = i64, Path, description = "Content ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Absent or unauthorized (indistinguishable)")
    )
)]
pub async fn delete_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let existing = state.repo.get_content(id).await.ok_or(ApiError::NotFound)?;
    if !query::can_access(&user, &existing) {
        return Err(ApiError::NotFound);
    }

    let deleted = state
        .repo
        .delete_content(id)
        .await
        .ok_or(ApiError::NotFound)?;

    // Post-delete hook: the file removal is fire-and-forget with respect to
    // the row delete, which has already committed.
    if let Some(document) = &deleted.document {
        if let Err(e) = state.storage.delete_object(document).await {
            tracing::warn!(key = %document, "document cleanup failed: {}", e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

// --- Upload handlers ---

/// presigned_upload
///
/// [Authenticated Route] The document upload pipeline. The filename goes
/// through the upload gate first; only then is a fresh object key generated
/// and a short-lived S3 PUT URL signed for it. The returned key is what the
/// client passes as `document` when creating or updating content.
#[utoipa::path(
    post,
    path = "/api/uploads/presigned",
    request_body = PresignedUploadRequest,
    responses(
        (status = 200, description = "Upload URL and document key", body = PresignedUploadResponse),
        (status = 400, description = "Non-PDF filename rejected")
    )
)]
pub async fn presigned_upload(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUploadRequest>,
) -> Result<Json<PresignedUploadResponse>, ApiError> {
    upload::accept(&payload.filename)?;

    let document_key = upload::document_key();

    match state
        .storage
        .presigned_upload_url(&document_key, "application/pdf")
        .await
    {
        Ok(upload_url) => Ok(Json(PresignedUploadResponse {
            upload_url,
            document_key,
        })),
        Err(e) => {
            tracing::error!("presigned upload failed: {}", e);
            Err(ApiError::Internal)
        }
    }
}
