use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity record stored in the `users` table. The capability
/// flags (`is_staff`, `is_author`, `is_superuser`) are independent booleans on
/// the one record, not a role hierarchy: `is_staff` drives the admin
/// visibility override, `is_author` marks the self-registration path.
///
/// This struct is internal only. It carries the password hash and is never
/// serialized to a response; see [`UserProfile`] for the outward shape.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    /// Unique natural key, lowercased before storage and lookup.
    pub email: String,
    /// bcrypt hash. The raw password is never persisted or logged.
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_author: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// NewUser
///
/// Insert payload for the credential store. Built server-side from a validated
/// registration request (or the admin seed); the email is already normalized
/// and the password already hashed by the time this struct exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_author: bool,
}

/// Content
///
/// A content record from the `contents` table. `author_id` is the owning user
/// reference; `document` (when present) is an object-storage key that has been
/// accepted by the upload gate. `id` is an ascending BIGSERIAL and doubles as
/// the deterministic pagination order key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Content {
    pub id: i64,
    // FK to users.id (owner). Always taken from the authenticated requester.
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub summary: String,
    /// Free-text comma list, e.g. "rust, backend".
    pub categories: String,
    /// Object key under `documents/`, present only when a PDF was attached.
    pub document: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update.
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for POST /api/users/register. Field rules are enforced by
/// `validate::validate_registration` before anything touches the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    /// Checked for length and character-class rules, then hashed. Never echoed.
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub pincode: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// LoginRequest
///
/// Input payload for POST /api/users/login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateContentRequest
///
/// Input payload for POST /api/content. The author is never part of this
/// payload; it is always taken from the authenticated requester.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateContentRequest {
    pub title: String,
    pub body: String,
    pub summary: String,
    pub categories: String,
    /// Object key returned by the presigned-upload flow. Must pass the
    /// upload gate (".pdf", case-insensitive).
    #[serde(default)]
    pub document: Option<String>,
}

/// UpdateContentRequest
///
/// Partial update payload for PUT /api/content/{id}. All fields are
/// `Option<T>`; only supplied fields are overwritten, the rest keep their
/// prior values (COALESCE at the repository layer).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// PresignedUploadRequest
///
/// Input payload for requesting a short-lived S3 upload URL for a document
/// attachment. Only the filename matters; the gate checks its extension.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PresignedUploadRequest {
    /// The original filename, used to derive and check the extension.
    #[schema(example = "report.pdf")]
    pub filename: String,
}

/// PresignedUploadResponse
///
/// The temporary URL for the client PUT plus the object key to reference in
/// the content record's `document` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PresignedUploadResponse {
    pub upload_url: String,
    pub document_key: String,
}

// --- Response Schemas (Output) ---

/// TokenPair
///
/// Output of a successful login: two opaque bearer JWTs with independent
/// expiry. The access token authorizes requests; the refresh token exists to
/// mint new access tokens (redemption is out of scope here).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// UserProfile
///
/// The outward-facing serialization of a user. Mirrors the identity record
/// minus everything credential-shaped.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: String,
    pub is_author: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            city: user.city.clone(),
            state: user.state.clone(),
            country: user.country.clone(),
            pincode: user.pincode.clone(),
            is_author: user.is_author,
        }
    }
}

/// ContentPage
///
/// Paginated envelope for GET /api/content: the visible, matching slice plus
/// the total count and next/previous page markers. Page numbers are 1-based.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ContentPage {
    /// Total matching rows across all pages, after visibility and search.
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<Content>,
}
