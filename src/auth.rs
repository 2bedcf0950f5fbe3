use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::TokenPair,
    repository::RepositoryState,
};

/// Claim value distinguishing the two token kinds. Only an access token is a
/// valid request credential; the refresh token exists solely to mint new
/// access tokens and must never pass the extractor.
pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Claims
///
/// The payload signed into every bearer JWT. Expiry is the only invalidation
/// mechanism in scope; there is no revocation list.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's UUID, used to re-resolve the identity on each request.
    pub sub: Uuid,
    /// Expiration time. Tokens past this timestamp are rejected.
    pub exp: usize,
    /// Issued-at time.
    pub iat: usize,
    /// "access" or "refresh".
    pub token_type: String,
}

/// hash_password
///
/// One-way hashes a raw password for storage. The raw value is consumed here
/// and never persisted or logged anywhere.
pub fn hash_password(raw: &str) -> Result<String, ApiError> {
    bcrypt::hash(raw, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!("password hashing failed: {:?}", e);
        ApiError::Internal
    })
}

/// verify_password
///
/// Checks a raw password against a stored bcrypt hash. A malformed hash is
/// treated as a mismatch rather than an error so login never 500s on bad data.
pub fn verify_password(raw: &str, hash: &str) -> bool {
    bcrypt::verify(raw, hash).unwrap_or(false)
}

/// Signs one token of the given kind with its own lifetime.
fn sign_token(user_id: Uuid, token_type: &str, ttl_secs: u64, secret: &str) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + ttl_secs as usize,
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token signing failed: {:?}", e);
        ApiError::Internal
    })
}

/// issue_token_pair
///
/// The token issuer: mints an access/refresh pair for a verified user, each
/// with its own configured lifetime.
pub fn issue_token_pair(user_id: Uuid, config: &AppConfig) -> Result<TokenPair, ApiError> {
    Ok(TokenPair {
        access: sign_token(
            user_id,
            TOKEN_TYPE_ACCESS,
            config.access_token_ttl_secs,
            &config.jwt_secret,
        )?,
        refresh: sign_token(
            user_id,
            TOKEN_TYPE_REFRESH,
            config.refresh_token_ttl_secs,
            &config.jwt_secret,
        )?,
    })
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the user's id plus the
/// capability flags every authorization decision reads. Handlers take this as
/// an argument and never look at the raw token themselves.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    /// Admin capability: sees and may modify all content.
    pub is_staff: bool,
    /// Author capability: the self-registration path sets this.
    pub is_author: bool,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait so AuthUser can appear as a
/// handler argument. The flow:
/// 1. Dependency resolution: repository and config from the shared state.
/// 2. Local bypass: in Env::Local only, an `x-user-id` header naming an
///    existing user authenticates the request (development convenience).
/// 3. Bearer extraction and JWT validation; refresh tokens are refused.
/// 4. Database lookup, so a deleted or deactivated user is rejected even
///    while holding a token that is still formally valid.
///
/// Rejection: 401 with a JSON detail body, for every failure mode.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local development bypass, guarded by the Env check. The named user
        // must actually exist so the capability flags are real.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        if let Some(user) = repo.get_user(user_id).await {
                            if user.is_active {
                                return Ok(AuthUser {
                                    id: user.id,
                                    is_staff: user.is_staff,
                                    is_author: user.is_author,
                                });
                            }
                        }
                    }
                }
            }
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        validation.validate_exp = true;

        // Expired, tampered, and malformed tokens all collapse into the same
        // 401; the distinction is not interesting to the caller.
        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| ApiError::Unauthorized)?;

        // A refresh token is not a request credential.
        if token_data.claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(ApiError::Unauthorized);
        }

        // Final verification against the store: the user must still exist and
        // still be active.
        let user = repo
            .get_user(token_data.claims.sub)
            .await
            .filter(|u| u.is_active)
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            is_staff: user.is_staff,
            is_author: user.is_author,
        })
    }
}
