use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a bearer token: the health probe and the two
/// identity gateways. Everything else in the API requires authentication, so
/// this module is deliberately small.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitors and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /api/users/register
        // Author account creation; field validation happens server-side.
        .route("/api/users/register", post(handlers::register_user))
        // POST /api/users/login
        // Credential verification and token-pair issuance.
        .route("/api/users/login", post(handlers::login_user))
}
