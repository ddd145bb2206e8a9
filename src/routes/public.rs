use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// The only endpoints reachable without a session. This is a private blog:
/// even published posts are behind the session layer, so the public surface is
/// just the login gateway plus a few static lookups.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // Verifies seeded credentials and issues the session cookie. Unknown
        // user and wrong password are indistinguishable in the response.
        .route("/login", post(handlers::login))
        // POST /logout
        // Clears the session cookie. Idempotent; tokens are never revoked
        // server-side.
        .route("/logout", post(handlers::logout))
        // GET /templates
        // The fixed template registry, needed by the login-free marketing shell.
        .route("/templates", get(handlers::list_templates))
}
