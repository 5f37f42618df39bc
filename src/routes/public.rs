use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Banner pointing at the Swagger UI.
        .route("/", get(handlers::root))
        // GET /health
        // Liveness check for load balancers; never touches the database.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // Form-encoded username/password in, bearer token out.
        .route("/login", post(handlers::login))
}
