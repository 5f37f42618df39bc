use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind the auth middleware installed in `create_router`, so a
/// request without a valid bearer token is answered with 401 before any handler (and
/// therefore the repository) runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /menu
        // List all items, or add one. The store assigns the new id.
        .route("/menu", get(handlers::get_menu).post(handlers::create_item))
        // GET /menu/protected
        // Greeting naming the authenticated user. Registered as a static segment, so it
        // takes precedence over the `{id}` capture below.
        .route("/menu/protected", get(handlers::protected_menu))
        // PUT/DELETE /menu/{id}
        // Full replacement or removal of one item; 404 when the id does not exist.
        .route(
            "/menu/{id}",
            put(handlers::update_item).delete(handlers::delete_item),
        )
}
