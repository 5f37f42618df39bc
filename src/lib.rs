use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routers split by access level (public, authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use auth::{CredentialState, TokenIssuer, TokenState};
pub use config::AppConfig;
pub use credentials::CredentialStore;
pub use error::ApiError;
pub use repository::{MenuRepository, RepositoryState, SqliteRepository};

/// ApiDoc
///
/// OpenAPI document for every handler and wire model, served at `/api-docs/openapi.json`
/// and rendered by the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root, handlers::login, handlers::protected_menu, handlers::get_menu,
        handlers::create_item, handlers::update_item, handlers::delete_item
    ),
    components(
        schemas(
            models::MenuItem, models::MenuItemPayload, models::LoginForm,
            models::TokenResponse, models::MessageResponse, models::DetailResponse,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "menu-api", description = "Restaurant menu CRUD API with JWT login")
    )
)]
struct ApiDoc;

/// Registers the `bearer` scheme referenced by the protected paths.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// Everything a request may need, built once at startup and cloned (cheaply, all
/// `Arc`s) into each handler. Replaces process-wide globals so tests can build as
/// many isolated instances as they like.
#[derive(Clone)]
pub struct AppState {
    /// Record store for menu items.
    pub repo: RepositoryState,
    /// Accounts allowed to log in.
    pub credentials: CredentialState,
    /// Signs and validates bearer tokens.
    pub tokens: TokenState,
    pub config: AppConfig,
}

impl AppState {
    /// Derives the credential table and token issuer from `config`.
    ///
    /// Fails only if bcrypt rejects the configured cost.
    pub fn new(config: AppConfig, repo: RepositoryState) -> Result<Self, bcrypt::BcryptError> {
        let credentials = CredentialStore::from_accounts(
            [(config.admin_username.clone(), config.admin_password.as_str())],
            config.bcrypt_cost,
        )?;
        // Out-of-range lifetimes saturate; `issue` then fails with `Internal`.
        let ttl = chrono::Duration::try_minutes(config.token_ttl_minutes)
            .unwrap_or(chrono::Duration::MAX);
        let tokens = TokenIssuer::new(&config.jwt_secret, ttl);

        Ok(Self {
            repo,
            credentials: Arc::new(credentials),
            tokens: Arc::new(tokens),
            config,
        })
    }
}

// --- Axum FromRef Extractor Implementations ---

// Lets extractors such as `AuthUser` pull single components out of the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for CredentialState {
    fn from_ref(app_state: &AppState) -> CredentialState {
        app_state.credentials.clone()
    }
}

impl FromRef<AppState> for TokenState {
    fn from_ref(app_state: &AppState) -> TokenState {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards `authenticated_routes`. Resolving `AuthUser` validates the bearer token; when
/// that fails the extractor's `ApiError::InvalidToken` rejection becomes the response
/// and the handler never runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routers, the auth middleware, the docs, and the request-id, tracing
/// and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, tagged with the `x-request-id` set by `SetRequestIdLayer` so
/// every log line of the request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
