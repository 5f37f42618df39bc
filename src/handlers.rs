use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{DetailResponse, LoginForm, MenuItem, MenuItemPayload, MessageResponse, TokenResponse},
};
use axum::{
    Form, Json,
    extract::{Path, State},
};

// --- Public Handlers ---

/// root
///
/// [Public Route] Banner confirming the service is up and where the docs live.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = MessageResponse))
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Menu API is running. Swagger UI: /swagger-ui".to_string(),
    })
}

/// login
///
/// [Public Route] Exchanges a username/password form for a bearer token.
/// Unknown users and wrong passwords get the same 400 so neither can be enumerated.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Bad credentials", body = DetailResponse),
        (status = 500, description = "Token could not be issued", body = DetailResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let verified = state
        .credentials
        .verify_async(&form.username, &form.password)
        .await
        .map_err(|e| {
            tracing::error!("password verification task failed: {:?}", e);
            ApiError::Internal
        })?;
    if !verified {
        tracing::warn!(username = %form.username, "login rejected");
        return Err(ApiError::AuthenticationFailed);
    }

    let token = state.tokens.issue(&form.username)?;
    tracing::info!(username = %form.username, "login succeeded");
    Ok(Json(TokenResponse::bearer(token)))
}

// --- Authenticated Handlers ---

/// protected_menu
///
/// [Authenticated Route] Greets the caller by the username carried in their token.
#[utoipa::path(
    get,
    path = "/menu/protected",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Greeting", body = MessageResponse),
        (status = 401, description = "Invalid token", body = DetailResponse)
    )
)]
pub async fn protected_menu(AuthUser { username }: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("Hello, {}! This is the protected menu.", username),
    })
}

/// get_menu
///
/// [Authenticated Route] Lists every menu item.
#[utoipa::path(
    get,
    path = "/menu",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All menu items", body = [MenuItem]),
        (status = 401, description = "Invalid token", body = DetailResponse)
    )
)]
pub async fn get_menu(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    let items = state.repo.list_items().await?;
    Ok(Json(items))
}

/// create_item
///
/// [Authenticated Route] Adds a menu item. The response carries the id the store assigned.
#[utoipa::path(
    post,
    path = "/menu",
    security(("bearer" = [])),
    request_body = MenuItemPayload,
    responses(
        (status = 200, description = "Created", body = MenuItem),
        (status = 401, description = "Invalid token", body = DetailResponse)
    )
)]
pub async fn create_item(
    AuthUser { username }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<MenuItemPayload>,
) -> Result<Json<MenuItem>, ApiError> {
    let item = state.repo.create_item(payload).await?;
    tracing::info!(id = item.id, %username, "menu item created");
    Ok(Json(item))
}

/// update_item
///
/// [Authenticated Route] Replaces name, description and price of item `id`.
#[utoipa::path(
    put,
    path = "/menu/{id}",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Menu item ID")),
    request_body = MenuItemPayload,
    responses(
        (status = 200, description = "Updated", body = MenuItem),
        (status = 401, description = "Invalid token", body = DetailResponse),
        (status = 404, description = "Not Found", body = DetailResponse)
    )
)]
pub async fn update_item(
    AuthUser { username }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemPayload>,
) -> Result<Json<MenuItem>, ApiError> {
    let item = state.repo.update_item(id, payload).await?;
    tracing::info!(id, %username, "menu item updated");
    Ok(Json(item))
}

/// delete_item
///
/// [Authenticated Route] Removes item `id`. Deleting the same id twice yields 404.
#[utoipa::path(
    delete,
    path = "/menu/{id}",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Deleted", body = DetailResponse),
        (status = 401, description = "Invalid token", body = DetailResponse),
        (status = 404, description = "Not Found", body = DetailResponse)
    )
)]
pub async fn delete_item(
    AuthUser { username }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, ApiError> {
    state.repo.delete_item(id).await?;
    tracing::info!(id, %username, "menu item deleted");
    Ok(Json(DetailResponse {
        detail: "Item deleted".to_string(),
    }))
}
