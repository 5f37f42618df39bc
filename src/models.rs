use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Persisted Schema ---

/// MenuItem
///
/// One row of the `menu_items` table. The `id` is assigned by the store on insert
/// and is the only key used for updates and deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    // Non-negative by convention; not enforced.
    pub price: f64,
}

// --- Request Payloads ---

/// MenuItemPayload
///
/// Body of `POST /menu` and `PUT /menu/{id}`. Updates overwrite every field, so all
/// three are required. A client-supplied `id` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MenuItemPayload {
    #[schema(example = "Ribeye steak")]
    pub name: String,
    #[schema(example = "Juicy rib cut, 100 g.")]
    pub description: String,
    #[schema(example = 500.0)]
    pub price: f64,
}

impl MenuItemPayload {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
        }
    }
}

/// LoginForm
///
/// Form-encoded body of `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// --- Response Schemas ---

/// TokenResponse
///
/// Successful login. `token_type` is always `"bearer"`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Free-form message body (root banner, protected greeting).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

/// Status detail body, shared by delete confirmations and every error response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DetailResponse {
    pub detail: String,
}
