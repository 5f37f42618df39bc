use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use menu_api::{
    ApiError, AppConfig, AppState, CredentialStore, TokenIssuer,
    auth::{AuthUser, Claims},
    models::{MenuItem, MenuItemPayload},
    repository::{MenuRepository, RepositoryError},
};
use std::sync::Arc;

// --- Stub Repository ---

// Authentication must never reach the store.
struct StubRepository;

#[async_trait]
impl MenuRepository for StubRepository {
    async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        panic!("Stub called")
    }
    async fn create_item(&self, _p: MenuItemPayload) -> Result<MenuItem, RepositoryError> {
        panic!("Stub called")
    }
    async fn update_item(
        &self,
        _id: i64,
        _p: MenuItemPayload,
    ) -> Result<MenuItem, RepositoryError> {
        panic!("Stub called")
    }
    async fn delete_item(&self, _id: i64) -> Result<(), RepositoryError> {
        panic!("Stub called")
    }
    async fn count_items(&self) -> Result<i64, RepositoryError> {
        panic!("Stub called")
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

fn admin_store() -> CredentialStore {
    CredentialStore::from_accounts([("admin", "password123")], 4).unwrap()
}

fn issuer() -> TokenIssuer {
    TokenIssuer::new(TEST_JWT_SECRET, Duration::minutes(30))
}

fn create_app_state() -> AppState {
    let config = AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    AppState::new(config, Arc::new(StubRepository)).unwrap()
}

fn get_request_parts(authorization: Option<&str>) -> Parts {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri("/menu".parse::<Uri>().unwrap());
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let (parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    parts
}

// --- Credential Verifier ---

#[test]
fn test_verify_correct_password() {
    assert!(admin_store().verify("admin", "password123"));
}

#[test]
fn test_verify_wrong_password() {
    assert!(!admin_store().verify("admin", "wrong"));
}

#[test]
fn test_verify_unknown_user() {
    let store = admin_store();
    assert!(!store.verify("nobody", "password123"));
    assert!(!store.verify("nobody", ""));
}

#[test]
fn test_verify_multiple_accounts() {
    let store =
        CredentialStore::from_accounts([("admin", "password123"), ("chef", "knives")], 4).unwrap();
    assert!(store.verify("chef", "knives"));
    assert!(!store.verify("chef", "password123"));
    assert!(store.verify("admin", "password123"));
}

#[test]
fn test_malformed_hash_is_a_mismatch() {
    let store = CredentialStore::from_hashes([("admin", "not-a-bcrypt-hash")]);
    assert!(store.contains("admin"));
    assert!(!store.verify("admin", "password123"));
}

#[tokio::test]
async fn test_verify_async_matches_verify() {
    let store = admin_store();
    assert!(store.verify_async("admin", "password123").await.unwrap());
    assert!(!store.verify_async("admin", "wrong").await.unwrap());
    assert!(!store.verify_async("nobody", "password123").await.unwrap());
}

// --- Token Issuer/Validator ---

#[test]
fn test_issued_token_validates_immediately() {
    let token = issuer().issue("admin").unwrap();
    let username = issuer().validate(&token, &admin_store()).unwrap();
    assert_eq!(username, "admin");
}

#[test]
fn test_token_expires_after_window() {
    let issued_at = Utc::now() - Duration::minutes(31);
    let token = issuer().issue_at("admin", issued_at).unwrap();

    let result = issuer().validate(&token, &admin_store());
    assert!(matches!(result, Err(ApiError::InvalidToken)));
}

#[test]
fn test_token_still_valid_inside_window() {
    let issued_at = Utc::now() - Duration::minutes(29);
    let token = issuer().issue_at("admin", issued_at).unwrap();

    assert_eq!(issuer().validate(&token, &admin_store()).unwrap(), "admin");
}

#[test]
fn test_token_signed_with_other_secret_rejected() {
    let token = TokenIssuer::new("some-other-secret", Duration::minutes(30))
        .issue("admin")
        .unwrap();

    let result = issuer().validate(&token, &admin_store());
    assert!(matches!(result, Err(ApiError::InvalidToken)));
}

#[test]
fn test_overflowing_lifetime_fails_issue() {
    let result = TokenIssuer::new(TEST_JWT_SECRET, Duration::MAX).issue("admin");
    assert!(matches!(result, Err(ApiError::Internal)));
}

#[test]
fn test_out_of_range_config_ttl_fails_issue() {
    let config = AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        token_ttl_minutes: 1_000_000_000_000,
        ..AppConfig::default()
    };
    let app_state = AppState::new(config, Arc::new(StubRepository)).unwrap();

    assert!(matches!(app_state.tokens.issue("admin"), Err(ApiError::Internal)));
}

#[test]
fn test_garbage_token_rejected() {
    let result = issuer().validate("not.a.jwt", &admin_store());
    assert!(matches!(result, Err(ApiError::InvalidToken)));
}

#[test]
fn test_token_for_unknown_subject_rejected() {
    let token = issuer().issue("ghost").unwrap();
    let result = issuer().validate(&token, &admin_store());
    assert!(matches!(result, Err(ApiError::InvalidToken)));
}

#[test]
fn test_hand_built_claims_accepted() {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: "admin".to_string(),
        iat: now,
        exp: now + 600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    assert_eq!(issuer().validate(&token, &admin_store()).unwrap(), "admin");
}

// --- AuthUser Extractor ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let app_state = create_app_state();
    let token = app_state.tokens.issue("admin").unwrap();

    let mut parts = get_request_parts(Some(&format!("Bearer {}", token)));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap().username, "admin");
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state();

    let mut parts = get_request_parts(None);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(matches!(auth_user, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn test_auth_failure_with_wrong_scheme() {
    let app_state = create_app_state();
    let token = app_state.tokens.issue("admin").unwrap();

    let mut parts = get_request_parts(Some(&format!("Basic {}", token)));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(matches!(auth_user, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let app_state = create_app_state();
    let token = app_state
        .tokens
        .issue_at("admin", Utc::now() - Duration::hours(1))
        .unwrap();

    let mut parts = get_request_parts(Some(&format!("Bearer {}", token)));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(matches!(auth_user, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn test_auth_scheme_is_case_insensitive() {
    let app_state = create_app_state();
    let token = app_state.tokens.issue("admin").unwrap();

    for scheme in ["bearer", "BEARER", "BeArEr"] {
        let mut parts = get_request_parts(Some(&format!("{} {}", scheme, token)));
        let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

        assert_eq!(auth_user.unwrap().username, "admin", "scheme {scheme}");
    }
}

#[tokio::test]
async fn test_auth_failure_with_scheme_only() {
    let app_state = create_app_state();

    let mut parts = get_request_parts(Some("Bearer"));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(matches!(auth_user, Err(ApiError::InvalidToken)));
}
