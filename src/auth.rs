use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{credentials::CredentialStore, error::ApiError};

/// Claims
///
/// Payload of an access token. Nothing is stored server-side: a token is valid while
/// its signature checks out, `exp` is in the future and `sub` is still a known account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the username the token was issued to.
    pub sub: String,
    /// Expiration Time (exp): seconds since the epoch.
    pub exp: usize,
    /// Issued At (iat): seconds since the epoch.
    pub iat: usize,
}

/// TokenIssuer
///
/// Signs and verifies HS256 access tokens with the shared secret from `AppConfig`.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

pub type TokenState = Arc<TokenIssuer>;
pub type CredentialState = Arc<CredentialStore>;

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a token for `username` expiring `ttl` from now.
    pub fn issue(&self, username: &str) -> Result<String, ApiError> {
        self.issue_at(username, Utc::now())
    }

    /// issue_at
    ///
    /// Same as `issue` with an explicit issue time, so expiry can be exercised without
    /// waiting out the window.
    pub fn issue_at(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String, ApiError> {
        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            tracing::error!(ttl = ?self.ttl, "token expiry overflows the calendar");
            ApiError::Internal
        })?;
        let claims = Claims {
            sub: username.to_owned(),
            iat: issued_at.timestamp().max(0) as usize,
            exp: expires_at.timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("token signing failed: {:?}", e);
            ApiError::Internal
        })
    }

    /// validate
    ///
    /// Returns the token's username. Fails with `InvalidToken` on a bad signature, an
    /// undecodable payload, a passed expiry, or a subject missing from `credentials`.
    pub fn validate(&self, token: &str, credentials: &CredentialStore) -> Result<String, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                other => tracing::debug!("rejected token: {:?}", other),
            }
            ApiError::InvalidToken
        })?;

        let username = token_data.claims.sub;
        if !credentials.contains(&username) {
            tracing::warn!(%username, "token subject is not a known account");
            return Err(ApiError::InvalidToken);
        }
        Ok(username)
    }
}

/// AuthUser
///
/// The identity behind an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

/// Resolves `AuthUser` from `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively.
///
/// Rejection: `ApiError::InvalidToken` (401) on a missing header, a non-bearer scheme,
/// or any validation failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenState: FromRef<S>,
    CredentialState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenState::from_ref(state);
        let credentials = CredentialState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token)
            .ok_or(ApiError::InvalidToken)?;

        let username = tokens.validate(token.trim(), &credentials)?;
        Ok(AuthUser { username })
    }
}
