use std::collections::HashMap;

use bcrypt::BcryptError;
use tokio::task::JoinError;

/// CredentialStore
///
/// The fixed set of accounts allowed to log in, username -> bcrypt hash. Built once at
/// startup and shared read-only through `AppState`; there is no way to add or remove
/// entries afterwards.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    hashes: HashMap<String, String>,
}

impl CredentialStore {
    /// Hashes each plaintext password with the given bcrypt cost.
    pub fn from_accounts<I, U, P>(accounts: I, cost: u32) -> Result<Self, BcryptError>
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: AsRef<str>,
    {
        let hashes = accounts
            .into_iter()
            .map(|(username, password)| {
                bcrypt::hash(password.as_ref(), cost).map(|hash| (username.into(), hash))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self { hashes })
    }

    /// Accepts already-hashed entries as is.
    pub fn from_hashes<I, U, H>(entries: I) -> Self
    where
        I: IntoIterator<Item = (U, H)>,
        U: Into<String>,
        H: Into<String>,
    {
        Self {
            hashes: entries
                .into_iter()
                .map(|(u, h)| (u.into(), h.into()))
                .collect(),
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.hashes.contains_key(username)
    }

    /// verify
    ///
    /// `true` only when `username` exists and `password` matches its hash. A hash that
    /// bcrypt cannot parse counts as a mismatch.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Some(hash) = self.hashes.get(username) else {
            return false;
        };
        check_hash(username, password, hash)
    }

    /// verify_async
    ///
    /// Same as `verify`, with the bcrypt work run on tokio's blocking pool. Errors only
    /// when that task panics or is cancelled.
    pub async fn verify_async(&self, username: &str, password: &str) -> Result<bool, JoinError> {
        let Some(hash) = self.hashes.get(username).cloned() else {
            return Ok(false);
        };
        let username = username.to_owned();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || check_hash(&username, &password, &hash)).await
    }
}

fn check_hash(username: &str, password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or_else(|e| {
        tracing::error!(%username, "password hash verification failed: {}", e);
        false
    })
}

