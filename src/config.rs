use std::env;

/// Local fallback for the token signing secret. Production must override it.
const LOCAL_JWT_SECRET: &str = "local-dev-secret-change-in-prod";

/// Upper bound on `ACCESS_TOKEN_EXPIRE_MINUTES`: one year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// AppConfig
///
/// Holds the service configuration. Loaded once at startup and immutable afterwards;
/// handlers and extractors pull it out of `AppState` via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // SQLite connection string for the menu store.
    pub db_url: String,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Runtime environment marker. Selects log format and secret requirements.
    pub env: Env,
    // HS256 secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    // Lifetime of an issued access token.
    pub token_ttl_minutes: i64,
    // The single configured account.
    pub admin_username: String,
    pub admin_password: String,
    // bcrypt work factor used when hashing configured passwords at startup.
    pub bcrypt_cost: u32,
}

/// Env
///
/// Runtime context: `Local` allows development fallbacks, `Production` demands
/// every secret explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests: in-memory database, cheap hashing.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            token_ttl_minutes: 30,
            admin_username: "admin".to_string(),
            admin_password: "password123".to_string(),
            bcrypt_cost: 4,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, failing fast on anything
    /// the current environment cannot run without.
    ///
    /// # Panics
    /// Panics in `Production` when `DATABASE_URL`, `JWT_SECRET` or `ADMIN_PASSWORD`
    /// is unset, and in any environment when a numeric variable does not parse or the
    /// token lifetime falls outside `1..=MAX_TOKEN_TTL_MINUTES`.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let token_ttl_minutes: i64 = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .map(|v| {
                v.parse()
                    .expect("FATAL: ACCESS_TOKEN_EXPIRE_MINUTES must be an integer")
            })
            .unwrap_or(30);
        assert!(
            (1..=MAX_TOKEN_TTL_MINUTES).contains(&token_ttl_minutes),
            "FATAL: ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}"
        );

        let bcrypt_cost: u32 = env::var("BCRYPT_COST")
            .map(|v| v.parse().expect("FATAL: BCRYPT_COST must be an integer"))
            .unwrap_or(bcrypt::DEFAULT_COST);

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                db_url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://menu.db?mode=rwc".to_string()),
                bind_addr,
                jwt_secret: env::var("JWT_SECRET")
                    .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                token_ttl_minutes,
                admin_username,
                admin_password: env::var("ADMIN_PASSWORD")
                    .unwrap_or_else(|_| "password123".to_string()),
                bcrypt_cost,
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: env::var("DATABASE_URL")
                    .expect("FATAL: DATABASE_URL required in prod"),
                bind_addr,
                jwt_secret: env::var("JWT_SECRET")
                    .expect("FATAL: JWT_SECRET must be set in production."),
                token_ttl_minutes,
                admin_username,
                admin_password: env::var("ADMIN_PASSWORD")
                    .expect("FATAL: ADMIN_PASSWORD must be set in production."),
                bcrypt_cost,
            },
        }
    }
}
