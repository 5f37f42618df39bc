use menu_api::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{RepositoryState, SqliteRepository},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, opens and prepares the SQLite store, then
/// serves the API until Ctrl-C.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "menu_api=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database: create the file if needed, then the table, then the demo rows.
    let connect_options = SqliteConnectOptions::from_str(&config.db_url)
        .expect("FATAL: DATABASE_URL is not a valid SQLite URL.")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("FATAL: Failed to open SQLite database. Check DATABASE_URL.");

    let sqlite_repo = SqliteRepository::new(pool);
    sqlite_repo
        .init_schema()
        .await
        .expect("FATAL: Failed to create menu_items table.");
    sqlite_repo
        .seed_defaults()
        .await
        .expect("FATAL: Failed to seed menu_items table.");
    let repo = Arc::new(sqlite_repo) as RepositoryState;

    // 4. Unified state: credentials are hashed here, once.
    let bind_addr = config.bind_addr.clone();
    let app_state =
        AppState::new(config, repo).expect("FATAL: Failed to hash configured password.");

    // 5. Router and server
    let app = create_router(app_state);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down gracefully");
        })
        .await
        .expect("FATAL: HTTP server exited with error.");
}
