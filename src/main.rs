use console_gate::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    directory::{DirectoryState, MemoryUserDirectory, PostgresUserDirectory},
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, the user directory, the idle-tab sweeper and the
/// HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast in production)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise verbose defaults for local work.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "console_gate=debug,tower_http=info,axum=trace".into());

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

    tracing::info!("Console gate starting in {:?} mode", config.env);

    // 3. User directory: Postgres when configured, otherwise an empty in-memory directory
    //    (local only; production always has DATABASE_URL).
    let directory: DirectoryState = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");
            Arc::new(PostgresUserDirectory::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using an empty in-memory user directory");
            Arc::new(MemoryUserDirectory::new())
        }
    };

    let app_state = AppState::new(directory, config.clone());

    // 4. Idle tab sweeper
    let tabs = app_state.tabs.clone();
    let ttl = config.tab_idle_ttl;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval((ttl / 2).max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            tabs.evict_idle(ttl);
        }
    });

    // 5. Router and server
    let app = create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("FATAL: Failed to bind the listen address. Check BIND_ADDR.");

    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
