use sqlx::sqlite::SqlitePoolOptions;

use coffeeshop_api::auth::TokenVerifier;
use coffeeshop_api::config::AppConfig;
use coffeeshop_api::handlers;
use coffeeshop_api::store::DrinkStore;
use coffeeshop_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting drinks API in {:?} mode", config.environment);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to {}: {}", config.database.url, e));

    let store = DrinkStore::new(pool);
    // First-run migration, idempotent
    store.ensure_schema().await.expect("schema migration");

    let verifier = TokenVerifier::new(config.auth.clone())
        .unwrap_or_else(|e| panic!("auth configuration: {}", e));

    let app = handlers::app(AppState::new(store, verifier));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("drinks API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
