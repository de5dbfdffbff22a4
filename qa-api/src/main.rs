mod routes;

use qa_app::infrastructure::db::SeaOrmStore;
use qa_app::infrastructure::memory::MemoryStore;
use qa_app::{AppConfig, AppContext};
use qa_errors::AppError;
use tower_http::compression::CompressionLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;

    let app = match config.database_url.as_deref() {
        Some(url) => routes::router(AppContext::<SeaOrmStore>::connect(url, &config).await?),
        None => routes::router(AppContext::<MemoryStore>::demo(&config)?),
    }
    .layer(CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| AppError::Internal(format!("failed to bind {}: {}", config.bind_addr, e)))?;

    tracing::info!("Listening on http://{}", config.bind_addr);
    tracing::info!(
        "Write actions limited to {}/min, {}/hour per user",
        config.actions_per_minute,
        config.actions_per_hour
    );

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| AppError::Internal(format!("server error: {}", e)))
}
