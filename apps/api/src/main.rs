use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lingua::config::Config;
use lingua::db::create_pool;
use lingua::routes::build_router;
use lingua::state::AppState;
use lingua::store::{MemoryQueryStore, PgQueryStore, QueryStore};
use lingua::stream::{AiQueryClient, RequestGate};
use lingua::webhook::WebhookClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},lingua={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lingua API v{}", env!("CARGO_PKG_VERSION"));

    // Query store: PostgreSQL when configured, otherwise in memory
    let store: Arc<dyn QueryStore> = match &config.database_url {
        Some(url) => Arc::new(PgQueryStore::new(create_pool(url).await?)),
        None => {
            info!("DATABASE_URL not set, keeping query records in memory");
            Arc::new(MemoryQueryStore::new())
        }
    };

    let ai = AiQueryClient::new(config.ai_query_url.clone());
    info!("AI query endpoint: {}", ai.url());

    let webhook = WebhookClient::new(config.webhook_timeout);
    info!(
        "Webhooks: tts={} cv={} (timeout {:?})",
        config.tts_webhook_url.is_some(),
        config.cv_webhook_url.is_some(),
        config.webhook_timeout
    );

    // Build app state
    let state = AppState {
        store,
        ai,
        webhook,
        gate: RequestGate::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
