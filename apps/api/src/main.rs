use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_store::config::Config;
use resume_store::generation::LlmResumeGenerator;
use resume_store::llm_client::{self, LlmClient};
use resume_store::routes::build_router;
use resume_store::state::AppState;
use resume_store::store::StoreClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration comes first: missing credentials are fatal at startup.
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-store v{}", env!("CARGO_PKG_VERSION"));

    let store = StoreClient::new(config.store_config()).context("invalid GridDB configuration")?;

    // Re-running setup against an existing container is a no-op.
    let created = store
        .ensure_container(None, &config.container)
        .await
        .context("failed to prepare the resume container")?;
    info!(container = %config.container, response = ?created, "container ready");

    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        store,
        generator: Arc::new(LlmResumeGenerator::new(llm)),
        container: config.container.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
