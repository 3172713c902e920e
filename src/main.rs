use anyhow::{Context, Result};
use image_analyzer::{create_router, AppState, Config, OpenAiTransport};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "image_analyzer=info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env().context("failed to load configuration")?;
    if !config.has_credential() {
        warn!("OPENAI_API_KEY is not set; responses will fall back to example data");
    }

    let transport = OpenAiTransport::new(&config.base_url);
    let addr = config.bind_addr;
    info!(model = %config.model_name, endpoint = transport.endpoint(), "provider configured");

    let app = create_router(AppState::new(config, transport));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Server running on http://{addr}");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
