use smartkharcha::{api::{start_server, ApiState}, config::AdvisorConfig, KnowledgeBase};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AdvisorConfig::from_env()?;

    info!("SmartKharcha Advisor - API Server");
    info!(port = config.port, provider = ?config.provider, "Configuration loaded");

    let knowledge_base = Arc::new(KnowledgeBase::load(&config.knowledge_base_path)?);
    let state = ApiState::from_config(&config, knowledge_base)?;

    info!("Advisor initialized, starting API server");

    start_server(state, config.port).await?;

    Ok(())
}
