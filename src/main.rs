use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use llm_faq::api::create_router;
use llm_faq::config::Config;
use llm_faq::pipeline::QaPipeline;

#[derive(Debug, Parser)]
#[command(name = "llm-faq", version, about = "Answer questions with a local LLM")]
struct Args {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Log filter, e.g. "info" or "llm_faq=debug" (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_env()?;

    let filter = match &args.log {
        Some(directives) => EnvFilter::try_new(directives).context("Invalid --log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let bind_addr = args.bind.unwrap_or_else(|| config.bind_addr.clone());
    tracing::info!(
        generation_host = %config.generation_host,
        model = %config.generation_model,
        search_enabled = config.search_enabled,
        "starting llm-faq"
    );

    let pipeline = Arc::new(QaPipeline::new(Arc::new(config))?);
    let app = create_router(pipeline);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    tracing::info!("listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}
