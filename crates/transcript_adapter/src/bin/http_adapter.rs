#![forbid(unsafe_code)]

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use transcript_adapter::{router, AdapterConfig, AdapterRuntime, StoreMode};

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AdapterConfig::from_env()?;
    init_tracing(config.log_json);

    let runtime = AdapterRuntime::from_config(&config)?;
    let app = router(runtime);

    match &config.store {
        StoreMode::InMemory => tracing::info!(
            addr = %config.bind,
            "transcript_adapter_http listening (in-memory store)"
        ),
        StoreMode::Journal(path) => tracing::info!(
            addr = %config.bind,
            store = %path.display(),
            "transcript_adapter_http listening"
        ),
    }
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
