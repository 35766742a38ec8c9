// src/main.rs

use anyhow::Result;
use talapker_config::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;

use app::TalapkerApp;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("Starting Talapker NLP service v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_env()?;

    let app = TalapkerApp::new(config).await?;
    app.run().await?;

    info!("Talapker shut down");
    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talapker=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
