use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use userdb::{AppConfig, UserServer, build_store, server::shutdown_signal};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load().context("failed to load application configuration")?;
    let store = build_store(&config)
        .await
        .context("failed to initialize record store")?;

    UserServer::new(config, store).serve(shutdown_signal()).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("userdb=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
