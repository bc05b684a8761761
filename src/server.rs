use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::net::TcpListener;
use tokio::time::{Instant, timeout_at};
use tracing::{error, info};

use crate::config::{AppConfig, MirrorBackend};
use crate::persist::{FileMirror, InMemoryMirror, UserMirror};
use crate::storage::RecordStore;
use crate::web::{AppState, build_router};

/// Build the mirror selected by `config`, if any.
pub async fn open_mirror(config: &AppConfig) -> Result<Option<Arc<dyn UserMirror>>> {
    let mirror: Arc<dyn UserMirror> = match config.mirror {
        MirrorBackend::None => return Ok(None),
        MirrorBackend::Memory => Arc::new(InMemoryMirror::new()),
        MirrorBackend::File => Arc::new(
            FileMirror::open(&config.data_dir, &config.database, &config.collection)
                .with_context(|| format!("failed to open mirror {}", config.namespace()))?,
        ),
        MirrorBackend::Mongo => connect_mongo(config).await?,
    };
    info!(mirror = %mirror.describe(), namespace = %config.namespace(), "mirror configured");
    Ok(Some(mirror))
}

#[cfg(feature = "mongo")]
async fn connect_mongo(config: &AppConfig) -> Result<Arc<dyn UserMirror>> {
    let mirror = crate::persist::MongoMirror::connect(
        &config.mongo_uri,
        &config.database,
        &config.collection,
    )
    .await
    .with_context(|| format!("failed to connect to mongo at {}", config.mongo_uri))?;
    Ok(Arc::new(mirror))
}

#[cfg(not(feature = "mongo"))]
async fn connect_mongo(_config: &AppConfig) -> Result<Arc<dyn UserMirror>> {
    anyhow::bail!("mongo mirror requested but userdb was built without the `mongo` feature")
}

/// Create the record store and seed it from the mirror.
///
/// Connecting to the mirror and scanning it share one startup deadline; a
/// timeout or mirror error aborts startup.
pub async fn build_store(config: &AppConfig) -> Result<Arc<RecordStore>> {
    let deadline = Instant::now() + config.startup_timeout();

    let mirror = timeout_at(deadline, open_mirror(config))
        .await
        .map_err(|_| {
            anyhow!(
                "mirror did not connect within {}s",
                config.startup_timeout_secs
            )
        })??;
    let store = match mirror {
        Some(mirror) => RecordStore::with_mirror(mirror).mirror_updates(config.mirror_updates),
        None => RecordStore::new(),
    };

    seed_store(store, deadline).await
}

/// Bulk load `store` from its mirror, giving up at `deadline`.
pub async fn seed_store(store: RecordStore, deadline: Instant) -> Result<Arc<RecordStore>> {
    let loaded = timeout_at(deadline, store.load_from_mirror())
        .await
        .map_err(|_| anyhow!("mirror scan did not finish before the startup deadline"))?
        .context("failed to load users from mirror")?;

    info!(loaded, "record store ready");
    Ok(Arc::new(store))
}

/// User service HTTP server.
pub struct UserServer {
    config: AppConfig,
    store: Arc<RecordStore>,
}

impl UserServer {
    pub fn new(config: AppConfig, store: Arc<RecordStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(self.store.clone()))
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let addr = self.config.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind to {addr}"))?;

        info!(address = %addr, "userdb listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("server error")
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
