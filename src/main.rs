//! Playloop backend binary entrypoint wiring the REST API to the configured document store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playloop_back::{
    config::{AppConfig, StoreConfig},
    dao::document_store::{DocumentStore, memory::MemoryDocumentStore},
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[cfg(feature = "couch-store")]
const COUCH_CONNECT_ATTEMPTS: u32 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = open_store(&config.store).await?;

    let app_state = AppState::new(store, &config);
    tokio::spawn(storage_supervisor::watch_health(app_state.clone()));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Instantiate the document store selected by the configuration.
async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config {
        StoreConfig::Memory {
            snapshot_path: Some(path),
        } => {
            let store = MemoryDocumentStore::open(path.clone())
                .await
                .with_context(|| format!("opening snapshot `{}`", path.display()))?;
            info!(path = %path.display(), documents = store.len(), "memory store loaded from snapshot");
            Ok(Arc::new(store))
        }
        StoreConfig::Memory {
            snapshot_path: None,
        } => {
            info!("using volatile memory store");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreConfig::Couch => open_couch_store().await,
    }
}

#[cfg(feature = "couch-store")]
async fn open_couch_store() -> anyhow::Result<Arc<dyn DocumentStore>> {
    use playloop_back::dao::document_store::couchdb::{CouchConfig, CouchDocumentStore};

    let couch_config = CouchConfig::from_env().context("reading CouchDB configuration")?;
    let store = storage_supervisor::connect_with_backoff(
        || CouchDocumentStore::connect(couch_config.clone()),
        COUCH_CONNECT_ATTEMPTS,
    )
    .await
    .context("connecting to CouchDB")?;
    info!(database = %couch_config.database, "connected to CouchDB");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "couch-store"))]
async fn open_couch_store() -> anyhow::Result<Arc<dyn DocumentStore>> {
    anyhow::bail!("CouchDB support is disabled; rebuild with the `couch-store` feature")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
