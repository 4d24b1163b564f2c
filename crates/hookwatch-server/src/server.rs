use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use hookwatch_core::{Dispatcher, EventFeed, EventStore};

use crate::handlers;

/// Largest webhook body accepted, matching the sender's own delivery cap.
pub const WEBHOOK_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub feed: EventFeed,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(Arc::clone(&store))),
            feed: EventFeed::new(Arc::clone(&store)),
            store,
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route(
            "/webhook",
            post(handlers::webhook).layer(DefaultBodyLimit::max(WEBHOOK_BODY_LIMIT)),
        )
        .route("/api/events", get(handlers::latest_events))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and start serving. Returns a handle to shut it down.
pub async fn start(
    config: ServerConfig,
    store: Arc<dyn EventStore>,
) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(host = %config.host, port = local_addr.port(), "hookwatch server started");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "server terminated");
        }
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        shutdown_tx,
        server,
    })
}

/// Handle returned by `start()`; the server runs until `shutdown` is awaited
/// or the handle is dropped.
pub struct ServerHandle {
    pub port: u16,
    shutdown_tx: oneshot::Sender<()>,
    server: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.server.await {
            tracing::error!(error = %e, "server task panicked");
        }
        tracing::info!("hookwatch server stopped");
    }
}
