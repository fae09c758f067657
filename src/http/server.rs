//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Build the origin client, cache store and orchestrator
//! - Sweep expired cache entries in the background
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::{CacheStore, MemoryStore, RedirectCache};
use crate::config::validation::ValidationError;
use crate::config::ProxyConfig;
use crate::http::origin::{HyperOrigin, Origin, OriginError};
use crate::http::request::MakeRequestUuid;
use crate::pipeline::Orchestrator;

/// Interval between sweeps of expired cache entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Errors that prevent the server from being built.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Origin(#[from] OriginError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// HTTP server for the redirect interceptor.
pub struct HttpServer {
    router: Router,
    sweeper: Option<MemoryStore>,
}

impl HttpServer {
    /// Create a server that talks to the configured origin over HTTP.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let origin = HyperOrigin::new(
            &config.origin.address,
            Duration::from_secs(config.timeouts.origin_secs),
        )?;
        let store = MemoryStore::new(config.cache.max_entries);

        let mut server = Self::with_origin(&config, Arc::new(origin), Arc::new(store.clone()))?;
        server.sweeper = Some(store);
        Ok(server)
    }

    /// Create a server with an explicit origin and cache store.
    pub fn with_origin(
        config: &ProxyConfig,
        origin: Arc<dyn Origin>,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self, StartupError> {
        let cache = RedirectCache::new(store, &config.cache);
        let orchestrator = Orchestrator::new(config, origin, cache)?;
        let state = AppState {
            orchestrator: Arc::new(orchestrator),
        };

        Ok(Self {
            router: Self::build_router(config, state),
            sweeper: None,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(redirect_handler))
            .route("/", any(redirect_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(store) = self.sweeper {
            tokio::spawn(sweep_expired(store));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn redirect_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    state.orchestrator.handle(request).await
}

async fn sweep_expired(store: MemoryStore) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        store.sweep();
    }
}
