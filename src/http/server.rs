//! HTTP server setup and hot state.
//!
//! # Responsibilities
//! - Build the Axum router with the full middleware stack
//! - Hold the swappable application state (config, pool, clients)
//! - Apply config reloads without dropping in-flight connections
//! - Serve until shutdown is signalled
//!
//! # Data Flow
//! ```text
//! request
//!     → security headers / trace / request-id / timeout (outer layers)
//!     → concurrency + body limits
//!     → rate limiter
//!     → route guard (redirects leave here)
//!     → /logout handler or forward_handler → upstream replica
//! ```
//!
//! # Design Decisions
//! - All mutable state lives behind one `ArcSwap<InnerState>`; a reload
//!   builds a complete new `InnerState` and swaps it in atomically
//! - The router is built once; handlers and state-backed middleware
//!   (rate limiter, pool, clients) read config through the swap, while
//!   layer parameters (timeouts, body/concurrency limits, the header
//!   toggle) are captured at build time and need a restart, as does
//!   the bind address
//! - Reload failures keep the previous state and log the error

use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{body::Body, middleware, routing::any, Router};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GateConfig;
use crate::guard::middleware::guard_middleware;
use crate::http::forward::forward_handler;
use crate::http::logout::logout_handler;
use crate::http::request::RequestIdLayer;
use crate::security::headers::apply_security_headers;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};
use crate::store::StoreClient;
use crate::store::StoreError;
use crate::upstream::UpstreamPool;

/// Everything rebuilt on a config reload, swapped in as one unit.
pub struct InnerState {
    pub config: GateConfig,
    pub upstream: UpstreamPool,
    pub client: Client<HttpConnector, Body>,
    pub store: StoreClient,
    pub limiter: RateLimiterState,
    pub request_count: AtomicUsize,
    pub started_at: Instant,
}

impl InnerState {
    /// Construct the full runtime state from a validated config.
    pub fn from_config(config: GateConfig) -> Result<Self, StoreError> {
        let upstream = UpstreamPool::from_config(&config.upstream);
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let store = StoreClient::new(&config.store)?;
        let limiter = RateLimiterState::from_config(&config.rate_limit);

        Ok(Self {
            config,
            upstream,
            client,
            store,
            limiter,
            request_count: AtomicUsize::new(0),
            started_at: Instant::now(),
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<InnerState>>,
}

/// The public-facing gateway server.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GateConfig) -> Result<Self, StoreError> {
        let inner = InnerState::from_config(config)?;
        let state = AppState {
            inner: Arc::new(ArcSwap::from_pointee(inner)),
        };
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Shared state handle, for the admin API.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layer order matters: the last layer added runs first, so the guard
    /// sits closest to the handlers and tracing wraps everything.
    fn build_router(state: AppState) -> Router {
        let inner = state.inner.load_full();
        let config = &inner.config;

        let mut router = Router::new()
            .route("/logout", any(logout_handler))
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state.clone())
            .layer(middleware::from_fn(guard_middleware))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(GlobalConcurrencyLimitLayer::new(
                config.listener.max_connections,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http());

        if config.security.enable_headers {
            router = apply_security_headers(router);
        }

        router
    }

    /// Run the server until shutdown, applying config reloads as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GateConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "Gateway listening"
        );

        let reload_state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match InnerState::from_config(config) {
                    Ok(inner) => {
                        reload_state.inner.store(Arc::new(inner));
                        tracing::info!("Configuration reloaded");
                    }
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            "Config reload failed, keeping previous state"
                        );
                    }
                }
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}
