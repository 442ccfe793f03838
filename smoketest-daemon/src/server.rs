//! HTTP service -- builds the engine from configuration and serves it.
//!
//! # Routes
//!
//! - `POST /smoke-test/prison-to-probation-update/{test_profile}`: run a profile,
//!   streaming each [`TestStatus`](smoketest_core::TestStatus) as an SSE `data:` event
//! - `GET /smoke-test/profiles`: configured profile names
//! - `GET /health`: aggregated downstream health (503 when unhealthy)
//!
//! # Lifecycle
//!
//! 1. `build()` / `build_from_config()`: validate config, install metrics, create engine
//! 2. `run()`: bind the listener and serve until SIGTERM/SIGINT
//! 3. On shutdown, open run streams are closed (which cancels their runs)
//!    and in-flight requests are drained

use std::convert::Infallible;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use futures::{Stream, StreamExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use smoketest_core::SmokeTestConfig;
use smoketest_engine::{DownstreamClient, HttpDownstreamClient, HttpProbe, SmokeTestEngine};

use crate::health::{DaemonHealth, check_components};
use crate::metrics_server::install_metrics_recorder;

/// Run endpoint path, with the profile name as the last segment.
pub const RUN_ROUTE: &str = "/smoke-test/prison-to-probation-update/{test_profile}";
/// Profile listing path.
pub const PROFILES_ROUTE: &str = "/smoke-test/profiles";
/// Health endpoint path.
pub const HEALTH_ROUTE: &str = "/health";

/// Shared state handed to every request handler.
pub struct AppState<C: DownstreamClient> {
    engine: Arc<SmokeTestEngine<HttpProbe<C>>>,
    shutdown: CancellationToken,
    started: Instant,
}

impl<C: DownstreamClient> AppState<C> {
    /// Wrap an engine. `shutdown` closes every open run stream when cancelled.
    pub fn new(engine: SmokeTestEngine<HttpProbe<C>>, shutdown: CancellationToken) -> Self {
        Self {
            engine: Arc::new(engine),
            shutdown,
            started: Instant::now(),
        }
    }

    /// The engine behind the run endpoint.
    pub fn engine(&self) -> &SmokeTestEngine<HttpProbe<C>> {
        &self.engine
    }
}

// derive(Clone) would require C: Clone
impl<C: DownstreamClient> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            shutdown: self.shutdown.clone(),
            started: self.started,
        }
    }
}

/// Build the service router over `state`.
pub fn router<C: DownstreamClient>(state: AppState<C>) -> Router {
    Router::new()
        .route(RUN_ROUTE, post(run_profile::<C>))
        .route(PROFILES_ROUTE, get(list_profiles::<C>))
        .route(HEALTH_ROUTE, get(health::<C>))
        .with_state(state)
}

async fn run_profile<C: DownstreamClient>(
    State(state): State<AppState<C>>,
    UrlPath(test_profile): UrlPath<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!(profile = %test_profile, "smoke test run requested");

    let statuses = state
        .engine
        .run(&test_profile)
        .take_until(state.shutdown.clone().cancelled_owned())
        .map(|status| {
            let event = Event::default().json_data(&status).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to encode test status");
                Event::default().data(status.to_string())
            });
            Ok(event)
        });

    Sse::new(statuses).keep_alive(KeepAlive::default())
}

async fn list_profiles<C: DownstreamClient>(
    State(state): State<AppState<C>>,
) -> Json<Vec<String>> {
    let names = state
        .engine
        .profiles()
        .names()
        .into_iter()
        .map(str::to_owned)
        .collect();
    Json(names)
}

async fn health<C: DownstreamClient>(
    State(state): State<AppState<C>>,
) -> (StatusCode, Json<DaemonHealth>) {
    let client = state.engine.probe().client();
    let report = DaemonHealth::new(state.started, check_components(client.as_ref()).await);

    let code = if report.status.is_unhealthy() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(report))
}

/// The smoke test service.
pub struct SmokeTestServer {
    config: SmokeTestConfig,
    state: AppState<HttpDownstreamClient>,
}

impl SmokeTestServer {
    /// Load configuration from `config_path` and build the service.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = SmokeTestConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config)
    }

    /// Build the service from an already loaded configuration.
    ///
    /// Installs the Prometheus recorder when `[metrics] enabled = true`.
    pub fn build_from_config(config: SmokeTestConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

        if config.metrics.enabled {
            install_metrics_recorder(&config.metrics)?;
            tracing::info!(port = config.metrics.port, "metrics endpoint enabled");
        }

        let engine = smoketest_engine::http_engine(&config)
            .map_err(|e| anyhow::anyhow!("failed to build engine: {}", e))?;
        let state = AppState::new(engine, CancellationToken::new());

        tracing::info!(
            profiles = state.engine().profiles().len(),
            "smoke test service initialized"
        );

        Ok(Self { config, state })
    }

    /// Loaded configuration.
    pub fn config(&self) -> &SmokeTestConfig {
        &self.config
    }

    /// Router over this service's state.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Bind `server.bind_addr` and serve until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.server.bind_addr)
            .await
            .map_err(|e| {
                anyhow::anyhow!("failed to bind {}: {}", self.config.server.bind_addr, e)
            })?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `signal` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let addr = listener.local_addr()?;
        let shutdown = self.state.shutdown.clone();
        let app = self.router();

        tracing::info!(bind_addr = %addr, "smoke test service listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                tracing::info!("closing open test run streams");
                shutdown.cancel();
            })
            .await
            .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

        tracing::info!("smoke test service shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    match wait_for_shutdown_signal().await {
        Ok(signal) => tracing::info!(signal = signal, "shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "falling back to ctrl-c for shutdown");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        }
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}
