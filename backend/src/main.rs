//! Temp Chat Backend
//!
//! A disposable chat relay: serves the chat page, appends posted messages and
//! photos to a local log, and announces its public tunnel URL while online.

use anyhow::Context;
use axum::{extract::Request, middleware::Next, response::Response};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempchat_backend::{
    api,
    config::Config,
    state::AppState,
    status::{
        EnvCredentials, GitStatusPublisher, Lifecycle, ServiceState, StatusGuard,
        StatusPublisher, TunnelProcess, UrlSource, UrlWait,
    },
};
use tokio::sync::watch;
use tokio::task::JoinError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    let lifecycle = Lifecycle::new();
    let app_state = AppState::from_config(&config, lifecycle.clone())
        .context("Failed to open message store")?;

    let app = api::router(app_state)
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive());

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_port = listener.local_addr()?.port();

    info!("🚀 Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut guard = StatusGuard::new(build_publisher(&config), lifecycle.clone());

    // Shutdown is triggered by a signal or by the tunnel exiting
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(stop_rx))
            .await
    });

    let mut tunnel = start_tunnel(&config, local_port);
    lifecycle.transition(ServiceState::AwaitingPublicUrl).await;

    let wait = tokio::select! {
        wait = await_public_url(tunnel.as_ref(), config.tunnel.wait()) => Some(wait),
        result = &mut server => {
            log_server_exit(result);
            None
        }
    };

    if let Some(wait) = wait {
        guard.go_online(&wait).await;
        info!("⏳ Relay online. Press Ctrl+C to end the session.");

        let result = match tunnel.as_mut() {
            Some(process) => tokio::select! {
                result = &mut server => result,
                status = process.wait_exit() => {
                    warn!(status = ?status, "Tunnel exited, shutting down");
                    let _ = stop_tx.send(true);
                    (&mut server).await
                }
            },
            None => (&mut server).await,
        };
        log_server_exit(result);
    }

    guard.release().await;
    if let Some(process) = tunnel {
        process.shutdown().await;
    }

    info!("🏁 Session ended");
    Ok(())
}

/// Status publisher from configuration, if a repository and credential are available
fn build_publisher(config: &Config) -> Option<Arc<dyn StatusPublisher>> {
    if config.status.repo.is_none() {
        info!("STATUS_REPO not set, status publication disabled");
        return None;
    }

    let credentials = EnvCredentials::from_config(&config.status);
    match GitStatusPublisher::from_config(&config.status, &credentials) {
        Ok(publisher) => Some(Arc::new(publisher)),
        Err(e) => {
            warn!(error = %e, "Status publication disabled");
            None
        }
    }
}

/// Spawn the configured tunnel; failures leave the relay local-only
fn start_tunnel(config: &Config, local_port: u16) -> Option<TunnelProcess> {
    let program = config.tunnel.command.as_deref()?;
    info!("Starting tunnel via {}", program);

    match TunnelProcess::spawn(
        program,
        local_port,
        &config.tunnel.log_path,
        config.tunnel.poll_interval(),
    ) {
        Ok(process) => Some(process),
        Err(e) => {
            warn!(error = %e, "Tunnel unavailable, continuing without a public URL");
            None
        }
    }
}

async fn await_public_url(tunnel: Option<&TunnelProcess>, wait: Duration) -> UrlWait {
    match tunnel {
        Some(process) => process.await_public_url(wait).await,
        None => UrlWait::TimedOut,
    }
}

fn log_server_exit(result: Result<std::io::Result<()>, JoinError>) {
    match result {
        Ok(Ok(())) => info!("Server shutdown complete"),
        Ok(Err(e)) => error!(error = %e, "Server stopped with an error"),
        Err(e) if e.is_panic() => error!("Server task panicked"),
        Err(e) => error!(error = %e, "Server task was cancelled"),
    }
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM) and internal stop requests
async fn shutdown_signal(mut stop: watch::Receiver<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
        _ = stop.changed() => {
            info!("Stop requested, shutting down gracefully...");
        },
    }
}
