//! Gateway HTTP server
//!
//! Binds the proxy router, adds request tracing, and runs until the
//! shutdown token is cancelled.

use std::sync::Arc;

use headdeck_api::CredentialStore;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::proxy::Gateway;

/// Start the gateway and run until `shutdown` is cancelled.
pub async fn serve(
    config: GatewayConfig,
    credentials: Option<Arc<dyn CredentialStore>>,
    shutdown: CancellationToken,
) -> Result<(), GatewayError> {
    let mut gateway = Gateway::new(&config)?;
    if let Some(store) = credentials {
        gateway = gateway.with_credentials(store);
    }
    let router = gateway.router().layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| GatewayError::Bind {
            addr: config.listen,
            source,
        })?;
    let local = listener.local_addr().map_err(GatewayError::Serve)?;

    info!(listen = %local, upstream = %config.upstream, "gateway listening");
    if !config.is_localhost() {
        warn!(
            "gateway bound to {} - anyone who can reach it can use the upstream API",
            local
        );
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(GatewayError::Serve)?;

    info!("gateway shut down gracefully");
    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM.
pub async fn shutdown_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
        () = token.cancelled() => return,
    }
    token.cancel();
}
