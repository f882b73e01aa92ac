use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use tokio_util::sync::CancellationToken;

/// Bind `addr` and serve `router` until `cancel` fires, draining in-flight requests.
pub async fn serve(router: Router, addr: SocketAddr, cancel: CancellationToken) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("HTTP server bound on {}", addr);

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
