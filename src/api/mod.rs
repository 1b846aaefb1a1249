//! HTTP 介面：以 axum 路由包裝 Catalog

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::app;
pub use state::AppState;

use crate::utils::error::Result;
use std::net::SocketAddr;

/// 綁定位址並開始服務，直到收到 Ctrl-C
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
