use crate::app::router::build_router;
use crate::app::state::{build_state, AppState};
use crate::config::ServerConfig;
use crate::utils::error::Result;
use std::future::Future;
use tokio::net::TcpListener;

/// 依配置建立狀態、綁定位址並服務到收到 Ctrl-C
pub async fn run(config: &ServerConfig) -> Result<()> {
    let state = build_state(config)?;
    let listener = TcpListener::bind(config.bind_address()).await?;
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

pub async fn serve_with_shutdown<F>(listener: TcpListener, state: AppState, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state)?;
    let addr = listener.local_addr()?;
    tracing::info!("🚀 Serving HGI projects on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("🛑 Shutdown signal received"),
        Err(e) => {
            // 無法監聽訊號時持續服務
            tracing::warn!("⚠️ Unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}
