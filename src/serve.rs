use crate::mcp::HttpBridge;
use crate::supervisor::Supervisor;
use anyhow::{anyhow, bail, Result};
use rmcp::ServiceExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Serve the bridge on the process stdin/stdout until EOF, a signal, or a fault
pub async fn run_stdio(bridge: HttpBridge, supervisor: Supervisor) -> Result<()> {
    tokio::spawn(shutdown_signal(supervisor.shutdown_token()));
    run(bridge, supervisor, rmcp::transport::stdio()).await
}

/// Serve the bridge on an arbitrary byte stream pair.
///
/// Returns an error when the handshake fails or when the supervisor recorded
/// a fault; a clean close or a shutdown request returns `Ok`.
pub async fn run<R, W>(bridge: HttpBridge, supervisor: Supervisor, transport: (R, W)) -> Result<()>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let service = bridge
        .serve_with_ct(transport, supervisor.shutdown_token())
        .await
        .map_err(|e| anyhow!("Failed to start MCP server: {:?}", e))?;

    debug!("MCP bridge started, waiting for requests");

    let quit_reason = service.waiting().await?;
    debug!("MCP bridge stopped: {:?}", quit_reason);

    if let Some(fault) = supervisor.fault() {
        bail!("Unrecoverable fault: {}", fault);
    }

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down...");
        },
        _ = shutdown.cancelled() => return,
    }

    shutdown.cancel();
}
