use axum_server::Handle;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// How long in-flight requests may run after a shutdown signal.
const GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Starts graceful shutdown of `handle` on the first SIGINT or SIGTERM.
pub(crate) fn watch(handle: Handle<SocketAddr>) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                info!(signal = name, grace_secs = GRACE_PERIOD.as_secs(), "Shutting down");
                handle.graceful_shutdown(Some(GRACE_PERIOD));
            },
            Err(e) => error!(error = %e, "Cannot listen for shutdown signals"),
        }
    });
}

async fn wait_for_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = signal::ctrl_c() => res.map(|()| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.map(|()| "Ctrl+C")
    }
}
