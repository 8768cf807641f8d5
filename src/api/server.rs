use axum::Router;
use std::future::{Future, IntoFuture};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// HTTP server for the FlashFS API.
pub struct ApiServer {
    router: Router,
    graceful_shutdown: Duration,
}

impl ApiServer {
    /// Creates a server for `router`.
    ///
    /// After the shutdown signal, in-flight requests get `graceful_shutdown` to
    /// finish before their connections are dropped.
    pub fn new(router: Router, graceful_shutdown: Duration) -> Self {
        Self {
            router,
            graceful_shutdown,
        }
    }

    /// Serves requests on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (signalled_tx, signalled_rx) = oneshot::channel::<()>();

        let server = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Draining in-flight requests");
                let _ = signalled_tx.send(());
            })
            .into_future();

        let grace = self.graceful_shutdown;
        let deadline = async move {
            match signalled_rx.await {
                Ok(()) => tokio::time::sleep(grace).await,
                // The server finished on its own
                Err(_) => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = server => result,
            _ = deadline => {
                warn!(
                    grace_secs = grace.as_secs(),
                    "Graceful shutdown timed out, dropping open connections"
                );
                Ok(())
            }
        }
    }
}
