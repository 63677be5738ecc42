use std::time::Duration;

use tokio::{net::TcpListener, sync::broadcast, task::JoinSet};
use tracing::{error, info, warn};

use super::handler::handle_client;
use crate::lifecycle::{shutdown::StopHandle, state::RouterCell};

/// Per-connection view of the server. Cheap to clone.
#[derive(Clone)]
pub struct ConnectionContext {
    pub router: RouterCell,
    pub stop: StopHandle,
    pub exit_delay: Duration,
}

/// Accept loop. Runs until `shutdown` fires, then closes the listener and
/// gives in-flight connections `drain_timeout` to finish before aborting them.
pub async fn run(
    listener: TcpListener,
    ctx: ConnectionContext,
    mut shutdown: broadcast::Receiver<()>,
    drain_timeout: Duration,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let ctx = ctx.clone();
                    connections.spawn(async move {
                        if let Err(e) = handle_client(stream, ctx).await {
                            error!(%peer, error = %e, "Error handling client");
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            },
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    error!(error = %e, "connection task failed");
                }
            }
        }
    }

    drop(listener);
    if !connections.is_empty() {
        info!(in_flight = connections.len(), "draining connections");
    }
    let drained = tokio::time::timeout(drain_timeout, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!(
            remaining = connections.len(),
            "drain period elapsed, aborting connections"
        );
        connections.abort_all();
    }
}
