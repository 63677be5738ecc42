//! OS signals. Ctrl-C (and SIGTERM on unix) become a `StopReason`.

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::shutdown::{StopHandle, StopReason};

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> StopReason {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => tokio::select! {
            _ = ctrl_c() => StopReason::Interrupt,
            _ = term.recv() => StopReason::Terminate,
        },
        Err(e) => {
            warn!(error = %e, "cannot listen for SIGTERM");
            ctrl_c().await;
            StopReason::Interrupt
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> StopReason {
    ctrl_c().await;
    StopReason::Interrupt
}

pub fn spawn_signal_listener(stop: StopHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reason = wait_for_signal().await;
        info!(%reason, "signal received");
        stop.request(reason);
    })
}
