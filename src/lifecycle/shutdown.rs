//! Stop signalling.
//!
//! Two channels are involved: an mpsc of `StopReason`s flowing into the
//! coordinator (from the exit endpoint and OS signals), and a broadcast the
//! coordinator fires to tell the accept loop to stop.

use std::{fmt, time::Duration};

use tokio::sync::{broadcast, mpsc};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    ExitEndpoint,
    Interrupt,
    Terminate,
    /// Every stop sender is gone.
    ChannelClosed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::ExitEndpoint => "exit endpoint",
            StopReason::Interrupt => "interrupt",
            StopReason::Terminate => "terminate",
            StopReason::ChannelClosed => "stop channel closed",
        };
        f.write_str(s)
    }
}

/// Sending half of the coordinator's stop channel.
#[derive(Clone, Debug)]
pub struct StopHandle {
    tx: mpsc::Sender<StopReason>,
}

pub fn stop_channel() -> (StopHandle, mpsc::Receiver<StopReason>) {
    let (tx, rx) = mpsc::channel(4);
    (StopHandle { tx }, rx)
}

impl StopHandle {
    /// Never blocks. Returns false if the coordinator is already gone or a
    /// stop is already queued.
    pub fn request(&self, reason: StopReason) -> bool {
        match self.tx.try_send(reason) {
            Ok(()) => true,
            Err(e) => {
                debug!(%reason, error = %e, "stop request not queued");
                false
            }
        }
    }

    /// Requests a stop after `delay` without blocking the caller.
    pub fn request_after(&self, reason: StopReason, delay: Duration) {
        let handle = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.request(reason);
        });
    }
}

/// Broadcast used by the coordinator to stop the accept loop.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
