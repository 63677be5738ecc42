use tokio::sync::mpsc::{self, error::TrySendError};

/// A request to re-read the fixture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadRequest {
    Queued,
    /// A reload was already pending; this one folds into it.
    Coalesced,
    Closed,
}

/// Sending half of the single-slot reload channel.
#[derive(Clone, Debug)]
pub struct ReloadHandle {
    tx: mpsc::Sender<ReloadSignal>,
}

pub fn reload_channel() -> (ReloadHandle, mpsc::Receiver<ReloadSignal>) {
    let (tx, rx) = mpsc::channel(1);
    (ReloadHandle { tx }, rx)
}

impl ReloadHandle {
    pub fn request(&self) -> ReloadRequest {
        match self.tx.try_send(ReloadSignal) {
            Ok(()) => ReloadRequest::Queued,
            Err(TrySendError::Full(_)) => ReloadRequest::Coalesced,
            Err(TrySendError::Closed(_)) => ReloadRequest::Closed,
        }
    }
}
