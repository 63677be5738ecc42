use std::{
    fs, io,
    path::{Path, PathBuf},
};

use notify::{
    event::{ModifyKind, RenameMode},
    recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info};

use crate::lifecycle::reload::{ReloadHandle, ReloadRequest, ReloadSignal};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("fixture path {} does not name a file", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot resolve directory {}: {source}", .dir.display())]
    Directory {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to initialize file watcher: {0}")]
    Notify(#[from] notify::Error),
}

/// Writes, creates, and renames onto the target count. Metadata-only and
/// access events do not.
fn is_write_or_create(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both | RenameMode::Any))
    )
}

/// Watches the directory holding the fixture file and yields a
/// `ReloadSignal` whenever the fixture itself is written or replaced.
///
/// The sequence ends only when the notification channel closes; it cannot
/// be restarted.
pub struct FixtureWatcher {
    target: PathBuf,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    _watcher: RecommendedWatcher,
}

impl FixtureWatcher {
    pub fn new(fixture_path: &Path) -> Result<Self, WatchError> {
        let file_name = fixture_path
            .file_name()
            .ok_or_else(|| WatchError::NotAFile(fixture_path.to_path_buf()))?;
        let parent = match fixture_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        // Notification paths come back canonical; compare like with like.
        let dir = fs::canonicalize(parent).map_err(|source| WatchError::Directory {
            dir: parent.to_path_buf(),
            source,
        })?;
        let target = dir.join(file_name);

        let (tx, events) = mpsc::unbounded_channel();
        let mut watcher = recommended_watcher(move |res: notify::Result<Event>| {
            if tx.send(res).is_err() {
                debug!("File watcher event channel closed");
            }
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!(path = %target.display(), "Watching fixture file for changes...");

        Ok(FixtureWatcher {
            target,
            events,
            _watcher: watcher,
        })
    }

    fn matches(&self, event: &Event) -> bool {
        is_write_or_create(&event.kind) && event.paths.iter().any(|p| p == &self.target)
    }

    /// Waits for the next change to the fixture file. Watch errors are
    /// logged and skipped; `None` means the notification source is gone.
    pub async fn next(&mut self) -> Option<ReloadSignal> {
        while let Some(res) = self.events.recv().await {
            match res {
                Ok(event) if self.matches(&event) => {
                    info!(kind = ?event.kind, "Fixture changed, reloading routes...");
                    return Some(ReloadSignal);
                }
                Ok(event) => debug!(?event, "ignoring file event"),
                Err(err) => error!(error = %err, "Error watching file"),
            }
        }
        None
    }
}

/// Forwards watcher signals into the coordinator's reload channel until
/// either side goes away.
pub fn spawn_watcher(mut watcher: FixtureWatcher, reload: ReloadHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ReloadSignal) = watcher.next().await {
            match reload.request() {
                ReloadRequest::Queued => {}
                ReloadRequest::Coalesced => debug!("reload already pending"),
                ReloadRequest::Closed => break,
            }
        }
        info!("Fixture watcher stopped");
    })
}
