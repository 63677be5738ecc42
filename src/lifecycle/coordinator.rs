use std::{
    io,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use thiserror::Error;
use tokio::{
    net::TcpListener,
    sync::{mpsc, watch},
    task::{JoinError, JoinHandle},
};
use tracing::{error, info, warn};

use super::{
    reload::{reload_channel, ReloadHandle, ReloadSignal},
    shutdown::{stop_channel, Shutdown, StopHandle, StopReason},
    state::RouterCell,
};
use crate::filewatcher::{spawn_watcher, FixtureWatcher, WatchError};
use crate::fixture::{load_fixture, resolver::absolute_from_cwd, Fixture, FixtureError};
use crate::http::{
    router::router_from_fixture,
    server::{self, ConnectionContext},
    RegistrationError, Router,
};

pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_EXIT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub fixture_path: PathBuf,
    /// `host:port`; port 0 picks a free port.
    pub address: String,
    pub dev_mode: bool,
    pub drain_timeout: Duration,
    /// Pause between answering `/exit-server` and starting shutdown.
    pub exit_delay: Duration,
}

impl ServerSettings {
    pub fn new(fixture_path: impl Into<PathBuf>, address: impl Into<String>) -> Self {
        ServerSettings {
            fixture_path: fixture_path.into(),
            address: address.into(),
            dev_mode: false,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            exit_delay: DEFAULT_EXIT_DELAY,
        }
    }

    pub fn dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn exit_delay(mut self, delay: Duration) -> Self {
        self.exit_delay = delay;
        self
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot resolve fixture path: {0}")]
    WorkingDir(#[source] io::Error),

    #[error("Error loading fixture: {0}")]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Could not listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Watch(#[from] WatchError),
}

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("server task failed: {0}")]
    Server(#[from] JoinError),

    #[error("server did not stop within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Serving,
    Reloading,
    ShuttingDown,
    Stopped,
}

/// The live listener, the router cell it serves from, and the fixture that
/// router was built from.
struct ActiveServer {
    local_addr: SocketAddr,
    router: RouterCell,
    fixture: Arc<Fixture>,
    shutdown: Shutdown,
    task: JoinHandle<()>,
}

impl ActiveServer {
    async fn bind(
        settings: &ServerSettings,
        fixture: Fixture,
        router: Router,
        stop: StopHandle,
    ) -> Result<Self, StartupError> {
        let listener = TcpListener::bind(&settings.address)
            .await
            .map_err(|source| StartupError::Bind {
                address: settings.address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| StartupError::Bind {
            address: settings.address.clone(),
            source,
        })?;

        let router = RouterCell::new(router);
        let ctx = ConnectionContext {
            router: router.clone(),
            stop,
            exit_delay: settings.exit_delay,
        };
        let shutdown = Shutdown::new();
        let task = tokio::spawn(server::run(
            listener,
            ctx,
            shutdown.subscribe(),
            settings.drain_timeout,
        ));
        info!(address = %local_addr, "Server listening");

        Ok(ActiveServer {
            local_addr,
            router,
            fixture: Arc::new(fixture),
            shutdown,
            task,
        })
    }
}

async fn watcher_finished(watcher: &mut Option<JoinHandle<()>>) {
    match watcher {
        Some(handle) => {
            if let Err(e) = handle.await {
                error!(error = %e, "fixture watcher task failed");
            }
        }
        None => std::future::pending().await,
    }
}

/// Owns the running server and is the only thing that swaps its router.
///
/// `start` loads the fixture and binds; `run` serves until a stop arrives,
/// applying reloads one at a time in between.
pub struct Coordinator {
    settings: ServerSettings,
    phase: watch::Sender<Phase>,
    active: ActiveServer,
    stop: StopHandle,
    stop_rx: mpsc::Receiver<StopReason>,
    reload: ReloadHandle,
    reload_rx: mpsc::Receiver<ReloadSignal>,
    watcher: Option<JoinHandle<()>>,
}

impl Coordinator {
    /// Any failure here is fatal: nothing is served from a partial route set.
    pub async fn start(mut settings: ServerSettings) -> Result<Self, StartupError> {
        info!(fixture = %settings.fixture_path.display(), phase = ?Phase::Starting, "starting server");
        settings.fixture_path =
            absolute_from_cwd(&settings.fixture_path).map_err(StartupError::WorkingDir)?;

        let fixture = load_fixture(&settings.fixture_path)?;
        let router = router_from_fixture(&fixture)?;

        let (stop, stop_rx) = stop_channel();
        let (reload, reload_rx) = reload_channel();

        let watcher = if settings.dev_mode {
            let watcher = FixtureWatcher::new(&settings.fixture_path)?;
            Some(spawn_watcher(watcher, reload.clone()))
        } else {
            None
        };

        let active = match ActiveServer::bind(&settings, fixture, router, stop.clone()).await {
            Ok(active) => active,
            Err(e) => {
                if let Some(w) = watcher {
                    w.abort();
                }
                return Err(e);
            }
        };

        Ok(Coordinator {
            settings,
            phase: watch::Sender::new(Phase::Serving),
            active,
            stop,
            stop_rx,
            reload,
            reload_rx,
            watcher,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.active.local_addr
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Follows phase changes past `run`, which consumes the coordinator.
    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    pub fn fixture(&self) -> Arc<Fixture> {
        Arc::clone(&self.active.fixture)
    }

    pub fn router(&self) -> Arc<Router> {
        self.active.router.load()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn reload_handle(&self) -> ReloadHandle {
        self.reload.clone()
    }

    /// Re-reads the fixture from scratch and swaps in a freshly built router.
    /// On any error the current router stays installed untouched.
    pub fn reload(&mut self) -> Result<usize, ReloadError> {
        self.phase.send_replace(Phase::Reloading);
        let result = self.build_replacement();
        self.phase.send_replace(Phase::Serving);

        let (fixture, router) = result?;
        let routes = router.len();
        self.active.router.store(router);
        self.active.fixture = Arc::new(fixture);
        Ok(routes)
    }

    fn build_replacement(&self) -> Result<(Fixture, Router), ReloadError> {
        let fixture = load_fixture(&self.settings.fixture_path)?;
        let router = router_from_fixture(&fixture)?;
        Ok((fixture, router))
    }

    fn apply_reload(&mut self) {
        // Signals queued before this point are satisfied by this reload.
        while self.reload_rx.try_recv().is_ok() {}

        match self.reload() {
            Ok(routes) => info!(routes, "routes reloaded"),
            Err(e) => warn!(error = %e, "reload rejected, keeping previous routes"),
        }
    }

    /// Serves until a stop signal arrives, then shuts down.
    pub async fn run(mut self) -> Result<(), ShutdownError> {
        self.phase.send_replace(Phase::Serving);
        let reason = loop {
            tokio::select! {
                stop = self.stop_rx.recv() => break stop.unwrap_or(StopReason::ChannelClosed),
                Some(ReloadSignal) = self.reload_rx.recv() => self.apply_reload(),
                _ = watcher_finished(&mut self.watcher) => {
                    warn!("fixture watcher ended, no further reloads");
                    self.watcher = None;
                }
            }
        };
        self.shutdown(reason).await
    }

    async fn shutdown(mut self, reason: StopReason) -> Result<(), ShutdownError> {
        self.phase.send_replace(Phase::ShuttingDown);
        info!(%reason, "Shutting down server gracefully...");

        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        self.active.shutdown.trigger();

        let grace = self.settings.drain_timeout + Duration::from_secs(1);
        match tokio::time::timeout(grace, self.active.task).await {
            Ok(Ok(())) => {
                self.phase.send_replace(Phase::Stopped);
                info!("Server stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(ShutdownError::Server(e)),
            Err(_) => Err(ShutdownError::Timeout(grace)),
        }
    }
}
