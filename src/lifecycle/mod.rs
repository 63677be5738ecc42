//! Server lifecycle.
//!
//! ```text
//! Starting → Serving → (Reloading → Serving)* → ShuttingDown → Stopped
//! ```
//! The coordinator owns the active router cell. Reload and stop requests
//! reach it over channels; the exit endpoint and OS signals only ever send.

pub mod coordinator;
pub mod reload;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use coordinator::{Coordinator, Phase, ServerSettings, ShutdownError, StartupError};
pub use shutdown::{StopHandle, StopReason};
