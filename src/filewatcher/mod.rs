pub mod watcher;

pub use watcher::{spawn_watcher, FixtureWatcher, WatchError};
