use std::{error::Error, path::PathBuf};

use clap::Args;
use jsonmockserver::lifecycle::{signals, Coordinator, ServerSettings};
use tracing::info;

/// Serve the routes of a fixture file.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to the JSON file containing routes
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Port on which to run the server
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Reload routes when the fixture file changes, with verbose logging
    #[arg(long)]
    pub devmode: bool,
}

pub async fn run(args: ServeArgs) -> Result<(), Box<dyn Error>> {
    info!(file = %args.file.display(), port = args.port, devmode = args.devmode, "serving fixture");

    let settings = ServerSettings::new(&args.file, format!("{}:{}", args.host, args.port))
        .dev_mode(args.devmode);
    let coordinator = Coordinator::start(settings).await?;

    signals::spawn_signal_listener(coordinator.stop_handle());
    coordinator.run().await?;

    Ok(())
}
