mod commands;

use clap::Parser;
use commands::{check, serve};
use std::error::Error;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "jmserver")]
#[command(author, version, about = "JSON fixture-driven mock HTTP server")]
struct Cli {
    #[command(flatten)]
    serve: serve::ServeArgs,

    /// Validate the fixture file and exit without serving
    #[arg(long)]
    check: bool,
}

impl Cli {
    async fn run(self) -> Result<(), Box<dyn Error>> {
        if self.check {
            check::run(&self.serve.file).await
        } else {
            serve::run(self.serve).await
        }
    }
}

/// Dev mode shows per-request logging; production keeps to lifecycle events.
fn init_tracing(dev_mode: bool) {
    // JMSERVER_LOG overrides, e.g. JMSERVER_LOG=debug
    let filter = match EnvFilter::try_from_env("JMSERVER_LOG") {
        Ok(f) => f,
        Err(_) if dev_mode => EnvFilter::new("info,jsonmockserver=debug,jmserver=debug"),
        Err(_) => EnvFilter::new("info"),
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too and are not failures.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.serve.devmode);

    if let Err(e) = cli.run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
