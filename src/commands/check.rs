use std::{error::Error, path::Path};

use jsonmockserver::fixture::{load_fixture, resolver::absolute_from_cwd, ResponseSpec};
use tracing::info;

/// Loads and validates a fixture without binding a port.
pub async fn run(file: &Path) -> Result<(), Box<dyn Error>> {
    let path = absolute_from_cwd(file)?;
    info!(path = %path.display(), "checking fixture");

    let fixture = load_fixture(&path)?;
    for route in fixture.routes() {
        let data = match route.data() {
            ResponseSpec::Inline(_) => "inline",
            ResponseSpec::Text(_) => "text",
            ResponseSpec::File { reference, .. } => reference.as_str(),
        };
        info!(method = %route.method(), path = route.path(), status = route.status_code(), data, "route");
    }

    info!(routes = fixture.len(), "fixture is valid");
    Ok(())
}
