use std::{collections::HashSet, fs, path::Path};

use tracing::{debug, info};

use super::errors::{DuplicateRouteError, FixtureError, ParseError};
use super::model::Fixture;
use super::raw::{RawFixture, RawRoute};
use super::resolver::absolute_from_cwd;
use super::validate::validate;

pub fn parse(bytes: &[u8]) -> Result<RawFixture, ParseError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Rejects a fixture declaring the same `method:path` twice. Needs no file
/// access, so a reload can bail out here before touching referenced data.
pub fn check_duplicates(routes: &[RawRoute]) -> Result<(), DuplicateRouteError> {
    let mut seen = HashSet::with_capacity(routes.len());
    for route in routes {
        let key = format!("{}:{}", route.method, route.path);
        if !seen.insert(key) {
            return Err(DuplicateRouteError {
                method: route.method.clone(),
                path: route.path.clone(),
            });
        }
    }
    Ok(())
}

/// Parses, de-duplicates and validates fixture bytes. `base` anchors
/// relative `json://` references.
pub fn load_fixture_bytes(bytes: &[u8], base: &Path) -> Result<Fixture, FixtureError> {
    let raw = parse(bytes)?;
    check_duplicates(&raw.routes)?;
    Ok(validate(raw, base)?)
}

/// Loads the fixture file from scratch. Used both at startup and on reload.
pub fn load_fixture(path: &Path) -> Result<Fixture, FixtureError> {
    let bytes = fs::read(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "fixture read");

    let cwd = absolute_from_cwd(Path::new(".")).map_err(FixtureError::WorkingDir)?;
    let fixture = load_fixture_bytes(&bytes, &cwd)?;
    info!(path = %path.display(), routes = fixture.len(), "fixture loaded");
    Ok(fixture)
}
