use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::debug;

use super::errors::ResolutionError;
use super::model::ResponseSpec;

/// Makes `path` absolute against the process working directory.
pub fn absolute_from_cwd(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Resolves a `json://` reference relative to `base` unless it is already absolute.
/// The reference is taken verbatim, surrounding whitespace included.
pub fn resolve_path(reference: &str, base: &Path) -> PathBuf {
    let ref_path = Path::new(reference);
    if ref_path.is_absolute() {
        ref_path.to_path_buf()
    } else {
        base.join(ref_path)
    }
}

/// Reads and parses a JSON document from disk.
pub fn load_json_file(file: &Path) -> Result<Value, ResolutionError> {
    let content = fs::read_to_string(file).map_err(|source| ResolutionError::Read {
        file: file.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ResolutionError::Parse {
        file: file.to_path_buf(),
        source,
    })
}

/// Produces the response body for a route. Called once per request so file
/// references always reflect what is on disk right now.
pub fn resolve(spec: &ResponseSpec) -> Result<Value, ResolutionError> {
    match spec {
        ResponseSpec::Inline(value) => Ok(value.clone()),
        ResponseSpec::Text(text) => Ok(serde_json::from_str(text)
            .unwrap_or_else(|_| Value::String(text.trim().to_string()))),
        ResponseSpec::File { file, .. } => {
            debug!(file = %file.display(), "loading response data");
            load_json_file(file)
        }
    }
}
