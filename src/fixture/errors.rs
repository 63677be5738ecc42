use std::{io, path::PathBuf};

use thiserror::Error;

use super::model::Method;

/// The fixture document is not well-formed JSON (or not shaped like one).
#[derive(Debug, Error)]
#[error("error parsing fixture json: {0}")]
pub struct ParseError(#[from] pub serde_json::Error);

/// Semantic problems with a single route. Every variant names the route path.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid route method for route {path}: {method}")]
    InvalidMethod { path: String, method: String },

    #[error("invalid route path {path}: must start with '/'")]
    InvalidPath { path: String },

    #[error("invalid status code for route {path}: {status}")]
    InvalidStatusCode { path: String, status: i64 },

    #[error("invalid data for route {path}: must be a string or a JSON object/array, got {kind}")]
    InvalidData { path: String, kind: &'static str },

    #[error("data file does not exist for route {path}: {}", .file.display())]
    FileNotFound { path: String, file: PathBuf },

    #[error("data file for route {path} is not readable: {}: {source}", .file.display())]
    UnreadableFile {
        path: String,
        file: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in data file for route {path}: {}: {source}", .file.display())]
    InvalidJson {
        path: String,
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("route {method} {path} is reserved by the server")]
    ReservedRoute { method: Method, path: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("duplicate route found: {method} {path}")]
pub struct DuplicateRouteError {
    pub method: String,
    pub path: String,
}

/// Request-time failure turning a `ResponseSpec` into a body.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("failed to read data file {}: {source}", .file.display())]
    Read {
        file: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error parsing data json {}: {source}", .file.display())]
    Parse {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported data type: {0}")]
    UnsupportedType(&'static str),
}

/// Everything that can go wrong loading a fixture file from disk.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot resolve working directory: {0}")]
    WorkingDir(#[source] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Duplicate(#[from] DuplicateRouteError),
}
