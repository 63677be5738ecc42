use std::{fmt, path::PathBuf, str::FromStr};

use serde_json::Value;

use super::errors::ResolutionError;
use super::resolver::resolve_path;

pub const FILE_REF_PREFIX: &str = "json://";
/// `GET` on this path stops the server; fixtures may not declare it.
pub const EXIT_SERVER_PATH: &str = "/exit-server";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub const SUPPORTED: [Method; 2] = [Method::Get, Method::Post];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matching is case-sensitive: fixture files must spell methods in upper case.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::SUPPORTED
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or(())
    }
}

/// How a route produces its body. Resolved on every request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSpec {
    /// A JSON object or array written directly in the fixture.
    Inline(Value),
    /// A string: JSON text if it parses, otherwise a literal.
    Text(String),
    /// `json://<path>`; `file` is already absolute.
    File { reference: String, file: PathBuf },
}

impl ResponseSpec {
    /// Classifies a fixture `data` value. Relative file references are joined onto `base`.
    pub fn from_value(data: Value, base: &std::path::Path) -> Result<Self, ResolutionError> {
        match data {
            Value::Object(_) | Value::Array(_) => Ok(ResponseSpec::Inline(data)),
            Value::String(s) => match s.strip_prefix(FILE_REF_PREFIX) {
                Some(reference) => Ok(ResponseSpec::File {
                    file: resolve_path(reference, base),
                    reference: s.clone(),
                }),
                None => Ok(ResponseSpec::Text(s)),
            },
            other => Err(ResolutionError::UnsupportedType(json_kind(&other))),
        }
    }
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    path: String,
    method: Method,
    status_code: u16,
    data: ResponseSpec,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>, status_code: u16, data: ResponseSpec) -> Self {
        Route {
            path: path.into(),
            method,
            status_code,
            data,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn data(&self) -> &ResponseSpec {
        &self.data
    }
}

/// A validated route set. Never mutated; a reload builds a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixture {
    routes: Vec<Route>,
}

impl Fixture {
    pub fn new(routes: Vec<Route>) -> Self {
        Fixture { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
