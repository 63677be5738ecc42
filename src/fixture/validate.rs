use std::path::Path;

use tracing::debug;

use super::errors::{ResolutionError, ValidationError};
use super::model::{json_kind, Fixture, Method, ResponseSpec, Route, EXIT_SERVER_PATH};
use super::raw::{RawFixture, RawRoute};
use super::resolver::load_json_file;

const DEFAULT_STATUS: u16 = 200;

fn validate_status(path: &str, status: Option<i64>) -> Result<u16, ValidationError> {
    match status {
        None | Some(0) => Ok(DEFAULT_STATUS),
        Some(code @ 100..=599) => Ok(code as u16),
        Some(code) => Err(ValidationError::InvalidStatusCode {
            path: path.to_string(),
            status: code,
        }),
    }
}

/// Confirms a referenced file is present and holds valid JSON right now.
/// Request-time reads may still fail later if the file changes.
fn check_data_file(path: &str, spec: &ResponseSpec) -> Result<(), ValidationError> {
    let ResponseSpec::File { file, .. } = spec else {
        return Ok(());
    };
    if !file.is_file() {
        return Err(ValidationError::FileNotFound {
            path: path.to_string(),
            file: file.clone(),
        });
    }
    match load_json_file(file) {
        Ok(_) => Ok(()),
        Err(ResolutionError::Read { file, source }) => Err(ValidationError::UnreadableFile {
            path: path.to_string(),
            file,
            source,
        }),
        Err(ResolutionError::Parse { file, source }) => Err(ValidationError::InvalidJson {
            path: path.to_string(),
            file,
            source,
        }),
        Err(ResolutionError::UnsupportedType(kind)) => Err(ValidationError::InvalidData {
            path: path.to_string(),
            kind,
        }),
    }
}

/// Turns one raw route into a typed `Route`, checking method, path, status
/// code and data. `base` anchors relative `json://` references.
pub fn validate_route(raw: RawRoute, base: &Path) -> Result<Route, ValidationError> {
    let RawRoute {
        path,
        method,
        status_code,
        data,
    } = raw;

    if !path.starts_with('/') {
        return Err(ValidationError::InvalidPath { path });
    }

    let method = match method.parse::<Method>() {
        Ok(m) => m,
        Err(()) => return Err(ValidationError::InvalidMethod { path, method }),
    };

    if method == Method::Get && path == EXIT_SERVER_PATH {
        return Err(ValidationError::ReservedRoute { method, path });
    }

    let status = validate_status(&path, status_code)?;

    let kind = json_kind(&data);
    let spec = ResponseSpec::from_value(data, base).map_err(|_| ValidationError::InvalidData {
        path: path.clone(),
        kind,
    })?;
    check_data_file(&path, &spec)?;

    debug!(%method, %path, status, "route validated");
    Ok(Route::new(method, path, status, spec))
}

/// All-or-nothing: the first failing route aborts the whole fixture.
pub fn validate(raw: RawFixture, base: &Path) -> Result<Fixture, ValidationError> {
    let routes = raw
        .routes
        .into_iter()
        .map(|route| validate_route(route, base))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Fixture::new(routes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;

    fn raw(method: &str, path: &str, data: Value) -> RawRoute {
        RawRoute {
            path: path.into(),
            method: method.into(),
            status_code: Some(200),
            data,
        }
    }

    #[test]
    fn accepts_json_string_and_structures() {
        let base = Path::new("/");
        assert!(validate_route(raw("GET", "/test", json!(r#"{"key": "value"}"#)), base).is_ok());
        assert!(validate_route(raw("GET", "/test", json!({"key": "value"})), base).is_ok());
        assert!(validate_route(raw("POST", "/test", json!([1, 2])), base).is_ok());
    }

    #[test]
    fn rejects_scalar_data() {
        let err = validate_route(raw("GET", "/test", json!(12345)), Path::new("/")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidData { kind: "number", .. }));
        assert!(err.to_string().contains("/test"));
    }

    #[test]
    fn rejects_unknown_methods() {
        let err = validate_route(raw("INVALID", "/test-invalid", json!({})), Path::new("/")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMethod { .. }));
        assert!(err.to_string().contains("INVALID"));
    }

    #[test]
    fn status_defaults_and_bounds() {
        let base = Path::new("/");
        let mut route = raw("GET", "/s", json!({}));
        route.status_code = None;
        assert_eq!(validate_route(route.clone(), base).unwrap().status_code(), 200);

        route.status_code = Some(0);
        assert_eq!(validate_route(route.clone(), base).unwrap().status_code(), 200);

        route.status_code = Some(201);
        assert_eq!(validate_route(route.clone(), base).unwrap().status_code(), 201);

        route.status_code = Some(1000);
        assert!(matches!(
            validate_route(route, base),
            Err(ValidationError::InvalidStatusCode { status: 1000, .. })
        ));
    }

    #[test]
    fn path_must_be_rooted() {
        assert!(matches!(
            validate_route(raw("GET", "users", json!({})), Path::new("/")),
            Err(ValidationError::InvalidPath { .. })
        ));
    }

    #[test]
    fn exit_route_is_reserved() {
        assert!(matches!(
            validate_route(raw("GET", "/exit-server", json!({})), Path::new("/")),
            Err(ValidationError::ReservedRoute { .. })
        ));
        assert!(validate_route(raw("POST", "/exit-server", json!({})), Path::new("/")).is_ok());
    }

    #[test]
    fn checks_referenced_files_eagerly() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("valid.json"), r#"{"key": "value"}"#).unwrap();
        fs::write(dir.path().join("invalid.json"), "invalid json content").unwrap();

        let ok = validate_route(raw("GET", "/test", json!("json://valid.json")), dir.path()).unwrap();
        assert_eq!(
            ok.data(),
            &ResponseSpec::File {
                reference: "json://valid.json".into(),
                file: dir.path().join("valid.json"),
            }
        );

        assert!(matches!(
            validate_route(raw("GET", "/test", json!("json://invalid.json")), dir.path()),
            Err(ValidationError::InvalidJson { .. })
        ));
        let err = validate_route(raw("GET", "/test", json!("json://nonexistent.json")), dir.path())
            .unwrap_err();
        assert!(matches!(err, ValidationError::FileNotFound { .. }));
        assert!(err.to_string().contains("nonexistent.json"));
    }

    #[test]
    fn padded_reference_is_not_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("valid.json"), r#"{"key": "value"}"#).unwrap();

        let err = validate_route(raw("GET", "/test", json!("json:// valid.json ")), dir.path())
            .unwrap_err();
        assert!(matches!(err, ValidationError::FileNotFound { .. }));
    }

    #[test]
    fn first_bad_route_fails_the_fixture() {
        let fixture = RawFixture {
            routes: vec![
                raw("GET", "/ok", json!({})),
                raw("DELETE", "/bad", json!({})),
                raw("GET", "/never-checked", json!(1)),
            ],
        };
        let err = validate(fixture, Path::new("/")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMethod { ref path, .. } if path == "/bad"));
    }
}
