use std::collections::HashMap;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::fixture::{resolve, Fixture, Method, ResponseSpec, Route};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("route {method} {path} is already bound")]
    DuplicateBinding { method: Method, path: String },
}

/// What a bound route does when hit.
#[derive(Debug, Clone)]
pub struct RouteHandler {
    status: u16,
    data: ResponseSpec,
}

impl RouteHandler {
    /// Resolves the body. A resolver failure becomes a 500 with an
    /// `{"error": ...}` envelope instead of failing the request.
    pub fn respond(&self) -> (u16, Value) {
        match resolve(&self.data) {
            Ok(body) => (self.status, body),
            Err(err) => {
                error!(error = %err, "failed to resolve response data");
                (500, json!({ "error": err.to_string() }))
            }
        }
    }
}

/// Exact (method, path) lookup table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: HashMap<(Method, String), RouteHandler>,
}

impl Router {
    pub fn new() -> Self {
        Router::default()
    }

    pub fn bind(&mut self, route: &Route) -> Result<(), RegistrationError> {
        let key = (route.method(), route.path().to_string());
        if self.routes.contains_key(&key) {
            return Err(RegistrationError::DuplicateBinding {
                method: route.method(),
                path: route.path().to_string(),
            });
        }
        debug!(method = %route.method(), path = route.path(), "binding route");
        self.routes.insert(
            key,
            RouteHandler {
                status: route.status_code(),
                data: route.data().clone(),
            },
        );
        Ok(())
    }

    pub fn find(&self, method: Method, path: &str) -> Option<&RouteHandler> {
        self.routes.get(&(method, path.to_string()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Binds every route in fixture order.
pub fn register(router: &mut Router, routes: &[Route]) -> Result<(), RegistrationError> {
    for route in routes {
        router.bind(route)?;
    }
    Ok(())
}

/// Builds a fresh router for a validated fixture.
pub fn router_from_fixture(fixture: &Fixture) -> Result<Router, RegistrationError> {
    let mut router = Router::new();
    register(&mut router, fixture.routes())?;
    Ok(router)
}
