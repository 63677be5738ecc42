use std::sync::{Arc, PoisonError, RwLock};

use crate::http::Router;

/// The one piece of state shared between request handling and reload.
///
/// Requests take an `Arc` snapshot per request; the coordinator replaces the
/// whole router in one store, so no request sees a half-updated route set.
#[derive(Clone, Default)]
pub struct RouterCell {
    inner: Arc<RwLock<Arc<Router>>>,
}

impl RouterCell {
    pub fn new(router: Router) -> Self {
        RouterCell {
            inner: Arc::new(RwLock::new(Arc::new(router))),
        }
    }

    pub fn load(&self) -> Arc<Router> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Installs `router`, returning the one it replaced.
    pub(crate) fn store(&self, router: Router) -> Arc<Router> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(router))
    }
}
