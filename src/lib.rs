pub mod filewatcher;
pub mod fixture;
pub mod http;
pub mod lifecycle;

pub use fixture::{Fixture, Method, ResponseSpec, Route};
pub use lifecycle::coordinator::{Coordinator, ServerSettings};
