//! Fixture files: the declarative route set the server is driven by.
//!
//! ```text
//! fixture.json → loader::parse (RawFixture)
//!              → loader::check_duplicates
//!              → validate::validate (Fixture of typed Routes)
//! ```
//! Response bodies are produced per request by `resolver::resolve`.

pub mod errors;
pub mod loader;
pub mod model;
pub mod raw;
pub mod resolver;
pub mod validate;

pub use errors::{
    DuplicateRouteError, FixtureError, ParseError, ResolutionError, ValidationError,
};
pub use loader::{check_duplicates, load_fixture, parse};
pub use model::{Fixture, Method, ResponseSpec, Route};
pub use resolver::resolve;
