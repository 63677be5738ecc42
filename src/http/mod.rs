pub mod handler;
pub mod request;
pub mod router;
pub mod server;

pub use router::{register, RegistrationError, Router};
