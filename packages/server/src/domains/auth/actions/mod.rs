//! Auth domain actions - business logic functions
//!
//! Actions are async functions called directly from HTTP handlers with the
//! shared `ServerDeps`.

mod request_code;
mod verify_code;

pub use request_code::{request_code, CodeRequested};
pub use verify_code::{verify_code, CodeVerified};
