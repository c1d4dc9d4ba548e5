// Civic Reports - API Core
//
// Citizens sign in with a phone one-time code, then file and track civic
// issue reports with photo evidence. Domain logic lives in domains/*,
// infrastructure behind traits in kernel/, HTTP wiring in server/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
