//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod file_store;
pub mod messaging;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use file_store::{LocalFileStore, UploadError};
pub use messaging::{create_messaging_gateway, LocalEchoGateway, TwilioGateway};
pub use test_dependencies::{MockMessagingGateway, TestDependencies};
pub use traits::*;
