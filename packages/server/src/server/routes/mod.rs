// HTTP routes
pub mod auth;
pub mod health;
pub mod issues;
pub mod uploads;

pub use auth::*;
pub use health::*;
pub use issues::*;
pub use uploads::*;
