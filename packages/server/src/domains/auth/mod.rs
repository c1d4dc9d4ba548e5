//! Auth domain - phone-number OTP authentication
//!
//! Responsibilities:
//! - Issuing one code per identity with a resend cooldown
//! - Verifying codes under an attempt ceiling, one-time use
//! - Lazily creating users with a derived role
//! - Minting JWT credentials

pub mod actions;
pub mod errors;
pub mod jwt;
pub mod machines;
pub mod models;
pub mod phone;

pub use errors::OtpError;
pub use jwt::{Claims, JwtService};
pub use models::Role;
