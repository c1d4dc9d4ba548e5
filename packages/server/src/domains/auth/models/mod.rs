pub mod otp_code;
pub mod user;

pub use otp_code::OtpCode;
pub use user::{Role, User};
