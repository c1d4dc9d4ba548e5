use thiserror::Error;

/// Failures of the OTP request/verify flow.
///
/// Verification failures stay distinct so a client can tell whether to retry
/// the same code or ask for a new one.
#[derive(Error, Debug)]
pub enum OtpError {
    #[error("{0}")]
    Validation(String),

    #[error("Please wait {retry_after_secs}s before requesting another code")]
    RateLimited { retry_after_secs: u64 },

    #[error("No code was requested for this number")]
    NotRequested,

    #[error("Code expired, request a new one")]
    Expired,

    #[error("Too many attempts, request a new code")]
    TooManyAttempts,

    #[error("Invalid code")]
    Invalid,

    #[error("Failed to deliver code: {0}")]
    Delivery(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
