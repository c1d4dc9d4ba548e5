use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::domains::auth::OtpError;
use crate::domains::issues::IssueError;
use crate::kernel::UploadError;

/// Authorization errors at the HTTP edge
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Invalid or expired token")]
    InvalidToken,
}

/// Every error a handler can return, mapped to a status and a stable code.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Issue(#[from] IssueError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Otp(e) => match e {
                OtpError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                OtpError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
                OtpError::NotRequested => (StatusCode::UNAUTHORIZED, "not_requested"),
                OtpError::Expired => (StatusCode::UNAUTHORIZED, "expired"),
                OtpError::TooManyAttempts => (StatusCode::UNAUTHORIZED, "too_many_attempts"),
                OtpError::Invalid => (StatusCode::UNAUTHORIZED, "invalid_code"),
                OtpError::Delivery(_) => (StatusCode::BAD_GATEWAY, "delivery_error"),
                OtpError::Database(_) | OtpError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            ApiError::Issue(e) => match e {
                IssueError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                IssueError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                IssueError::Database(_) | IssueError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            ApiError::Auth(e) => match e {
                AuthError::AuthenticationRequired | AuthError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, "unauthorized")
                }
                AuthError::AdminRequired => (StatusCode::FORBIDDEN, "forbidden"),
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::Internal(e) => match e.downcast_ref::<UploadError>() {
                Some(UploadError::TooLarge { .. }) => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "validation_error")
                }
                Some(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                None => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
        }
    }

    fn retry_after(&self) -> Option<u64> {
        match self {
            ApiError::Otp(OtpError::RateLimited { retry_after_secs }) => Some(*retry_after_secs),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let retry_after = self.retry_after();

        // Storage details stay in the log
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (
            status,
            Json(ErrorBody {
                error: message,
                code,
                retry_after,
            }),
        )
            .into_response();

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}
