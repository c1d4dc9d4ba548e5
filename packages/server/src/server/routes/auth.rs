use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::ApiError;
use crate::domains::auth::actions::{request_code, verify_code};
use crate::domains::auth::Role;
use crate::server::app::AppState;
use crate::server::middleware::{require_user, AuthUser};

#[derive(Debug, Deserialize)]
pub struct RequestOtpBody {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpResponse {
    pub ok: bool,
    pub local_echo: bool,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/auth/request-otp
pub async fn request_otp_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<RequestOtpBody>,
) -> Result<Json<RequestOtpResponse>, ApiError> {
    let requested = request_code(&body.phone, &state.deps).await?;
    Ok(Json(RequestOtpResponse {
        ok: true,
        local_echo: requested.via_local_echo,
        expires_at: requested.expires_at,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpBody {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub token: String,
    pub role: Role,
    pub identity: String,
    pub expires_in: i64,
}

/// POST /api/auth/verify-otp
pub async fn verify_otp_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<VerifyOtpBody>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    let verified = verify_code(&body.phone, &body.code, &state.deps).await?;
    Ok(Json(VerifyOtpResponse {
        token: verified.token,
        role: verified.role,
        identity: verified.identity,
        expires_in: state.deps.jwt_service.ttl().num_seconds(),
    }))
}

/// GET /api/auth/me
pub async fn me_handler(user: Option<Extension<AuthUser>>) -> Result<Json<AuthUser>, ApiError> {
    Ok(Json(require_user(user)?))
}
