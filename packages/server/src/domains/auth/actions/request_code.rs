//! Request OTP action

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domains::auth::errors::OtpError;
use crate::domains::auth::machines::{generate_code, render_message, resend_wait};
use crate::domains::auth::models::OtpCode;
use crate::domains::auth::phone::{normalize_for_delivery, storage_identity};
use crate::kernel::ServerDeps;

/// Result of issuing a code
#[derive(Debug, Clone)]
pub struct CodeRequested {
    pub identity: String,
    pub destination: String,
    pub expires_at: DateTime<Utc>,
    pub via_local_echo: bool,
}

/// Issue a fresh code for `phone` and hand it to the messaging gateway.
///
/// The record stays stored even when delivery fails; the resend cooldown is
/// based on the record, not on delivery success.
pub async fn request_code(phone: &str, deps: &ServerDeps) -> Result<CodeRequested, OtpError> {
    let identity = storage_identity(phone);
    if identity.is_empty() {
        return Err(OtpError::Validation("Phone number is required".to_string()));
    }

    let policy = &deps.otp_policy;
    let code = generate_code();

    // The upsert only loses to a row inside its cooldown. A concurrent verify
    // can delete that row before the lookup, in which case the upsert is retried.
    let record = loop {
        let now = Utc::now();
        if let Some(record) = OtpCode::issue(
            identity,
            &code,
            now,
            now + policy.code_ttl,
            now - policy.resend_cooldown,
            &deps.db_pool,
        )
        .await?
        {
            break record;
        }

        if let Some(existing) = OtpCode::find(identity, &deps.db_pool).await? {
            if let Some(retry_after_secs) =
                resend_wait(existing.created_at, Utc::now(), policy.resend_cooldown)
            {
                info!(identity, retry_after_secs, "OTP resend throttled");
                return Err(OtpError::RateLimited { retry_after_secs });
            }
        }
        debug!(identity, "Blocking OTP record gone, retrying issue");
    };

    let destination = normalize_for_delivery(identity, &deps.default_country_code);
    let report = deps
        .messaging
        .send(&destination, &render_message(&record.code, policy.code_ttl))
        .await;

    if !report.delivered {
        let reason = report
            .error
            .unwrap_or_else(|| "message gateway reported failure".to_string());
        warn!(identity, %destination, error = %reason, "OTP delivery failed");
        return Err(OtpError::Delivery(reason));
    }

    info!(
        identity,
        %destination,
        local_echo = report.via_local_echo,
        "OTP issued"
    );

    Ok(CodeRequested {
        identity: identity.to_string(),
        destination,
        expires_at: record.expires_at,
        via_local_echo: report.via_local_echo,
    })
}
