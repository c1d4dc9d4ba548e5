//! Verify OTP action

use chrono::Utc;
use tracing::{info, warn};

use crate::domains::auth::errors::OtpError;
use crate::domains::auth::machines::{judge, Verdict};
use crate::domains::auth::models::{OtpCode, Role, User};
use crate::domains::auth::phone::storage_identity;
use crate::kernel::ServerDeps;

/// Result of a successful verification
#[derive(Debug, Clone)]
pub struct CodeVerified {
    pub identity: String,
    pub role: Role,
    pub token: String,
}

/// Check `code` for `phone`, consuming it on success.
///
/// The whole read-compare-increment-or-delete sequence runs in one transaction
/// holding the identity's row lock, so concurrent guesses are counted one by one.
pub async fn verify_code(
    phone: &str,
    code: &str,
    deps: &ServerDeps,
) -> Result<CodeVerified, OtpError> {
    let identity = storage_identity(phone);
    if identity.is_empty() {
        return Err(OtpError::Validation("Phone number is required".to_string()));
    }
    if code.trim().is_empty() {
        return Err(OtpError::Validation("Code is required".to_string()));
    }

    let mut tx = deps.db_pool.begin().await?;
    let record = OtpCode::find_for_update(identity, &mut *tx).await?;

    match judge(record.as_ref(), code, Utc::now(), &deps.otp_policy) {
        Verdict::NotRequested => Err(OtpError::NotRequested),
        Verdict::Expired => Err(OtpError::Expired),
        Verdict::TooManyAttempts => Err(OtpError::TooManyAttempts),
        Verdict::Mismatch => {
            let attempts = OtpCode::record_failed_attempt(identity, &mut *tx).await?;
            tx.commit().await?;
            warn!(identity, attempts, "OTP mismatch");
            Err(OtpError::Invalid)
        }
        Verdict::Match => {
            OtpCode::delete(identity, &mut *tx).await?;
            let role = Role::for_identity(identity, &deps.admin_identifiers);
            User::upsert_with_role(identity, role, &mut *tx).await?;
            // Minted before commit: a failure rolls back and leaves the code usable
            let token = deps.jwt_service.create_token(identity, role)?;
            tx.commit().await?;

            info!(identity, %role, "OTP verified");

            Ok(CodeVerified {
                identity: identity.to_string(),
                role,
                token,
            })
        }
    }
}
