use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{Config, OtpPolicy};
use crate::domains::auth::JwtService;
use crate::kernel::{BaseFileStore, BaseMessagingGateway};

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub messaging: Arc<dyn BaseMessagingGateway>,
    pub file_store: Arc<dyn BaseFileStore>,
    /// JWT service for credential minting
    pub jwt_service: Arc<JwtService>,
    pub otp_policy: OtpPolicy,
    pub admin_identifiers: Vec<String>,
    /// Prefix for domestic numbers when building delivery addresses
    pub default_country_code: String,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db_pool: PgPool,
        messaging: Arc<dyn BaseMessagingGateway>,
        file_store: Arc<dyn BaseFileStore>,
        jwt_service: Arc<JwtService>,
        otp_policy: OtpPolicy,
        admin_identifiers: Vec<String>,
        default_country_code: String,
    ) -> Self {
        Self {
            db_pool,
            messaging,
            file_store,
            jwt_service,
            otp_policy,
            admin_identifiers,
            default_country_code,
        }
    }

    /// Wire dependencies from configuration
    pub fn from_config(
        config: &Config,
        db_pool: PgPool,
        messaging: Arc<dyn BaseMessagingGateway>,
        file_store: Arc<dyn BaseFileStore>,
    ) -> Self {
        Self::new(
            db_pool,
            messaging,
            file_store,
            Arc::new(JwtService::new(
                &config.jwt_secret,
                config.jwt_issuer.clone(),
                config.credential_ttl,
            )),
            config.otp.clone(),
            config.admin_identifiers.clone(),
            config.default_country_code.clone(),
        )
    }
}
