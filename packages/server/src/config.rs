use anyhow::{Context, Result};
use chrono::Duration;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// OTP abuse limits. Codes are 6 digits, valid for `code_ttl`, may be re-requested
/// after `resend_cooldown` and tolerate `max_attempts` wrong guesses.
#[derive(Debug, Clone)]
pub struct OtpPolicy {
    pub code_ttl: Duration,
    pub resend_cooldown: Duration,
    pub max_attempts: i32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            code_ttl: Duration::minutes(5),
            resend_cooldown: Duration::seconds(45),
            max_attempts: 5,
        }
    }
}

/// Twilio credentials. All three must be present for real SMS delivery.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Identities granted the admin role on verification
    pub admin_identifiers: Vec<String>,
    /// Log messages instead of delivering them
    pub sms_local_echo: bool,
    pub twilio: Option<TwilioConfig>,
    pub default_country_code: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub otp: OtpPolicy,
    pub credential_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let twilio = match (
            env::var("TWILIO_ACCOUNT_SID").ok(),
            env::var("TWILIO_AUTH_TOKEN").ok(),
            env::var("TWILIO_FROM_NUMBER").ok(),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number))
                if !account_sid.is_empty() && !auth_token.is_empty() =>
            {
                Some(TwilioConfig {
                    account_sid,
                    auth_token,
                    from_number,
                })
            }
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "civic-reports".to_string()),
            admin_identifiers: parse_identifier_list(
                &env::var("ADMIN_IDENTIFIERS").unwrap_or_else(|_| "8888888888".to_string()),
            ),
            sms_local_echo: env::var("SMS_LOCAL_ECHO")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<bool>()
                .unwrap_or(false),
            twilio,
            default_country_code: env::var("DEFAULT_COUNTRY_CODE")
                .unwrap_or_else(|_| "91".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                .parse()
                .context("MAX_UPLOAD_BYTES must be a valid number")?,
            otp: OtpPolicy::default(),
            credential_ttl: Duration::hours(2),
        })
    }

    /// Local echo is forced when no delivery transport is configured.
    pub fn uses_local_echo(&self) -> bool {
        self.sms_local_echo || self.twilio.is_none()
    }
}

/// Split a comma-separated allow-list, dropping blanks.
pub fn parse_identifier_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
