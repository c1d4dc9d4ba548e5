use anyhow::Result;
use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::Role;

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (phone identity as entered)
    pub role: Role,  // citizen | admin
    pub exp: i64,    // Expiration timestamp
    pub iat: i64,    // Issued at timestamp
    pub iss: String, // Issuer
    pub jti: String, // JWT ID (unique token identifier)
}

/// JWT Service - mints and verifies time-bounded credentials
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl JwtService {
    /// Create new JWT service with secret, issuer and validity window
    pub fn new(secret: &str, issuer: String, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a token asserting `identity` holds `role`
    pub fn create_token(&self, identity: &str, role: Role) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("Token lifetime overflows the expiry timestamp"))?;

        let claims = Claims {
            sub: identity.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a JWT token
    ///
    /// Returns claims if token is valid and not expired
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}
