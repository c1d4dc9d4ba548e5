// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use async_trait::async_trait;
use chrono::Duration;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::{BaseMessagingGateway, DeliveryReport, LocalFileStore, ServerDeps};
use crate::config::OtpPolicy;
use crate::domains::auth::JwtService;

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "test_issuer";
pub const TEST_ADMIN_IDENTITY: &str = "8888888888";

// =============================================================================
// Mock Messaging Gateway
// =============================================================================

/// A message handed to the gateway
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub destination: String,
    pub body: String,
}

/// Records every message; optionally reports a hard failure.
#[derive(Clone, Default)]
pub struct MockMessagingGateway {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockMessagingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail with `error` (still recorded).
    pub fn fail_with(&self, error: &str) {
        *self.failure.lock().unwrap() = Some(error.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// The six-digit code in the last message to `destination`.
    pub fn last_code_for(&self, destination: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.destination == destination)
            .and_then(|m| extract_code(&m.body))
    }
}

fn extract_code(body: &str) -> Option<String> {
    body.split(|c: char| !c.is_ascii_digit())
        .find(|part| part.len() == 6)
        .map(str::to_string)
}

#[async_trait]
impl BaseMessagingGateway for MockMessagingGateway {
    async fn send(&self, destination: &str, body: &str) -> DeliveryReport {
        self.sent.lock().unwrap().push(SentMessage {
            destination: destination.to_string(),
            body: body.to_string(),
        });

        match self.failure.lock().unwrap().clone() {
            Some(error) => DeliveryReport::failed(error),
            None => DeliveryReport::sent(),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Builds `ServerDeps` around a test database with mock delivery.
pub struct TestDependencies {
    pub messaging: MockMessagingGateway,
    pub admin_identifiers: Vec<String>,
    pub otp_policy: OtpPolicy,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            messaging: MockMessagingGateway::new(),
            admin_identifiers: vec![TEST_ADMIN_IDENTITY.to_string()],
            otp_policy: OtpPolicy::default(),
        }
    }

    pub fn with_otp_policy(mut self, policy: OtpPolicy) -> Self {
        self.otp_policy = policy;
        self
    }

    pub fn into_server_deps(self, pool: PgPool) -> ServerDeps {
        ServerDeps::new(
            pool,
            Arc::new(self.messaging),
            Arc::new(LocalFileStore::new(
                std::env::temp_dir().join(format!("civic-test-uploads-{}", Uuid::new_v4())),
                1024 * 1024,
            )),
            Arc::new(JwtService::new(
                TEST_JWT_SECRET,
                TEST_JWT_ISSUER.to_string(),
                Duration::hours(2),
            )),
            self.otp_policy,
            self.admin_identifiers,
            "91".to_string(),
        )
    }
}
