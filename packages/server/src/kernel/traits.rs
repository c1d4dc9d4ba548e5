// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
//
// Naming convention: Base* for trait names (e.g., BaseMessagingGateway)

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

// =============================================================================
// Messaging Gateway Trait (Infrastructure - SMS)
// =============================================================================

/// Outcome of a delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: bool,
    /// Reported delivered without any transport being used
    pub via_local_echo: bool,
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn sent() -> Self {
        Self {
            delivered: true,
            via_local_echo: false,
            error: None,
        }
    }

    pub fn echoed() -> Self {
        Self {
            delivered: true,
            via_local_echo: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            delivered: false,
            via_local_echo: false,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait BaseMessagingGateway: Send + Sync {
    /// Deliver `body` to `destination` (E.164). Failures are reported, not raised.
    async fn send(&self, destination: &str, body: &str) -> DeliveryReport;
}

// =============================================================================
// File Store Trait (Infrastructure - photo bytes)
// =============================================================================

/// Metadata of a stored upload, usable as an attachment reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub filename: String,
    pub mime: String,
    pub size: i64,
    pub url: String,
}

#[async_trait]
pub trait BaseFileStore: Send + Sync {
    /// Reject content `store` would refuse, without writing anything.
    fn validate(&self, mime: &str, bytes: &[u8]) -> Result<()>;

    /// Persist `bytes` and return the metadata clients attach to issues.
    async fn store(&self, original_name: Option<&str>, mime: &str, bytes: &[u8])
        -> Result<StoredFile>;

    /// Remove a file previously returned by `store`.
    async fn discard(&self, filename: &str) -> Result<()>;
}
