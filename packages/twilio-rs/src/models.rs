use serde::{Deserialize, Serialize};

/// Subset of the Twilio Message resource returned by `Messages.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub sid: String,
    pub status: String,
    pub to: Option<String>,
    pub from: Option<String>,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

impl MessageResponse {
    /// Twilio accepts the message but may still mark it failed synchronously.
    pub fn is_rejected(&self) -> bool {
        matches!(self.status.as_str(), "failed" | "undelivered") || self.error_code.is_some()
    }
}

/// Error body returned by the Twilio REST API on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub code: Option<i64>,
    pub message: String,
    pub status: Option<u16>,
}
