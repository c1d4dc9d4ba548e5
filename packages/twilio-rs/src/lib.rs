// Minimal client for Twilio Programmable Messaging (plain SMS delivery).

use std::collections::HashMap;

pub mod models;
use reqwest::{header, Client};

use crate::models::{ApiErrorResponse, MessageResponse};

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 format
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{sid}/Messages.json",
            sid = self.options.account_sid
        )
    }

    /// Send a text message to `recipient` (E.164).
    pub async fn send_sms(&self, recipient: &str, body: &str) -> Result<MessageResponse, String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("From", &self.options.from_number);
        form_body.insert("Body", body);

        let res = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(headers)
            .form(&form_body)
            .send()
            .await
            .map_err(|e| format!("Request to Twilio failed: {}", e))?;

        let status = res.status();
        if !status.is_success() {
            let error_body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .map(|e| e.message)
                .unwrap_or(error_body);
            return Err(format!("Twilio returned an error ({}): {}", status, message));
        }

        let message = res
            .json::<MessageResponse>()
            .await
            .map_err(|e| format!("Failed to parse Twilio response: {}", e))?;

        if message.is_rejected() {
            return Err(format!(
                "Twilio rejected message {}: {}",
                message.sid,
                message
                    .error_message
                    .clone()
                    .unwrap_or_else(|| message.status.clone())
            ));
        }

        Ok(message)
    }
}
