//! Messaging gateways: Twilio SMS and local echo.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use twilio::{TwilioOptions, TwilioService};

use super::{BaseMessagingGateway, DeliveryReport};
use crate::config::Config;

// =============================================================================
// TwilioService Adapter (implements BaseMessagingGateway trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseMessagingGateway
pub struct TwilioGateway(pub Arc<TwilioService>);

impl TwilioGateway {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseMessagingGateway for TwilioGateway {
    async fn send(&self, destination: &str, body: &str) -> DeliveryReport {
        match self.0.send_sms(destination, body).await {
            Ok(message) => {
                info!(%destination, sid = %message.sid, status = %message.status, "SMS accepted");
                DeliveryReport::sent()
            }
            Err(e) => {
                error!(%destination, error = %e, "SMS delivery failed");
                DeliveryReport::failed(e)
            }
        }
    }
}

// =============================================================================
// Local echo
// =============================================================================

/// Reports every message as delivered and writes it to the log instead.
#[derive(Debug, Default, Clone)]
pub struct LocalEchoGateway;

#[async_trait]
impl BaseMessagingGateway for LocalEchoGateway {
    async fn send(&self, destination: &str, body: &str) -> DeliveryReport {
        info!(%destination, %body, "[local echo] SMS not sent");
        DeliveryReport::echoed()
    }
}

/// Pick the gateway for this process: Twilio when configured and local echo
/// is not requested, otherwise local echo.
pub fn create_messaging_gateway(config: &Config) -> Arc<dyn BaseMessagingGateway> {
    match (&config.twilio, config.sms_local_echo) {
        (Some(twilio), false) => {
            info!("SMS delivery via Twilio");
            Arc::new(TwilioGateway::new(Arc::new(TwilioService::new(
                TwilioOptions {
                    account_sid: twilio.account_sid.clone(),
                    auth_token: twilio.auth_token.clone(),
                    from_number: twilio.from_number.clone(),
                },
            ))))
        }
        _ => {
            info!("SMS local echo enabled - codes are logged, not sent");
            Arc::new(LocalEchoGateway)
        }
    }
}
