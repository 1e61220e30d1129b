//! Twilio WhatsApp client for supply requests
//!
//! Sends messages through the Twilio Messages API with HTTP basic auth

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{messaging_digits, NotificationChannel};

use crate::config::TwilioConfig;
use crate::services::{Delivery, NotificationError, Notifier, SupplyRequest};

/// Twilio notifier
#[derive(Clone)]
pub struct TwilioNotifier {
    client: Client,
    config: TwilioConfig,
}

/// Successful message creation
#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    message: Option<String>,
    code: Option<i64>,
}

impl TwilioNotifier {
    /// Create a new TwilioNotifier
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

/// Twilio addresses WhatsApp recipients as `whatsapp:+<digits>`
pub fn whatsapp_address(number: &str) -> String {
    format!("whatsapp:+{}", messaging_digits(number))
}

#[async_trait]
impl Notifier for TwilioNotifier {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Twilio
    }

    async fn send(&self, request: &SupplyRequest) -> Result<Delivery, NotificationError> {
        if self.config.account_sid.is_empty() || self.config.auth_token.is_empty() {
            return Err(NotificationError::NotConfigured(
                "Twilio account SID and auth token are required".to_string(),
            ));
        }

        let to = whatsapp_address(request.handle()?);
        let params = [
            ("To", to.as_str()),
            ("From", self.config.from_number.as_str()),
            ("Body", request.message.as_str()),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error: TwilioErrorResponse = response.json().await.unwrap_or(TwilioErrorResponse {
                message: None,
                code: None,
            });
            return Err(NotificationError::Rejected(format!(
                "{} (code {}): {}",
                status,
                error.code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                error.message.unwrap_or_else(|| "Unknown error".to_string())
            )));
        }

        let message: TwilioMessageResponse = response.json().await?;
        Ok(Delivery {
            channel: NotificationChannel::Twilio,
            reference: message.sid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_address() {
        assert_eq!(whatsapp_address("+91 98765-43210"), "whatsapp:+919876543210");
        assert_eq!(whatsapp_address("919876543210"), "whatsapp:+919876543210");
    }

    #[test]
    fn test_messages_url() {
        let notifier = TwilioNotifier::new(TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from_number: "whatsapp:+14155238886".to_string(),
            api_base: "https://api.twilio.com/".to_string(),
        });
        assert_eq!(
            notifier.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }
}
