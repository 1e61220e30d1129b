//! WhatsApp Web links
//!
//! Builds a `wa.me` click-to-chat link with the message prefilled. Someone
//! still has to open it and press send.

use async_trait::async_trait;
use reqwest::Url;
use shared::{messaging_digits, NotificationChannel};

use crate::services::{Delivery, NotificationError, Notifier, SupplyRequest};

#[derive(Debug, Clone, Default)]
pub struct WhatsAppWebNotifier;

impl WhatsAppWebNotifier {
    pub fn new() -> Self {
        Self
    }
}

/// Click-to-chat link for a number and message
pub fn chat_link(number: &str, message: &str) -> Result<Url, NotificationError> {
    let digits = messaging_digits(number);
    if digits.is_empty() {
        return Err(NotificationError::MissingContact(number.to_string()));
    }
    Url::parse_with_params(&format!("https://wa.me/{}", digits), &[("text", message)])
        .map_err(|e| NotificationError::Rejected(format!("Invalid WhatsApp link: {}", e)))
}

#[async_trait]
impl Notifier for WhatsAppWebNotifier {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::WhatsappWeb
    }

    async fn send(&self, request: &SupplyRequest) -> Result<Delivery, NotificationError> {
        let link = chat_link(request.handle()?, &request.message)?;
        tracing::info!(
            supplier = %request.contact.name,
            material = %request.event.name,
            "WhatsApp link ready: {}",
            link
        );
        Ok(Delivery {
            channel: NotificationChannel::WhatsappWeb,
            reference: link.into(),
        })
    }
}
