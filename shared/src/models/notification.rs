//! Notification log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MaterialId, SupplierId};

/// Channel a supply request went out on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Twilio,
    WhatsappWeb,
    Log,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Twilio => "twilio",
            NotificationChannel::WhatsappWeb => "whatsapp_web",
            NotificationChannel::Log => "log",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "twilio" => Some(NotificationChannel::Twilio),
            "whatsapp_web" => Some(NotificationChannel::WhatsappWeb),
            "log" => Some(NotificationChannel::Log),
            _ => None,
        }
    }
}

/// Record of one dispatch attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationLogEntry {
    pub id: i64,
    pub supplier_id: Option<SupplierId>,
    pub material_id: Option<MaterialId>,
    pub message: String,
    pub channel: NotificationChannel,
    pub success: bool,
    /// Delivery reference (message SID or link) on success, error text on failure
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dispatch attempt about to be logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotificationLog {
    pub supplier_id: Option<SupplierId>,
    pub material_id: Option<MaterialId>,
    pub message: String,
    pub channel: NotificationChannel,
    pub success: bool,
    pub detail: Option<String>,
}
