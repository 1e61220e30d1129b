//! Low-stock notifications to suppliers
//!
//! Supports:
//! - Pluggable delivery channels behind the `Notifier` trait
//! - Fallback from one channel to another
//! - A notification log of every attempt
//!
//! Delivery runs after the sale has committed. Nothing here can fail a sale.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    LowStockEvent, MaterialId, NewNotificationLog, NotificationChannel, NotificationLogEntry,
    SupplierContact, SupplierId,
};
use thiserror::Error;
use tokio::task::JoinHandle;

use super::SupplierService;
use crate::config::NotificationConfig;
use crate::error::AppResult;
use crate::store::{finish, Store};

/// Delivery failures. These are logged and never reach `AppError`.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rejected by provider: {0}")]
    Rejected(String),

    #[error("Supplier {0} has no WhatsApp or phone number")]
    MissingContact(String),
}

/// A reorder message ready to send
#[derive(Debug, Clone, Serialize)]
pub struct SupplyRequest {
    pub event: LowStockEvent,
    pub contact: SupplierContact,
    pub suggested_quantity: Decimal,
    pub message: String,
}

impl SupplyRequest {
    pub fn new(event: LowStockEvent, contact: SupplierContact, business_name: &str) -> Self {
        let suggested_quantity = event.suggested_reorder_quantity();
        let message = supply_request_message(&contact.name, &event, suggested_quantity, business_name);
        Self {
            event,
            contact,
            suggested_quantity,
            message,
        }
    }

    /// Number to message, or `MissingContact`
    pub fn handle(&self) -> Result<&str, NotificationError> {
        self.contact
            .messaging_handle()
            .ok_or_else(|| NotificationError::MissingContact(self.contact.name.clone()))
    }
}

/// Compose the message sent to a supplier
pub fn supply_request_message(
    supplier_name: &str,
    event: &LowStockEvent,
    suggested_quantity: Decimal,
    business_name: &str,
) -> String {
    format!(
        "Hello {supplier},\n\n\
         URGENT SUPPLY REQUEST\n\n\
         We require immediate supply for:\n\
         {material}: {suggested} {unit}\n\
         Current stock: {quantity} {unit}\n\
         Below threshold level ({threshold} {unit})\n\n\
         Please arrange delivery ASAP.\n\n\
         Thanks,\n\
         {business}",
        supplier = supplier_name,
        material = event.name,
        suggested = suggested_quantity.normalize(),
        unit = event.unit,
        quantity = event.quantity.normalize(),
        threshold = event.threshold.normalize(),
        business = business_name,
    )
}

/// Where and how a request was delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub channel: NotificationChannel,
    /// Provider message id, link, or other handle for the delivery
    pub reference: String,
}

/// A channel that can deliver supply requests
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> NotificationChannel;

    async fn send(&self, request: &SupplyRequest) -> Result<Delivery, NotificationError>;
}

/// Writes the request to the log only
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Log
    }

    async fn send(&self, request: &SupplyRequest) -> Result<Delivery, NotificationError> {
        tracing::info!(
            supplier = %request.contact.name,
            material = %request.event.name,
            suggested = %request.suggested_quantity,
            "Supply request:\n{}",
            request.message
        );
        Ok(Delivery {
            channel: NotificationChannel::Log,
            reference: format!("log:{}", request.event.material_id),
        })
    }
}

/// Tries `primary`, then `secondary` if the primary fails
#[derive(Clone)]
pub struct FallbackNotifier {
    primary: Arc<dyn Notifier>,
    secondary: Arc<dyn Notifier>,
}

impl FallbackNotifier {
    pub fn new(primary: Arc<dyn Notifier>, secondary: Arc<dyn Notifier>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl Notifier for FallbackNotifier {
    fn channel(&self) -> NotificationChannel {
        self.primary.channel()
    }

    async fn send(&self, request: &SupplyRequest) -> Result<Delivery, NotificationError> {
        match self.primary.send(request).await {
            Ok(delivery) => Ok(delivery),
            Err(e) => {
                tracing::warn!(
                    "{} delivery failed, falling back to {}: {}",
                    self.primary.channel().as_str(),
                    self.secondary.channel().as_str(),
                    e
                );
                self.secondary.send(request).await
            }
        }
    }
}

/// Result of notifying one low-stock event
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub material_id: MaterialId,
    pub supplier_id: Option<SupplierId>,
    pub delivery: Option<Delivery>,
    pub error: Option<String>,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        self.delivery.is_some()
    }
}

/// Notification service for supply requests
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
    suppliers: SupplierService,
    notifier: Arc<dyn Notifier>,
    config: NotificationConfig,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            suppliers: SupplierService::new(store.clone()),
            store,
            notifier,
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send a supply request for each event and log every attempt.
    /// Failures are logged and reported, never returned.
    pub async fn notify_low_stock(&self, events: &[LowStockEvent]) -> Vec<DispatchReport> {
        let mut reports = Vec::with_capacity(events.len());
        for event in events {
            reports.push(self.notify_one(event).await);
        }
        reports
    }

    /// Run `notify_low_stock` on a background task. Returns `None` when
    /// notifications are disabled or there is nothing to send.
    pub fn dispatch(&self, events: Vec<LowStockEvent>) -> Option<JoinHandle<Vec<DispatchReport>>> {
        if !self.config.enabled || events.is_empty() {
            return None;
        }
        let service = self.clone();
        Some(tokio::spawn(async move {
            service.notify_low_stock(&events).await
        }))
    }

    /// Most recent notification attempts, newest first
    pub async fn log(&self, limit: i64) -> AppResult<Vec<NotificationLogEntry>> {
        self.store.notification_log(limit).await
    }

    async fn notify_one(&self, event: &LowStockEvent) -> DispatchReport {
        let contact = match self.suppliers.resolve_contact(event.supplier_id).await {
            Ok(Some(contact)) => contact,
            Ok(None) => {
                tracing::warn!(
                    material = %event.name,
                    "No supplier on record for low-stock material"
                );
                return self
                    .record(event, None, String::new(), Err("No supplier on record".to_string()))
                    .await;
            }
            Err(e) => {
                tracing::warn!(material = %event.name, "Failed to resolve supplier: {}", e);
                return DispatchReport {
                    material_id: event.material_id,
                    supplier_id: event.supplier_id,
                    delivery: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let request = SupplyRequest::new(event.clone(), contact, &self.config.business_name);
        let outcome = match self.notifier.send(&request).await {
            Ok(delivery) => {
                tracing::info!(
                    supplier = %request.contact.name,
                    material = %event.name,
                    channel = delivery.channel.as_str(),
                    "Supply request sent"
                );
                Ok(delivery)
            }
            Err(e) => {
                tracing::warn!(
                    supplier = %request.contact.name,
                    material = %event.name,
                    "Supply request failed: {}",
                    e
                );
                Err(e.to_string())
            }
        };

        self.record(
            event,
            Some(request.contact.supplier_id),
            request.message,
            outcome,
        )
        .await
    }

    async fn record(
        &self,
        event: &LowStockEvent,
        supplier_id: Option<SupplierId>,
        message: String,
        outcome: Result<Delivery, String>,
    ) -> DispatchReport {
        let entry = NewNotificationLog {
            supplier_id,
            material_id: Some(event.material_id),
            message,
            channel: outcome
                .as_ref()
                .map(|d| d.channel)
                .unwrap_or_else(|_| self.notifier.channel()),
            success: outcome.is_ok(),
            detail: Some(match &outcome {
                Ok(delivery) => delivery.reference.clone(),
                Err(e) => e.clone(),
            }),
        };

        if let Err(e) = self.write_log(&entry).await {
            tracing::warn!(material = %event.name, "Failed to write notification log: {}", e);
        }

        let (delivery, error) = match outcome {
            Ok(delivery) => (Some(delivery), None),
            Err(e) => (None, Some(e)),
        };
        DispatchReport {
            material_id: event.material_id,
            supplier_id,
            delivery,
            error,
        }
    }

    async fn write_log(&self, entry: &NewNotificationLog) -> AppResult<NotificationLogEntry> {
        let mut tx = self.store.begin().await?;
        let result = tx.insert_notification_log(entry).await;
        finish(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn event() -> LowStockEvent {
        LowStockEvent {
            material_id: 1,
            name: "Flour".to_string(),
            quantity: Decimal::from_str("1.50").unwrap(),
            unit: "kg".to_string(),
            threshold: Decimal::from(2),
            supplier_id: Some(3),
        }
    }

    fn contact() -> SupplierContact {
        SupplierContact {
            supplier_id: 3,
            name: "Ravi Traders".to_string(),
            whatsapp: Some("+91 98765 43210".to_string()),
            phone: None,
        }
    }

    #[test]
    fn test_supply_request_message() {
        let request = SupplyRequest::new(event(), contact(), "Hostel Canteen");
        assert_eq!(request.suggested_quantity, Decimal::from_str("2.50").unwrap());
        assert_eq!(
            request.message,
            "Hello Ravi Traders,\n\n\
             URGENT SUPPLY REQUEST\n\n\
             We require immediate supply for:\n\
             Flour: 2.5 kg\n\
             Current stock: 1.5 kg\n\
             Below threshold level (2 kg)\n\n\
             Please arrange delivery ASAP.\n\n\
             Thanks,\n\
             Hostel Canteen"
        );
    }

    #[test]
    fn test_missing_handle() {
        let mut contact = contact();
        contact.whatsapp = None;
        let request = SupplyRequest::new(event(), contact, "Canteen");
        assert!(matches!(
            request.handle(),
            Err(NotificationError::MissingContact(_))
        ));
    }

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        fn channel(&self) -> NotificationChannel {
            NotificationChannel::Twilio
        }

        async fn send(&self, _request: &SupplyRequest) -> Result<Delivery, NotificationError> {
            Err(NotificationError::Rejected("unverified number".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fallback_uses_secondary_on_failure() {
        let notifier = FallbackNotifier::new(Arc::new(Failing), Arc::new(LogNotifier));
        let request = SupplyRequest::new(event(), contact(), "Canteen");

        let delivery = notifier.send(&request).await.unwrap();
        assert_eq!(delivery.channel, NotificationChannel::Log);
        assert_eq!(notifier.channel(), NotificationChannel::Twilio);
    }
}
