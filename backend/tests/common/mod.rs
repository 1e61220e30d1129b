//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use canteen_backend::config::Config;
use canteen_backend::services::{Delivery, NotificationError, Notifier, SupplyRequest};
use canteen_backend::store::MemoryStore;
use canteen_backend::Canteen;
use rust_decimal::Decimal;
use shared::{
    Category, DeductionPolicy, Material, NewCategory, NewMaterial, NotificationChannel,
};
use tokio::sync::mpsc;

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Canteen over a fresh in-memory store with notifications switched off
pub fn canteen() -> Canteen {
    let mut config = Config::default();
    config.notifications.enabled = false;
    Canteen::with_store(Arc::new(MemoryStore::new()), config)
}

/// Canteen that rejects oversold sales
pub fn strict_canteen() -> Canteen {
    let mut config = Config::default();
    config.notifications.enabled = false;
    config.inventory.deduction_policy = DeductionPolicy::Reject;
    Canteen::with_store(Arc::new(MemoryStore::new()), config)
}

/// Canteen whose supply requests go to `notifier`
pub fn canteen_with_notifier(notifier: Arc<dyn Notifier>) -> Canteen {
    Canteen::with_notifier(Arc::new(MemoryStore::new()), Config::default(), notifier)
}

pub fn new_material(name: &str, quantity: &str, threshold: &str, cost: &str) -> NewMaterial {
    NewMaterial {
        name: name.to_string(),
        quantity: dec(quantity),
        unit: "kg".to_string(),
        threshold: dec(threshold),
        cost_per_unit: dec(cost),
        supplier_id: None,
    }
}

pub async fn add_material(
    canteen: &Canteen,
    name: &str,
    quantity: &str,
    threshold: &str,
    cost: &str,
) -> Material {
    canteen
        .materials
        .add(new_material(name, quantity, threshold, cost))
        .await
        .unwrap()
}

/// A composed category with one recipe entry per `(material, amount)`
pub async fn add_recipe(
    canteen: &Canteen,
    name: &str,
    price: &str,
    entries: &[(&Material, &str)],
) -> Category {
    let category = canteen
        .categories
        .create_category(NewCategory::composed(name, dec(price)))
        .await
        .unwrap();
    for (material, amount) in entries {
        canteen
            .categories
            .set_entry(category.id, material.id, dec(amount))
            .await
            .unwrap();
    }
    category
}

/// Notifier that forwards every request to a channel
pub struct RecordingNotifier {
    sender: mpsc::UnboundedSender<SupplyRequest>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<SupplyRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender, fail: false }), receiver)
    }

    /// Records the request, then reports a delivery failure
    pub fn failing() -> (Arc<Self>, mpsc::UnboundedReceiver<SupplyRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender, fail: true }), receiver)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Log
    }

    async fn send(&self, request: &SupplyRequest) -> Result<Delivery, NotificationError> {
        let _ = self.sender.send(request.clone());
        if self.fail {
            return Err(NotificationError::Rejected("provider unavailable".to_string()));
        }
        Ok(Delivery {
            channel: NotificationChannel::Log,
            reference: format!("recorded:{}", request.event.material_id),
        })
    }
}
