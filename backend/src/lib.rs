//! Canteen inventory and point-of-sale engine
//!
//! Headless core for a canteen till: a material ledger, category recipes,
//! sale processing with profit snapshots, production forecasts and
//! low-stock supply requests. A presentation layer drives it through the
//! `Canteen` facade.

pub mod config;
pub mod error;
pub mod external;
pub mod services;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

pub use crate::config::Config;
pub use error::{AppError, AppResult};

use crate::config::NotificationConfig;
use external::{TwilioNotifier, WhatsAppWebNotifier};
use services::{
    CategoryService, FallbackNotifier, LogNotifier, MaterialService, NotificationService,
    Notifier, ProductionService, ProfitabilityService, SaleService, SupplierService,
};
use store::{PgStore, Store};

/// All services wired over one store
#[derive(Clone)]
pub struct Canteen {
    pub materials: MaterialService,
    pub categories: CategoryService,
    pub sales: SaleService,
    pub profitability: ProfitabilityService,
    pub production: ProductionService,
    pub suppliers: SupplierService,
    pub notifications: NotificationService,
    store: Arc<dyn Store>,
    config: Arc<Config>,
}

impl Canteen {
    /// Connect to PostgreSQL and run migrations in development
    pub async fn connect(config: Config) -> AppResult<Self> {
        let store = PgStore::connect(&config.database).await?;
        if config.is_development() {
            store.migrate().await?;
        }
        Ok(Self::with_store(Arc::new(store), config))
    }

    /// Wire services over an existing store, choosing the notifier from
    /// configuration
    pub fn with_store(store: Arc<dyn Store>, config: Config) -> Self {
        let notifier = build_notifier(&config.notifications);
        Self::with_notifier(store, config, notifier)
    }

    pub fn with_notifier(store: Arc<dyn Store>, config: Config, notifier: Arc<dyn Notifier>) -> Self {
        let notifications =
            NotificationService::new(store.clone(), notifier, config.notifications.clone());

        Self {
            materials: MaterialService::new(store.clone(), config.inventory.clone()),
            categories: CategoryService::new(store.clone()),
            sales: SaleService::new(
                store.clone(),
                config.inventory.clone(),
                Some(notifications.clone()),
            ),
            profitability: ProfitabilityService::new(store.clone()),
            production: ProductionService::new(store.clone()),
            suppliers: SupplierService::new(store.clone()),
            notifications,
            store,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }
}

/// Twilio when configured, with WhatsApp Web links as fallback if enabled.
/// Without either, requests only go to the log.
pub fn build_notifier(config: &NotificationConfig) -> Arc<dyn Notifier> {
    let web: Option<Arc<dyn Notifier>> = if config.whatsapp_web_fallback {
        Some(Arc::new(WhatsAppWebNotifier::new()))
    } else {
        None
    };

    match (&config.twilio, web) {
        (Some(twilio), Some(web)) => Arc::new(FallbackNotifier::new(
            Arc::new(TwilioNotifier::new(twilio.clone())),
            web,
        )),
        (Some(twilio), None) => Arc::new(TwilioNotifier::new(twilio.clone())),
        (None, Some(web)) => web,
        (None, None) => Arc::new(LogNotifier),
    }
}
