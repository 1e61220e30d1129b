//! Configuration management for the canteen engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with CANTEEN__ prefix
//!    (e.g. `CANTEEN__DATABASE__URL`, `CANTEEN__INVENTORY__DEDUCTION_POLICY`)

use config::{Environment, File};
use serde::Deserialize;
use shared::DeductionPolicy;

use crate::error::AppResult;

/// Main configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Stock and sale behaviour
    pub inventory: InventoryConfig,

    /// Low-stock notification configuration
    pub notifications: NotificationConfig,

    /// Log output configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,

    /// Milliseconds a transaction waits on a row lock before giving up
    pub lock_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// Clamp oversold stock at zero, or reject the sale
    pub deduction_policy: DeductionPolicy,

    /// Default number of sales shown in the history
    pub sales_history_limit: i64,

    /// Default number of stock movements shown per material
    pub stock_history_limit: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Send supply requests when a sale leaves a material low
    pub enabled: bool,

    /// Signature at the end of supply requests
    pub business_name: String,

    /// Produce a wa.me link when Twilio is missing or fails
    pub whatsapp_web_fallback: bool,

    /// Twilio WhatsApp credentials
    pub twilio: Option<TwilioConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TwilioConfig {
    /// Account SID
    pub account_sid: String,

    /// Auth token
    pub auth_token: String,

    /// Sending number, e.g. whatsapp:+14155238886
    pub from_number: String,

    /// API base URL
    #[serde(default = "default_twilio_api_base")]
    pub api_base: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_string()
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let environment =
            std::env::var("CANTEEN_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let defaults = Config::default();

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default("database.min_connections", defaults.database.min_connections)?
            .set_default(
                "database.acquire_timeout_secs",
                defaults.database.acquire_timeout_secs,
            )?
            .set_default("database.lock_timeout_ms", defaults.database.lock_timeout_ms)?
            .set_default(
                "inventory.deduction_policy",
                defaults.inventory.deduction_policy.as_str(),
            )?
            .set_default(
                "inventory.sales_history_limit",
                defaults.inventory.sales_history_limit,
            )?
            .set_default(
                "inventory.stock_history_limit",
                defaults.inventory.stock_history_limit,
            )?
            .set_default("notifications.enabled", defaults.notifications.enabled)?
            .set_default(
                "notifications.business_name",
                defaults.notifications.business_name,
            )?
            .set_default(
                "notifications.whatsapp_web_fallback",
                defaults.notifications.whatsapp_web_fallback,
            )?
            .set_default("logging.filter", defaults.logging.filter)?
            .set_default("logging.json", defaults.logging.json)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CANTEEN__ prefix)
            .add_source(
                Environment::with_prefix("CANTEEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://postgres@localhost:5432/canteen_db".to_string(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 30,
            lock_timeout_ms: 5_000,
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            deduction_policy: DeductionPolicy::Clamp,
            sales_history_limit: 100,
            stock_history_limit: 50,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            business_name: "Canteen Management".to_string(),
            whatsapp_web_fallback: true,
            twilio: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "canteen_backend=info,sqlx=warn".to_string(),
            json: false,
        }
    }
}
