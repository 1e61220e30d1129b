//! Shared types and models for the Canteen Inventory Platform
//!
//! This crate contains the domain model and the pure stock, pricing and
//! forecasting arithmetic shared between the backend engine, the browser
//! till (via WASM), and other components of the system.

pub mod forecast;
pub mod models;
pub mod pricing;
pub mod stock;
pub mod types;
pub mod validation;

pub use forecast::*;
pub use models::*;
pub use pricing::*;
pub use stock::*;
pub use types::*;
pub use validation::*;
