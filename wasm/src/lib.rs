//! WebAssembly module for the canteen till
//!
//! Provides client-side computation for:
//! - Profit and margin previews before a sale is rung up
//! - Reorder suggestions for low-stock materials
//! - Production forecasts from cached stock
//! - Receipt totals and input validation while offline
//!
//! Decimals cross the boundary as strings so no precision is lost to `f64`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("canteen-wasm ready"));
}

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn decimal(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("Invalid {}: {}", field, e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn profit_preview_json(price: &str, cost: &str, quantity: &str) -> Result<String, String> {
    let breakdown = shared::ProfitBreakdown::compute(
        decimal("price", price)?,
        decimal("cost", cost)?,
        decimal("quantity", quantity)?,
    )
    .map_err(|e| e.to_string())?;
    to_json(&breakdown)
}

/// Profit breakdown of selling `quantity` units, as JSON
#[wasm_bindgen]
pub fn profit_preview(price: &str, cost: &str, quantity: &str) -> Result<String, JsValue> {
    profit_preview_json(price, cost, quantity).map_err(to_js)
}

fn margin(price: &str, cost: &str) -> Result<String, String> {
    let price = decimal("price", price)?;
    let profit = price
        .checked_sub(decimal("cost", cost)?)
        .ok_or_else(|| "Profit is too large".to_string())?;
    Ok(shared::margin_percent(profit, price).round_dp(2).to_string())
}

/// Margin percent of one unit, rounded to two places
#[wasm_bindgen]
pub fn margin_percent(price: &str, cost: &str) -> Result<String, JsValue> {
    margin(price, cost).map_err(to_js)
}

fn reorder(quantity: &str, threshold: &str) -> Result<String, String> {
    let quantity = decimal("quantity", quantity)?;
    let threshold = decimal("threshold", threshold)?;
    Ok(shared::suggested_reorder_quantity(quantity, threshold)
        .normalize()
        .to_string())
}

/// Quantity to request from a supplier
#[wasm_bindgen]
pub fn suggested_reorder(quantity: &str, threshold: &str) -> Result<String, JsValue> {
    reorder(quantity, threshold).map_err(to_js)
}

/// Whether a stock level counts as low
#[wasm_bindgen]
pub fn is_low_stock(quantity: &str, threshold: &str) -> Result<bool, JsValue> {
    let quantity = decimal("quantity", quantity).map_err(to_js)?;
    let threshold = decimal("threshold", threshold).map_err(to_js)?;
    Ok(shared::is_low_stock(quantity, threshold))
}

fn forecast(category_json: &str, lines_json: &str) -> Result<String, String> {
    let category: Category =
        serde_json::from_str(category_json).map_err(|e| format!("Invalid category JSON: {}", e))?;
    let lines: Vec<RecipeLine> =
        serde_json::from_str(lines_json).map_err(|e| format!("Invalid recipe JSON: {}", e))?;
    to_json(&shared::predict_units(&category, &lines))
}

/// Production forecast for one category from cached recipe lines, as JSON
#[wasm_bindgen]
pub fn production_forecast(category_json: &str, lines_json: &str) -> Result<String, JsValue> {
    forecast(category_json, lines_json).map_err(to_js)
}

fn receipt(items_json: &str, customer_json: &str, issued_at: &str) -> Result<String, String> {
    let items: Vec<ReceiptItem> =
        serde_json::from_str(items_json).map_err(|e| format!("Invalid items JSON: {}", e))?;
    let customer: CustomerInfo = if customer_json.trim().is_empty() {
        CustomerInfo::default()
    } else {
        serde_json::from_str(customer_json).map_err(|e| format!("Invalid customer JSON: {}", e))?
    };
    let issued_at = DateTime::parse_from_rfc3339(issued_at)
        .map_err(|e| format!("Invalid issue time: {}", e))?
        .with_timezone(&Utc);
    let receipt = Receipt::build(&items, customer, issued_at).map_err(|e| e.to_string())?;
    to_json(&receipt)
}

/// Priced receipt for the items on the till, as JSON
#[wasm_bindgen]
pub fn build_receipt(
    items_json: &str,
    customer_json: &str,
    issued_at: &str,
) -> Result<String, JsValue> {
    receipt(items_json, customer_json, issued_at).map_err(to_js)
}

/// Validate a quantity typed at the till; returns the error message if any
#[wasm_bindgen]
pub fn validate_quantity_input(input: &str) -> Option<String> {
    parse_quantity(input).err().map(str::to_string)
}

/// Validate a supplier WhatsApp or phone number; returns the error message if any
#[wasm_bindgen]
pub fn validate_supplier_number(number: &str) -> Option<String> {
    validate_messaging_number(number).err().map(str::to_string)
}
