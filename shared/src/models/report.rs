//! Reporting models: profitability and production forecasts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, MaterialId};

/// Per-category profitability at current prices and costs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemProfitability {
    pub category_id: CategoryId,
    pub name: String,
    pub selling_price: Decimal,
    pub material_cost: Decimal,
    pub profit_per_unit: Decimal,
    /// Rounded to two decimal places; zero when the price is zero
    pub margin_percent: Decimal,
}

/// What caps a category's producible units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ForecastLimit {
    /// The bottleneck material
    Material {
        material_id: MaterialId,
        name: String,
        available: Decimal,
        unit: String,
    },
    NoMaterialsMapped,
    InvalidMaterialAmounts,
}

impl std::fmt::Display for ForecastLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastLimit::Material {
                name,
                available,
                unit,
                ..
            } => write!(f, "{} ({} {} available)", name, available.normalize(), unit),
            ForecastLimit::NoMaterialsMapped => write!(f, "no materials mapped"),
            ForecastLimit::InvalidMaterialAmounts => write!(f, "invalid material amounts"),
        }
    }
}

/// Maximum units of a category producible from current stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionForecast {
    pub category_id: CategoryId,
    pub category_name: String,
    pub max_units: i64,
    pub limit: ForecastLimit,
}
