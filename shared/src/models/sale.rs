//! Sale ledger models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::ProfitBreakdown;
use crate::types::{CategoryId, MaterialId, SaleId, SupplierId};

/// One recorded sale. Prices and costs are snapshots taken at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleRecord {
    pub id: SaleId,
    pub category_id: CategoryId,
    pub quantity_sold: Decimal,
    pub unit_price: Decimal,
    pub material_cost_per_unit: Decimal,
    pub profit_per_unit: Decimal,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub created_at: DateTime<Utc>,
}

impl SaleRecord {
    pub fn sale_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

/// A sale record joined with the category name, for the history screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleHistoryEntry {
    pub category_name: String,
    #[serde(flatten)]
    pub sale: SaleRecord,
}

/// Signal that a material fell to or below its reorder threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowStockEvent {
    pub material_id: MaterialId,
    pub name: String,
    /// Quantity left after the deduction
    pub quantity: Decimal,
    pub unit: String,
    pub threshold: Decimal,
    pub supplier_id: Option<SupplierId>,
}

impl LowStockEvent {
    pub fn suggested_reorder_quantity(&self) -> Decimal {
        crate::stock::suggested_reorder_quantity(self.quantity, self.threshold)
    }
}

/// Result of a successful sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleOutcome {
    pub sale_id: SaleId,
    pub category_id: CategoryId,
    pub quantity_sold: Decimal,
    #[serde(flatten)]
    pub profit: ProfitBreakdown,
    pub low_stock_events: Vec<LowStockEvent>,
}

impl SaleOutcome {
    pub fn material_cost_per_unit(&self) -> Decimal {
        self.profit.material_cost_per_unit
    }

    pub fn profit_per_unit(&self) -> Decimal {
        self.profit.profit_per_unit
    }

    pub fn total_profit(&self) -> Decimal {
        self.profit.total_profit
    }

    pub fn profit_margin_percent(&self) -> Decimal {
        self.profit.margin_percent
    }
}

/// Sales aggregated over one calendar day (UTC)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyProfitSummary {
    pub date: NaiveDate,
    pub sales_count: i64,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub margin_percent: Decimal,
}
