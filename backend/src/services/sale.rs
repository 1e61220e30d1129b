//! Sale processor: deducts stock for a sale and records its profit

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use shared::{
    deplete, is_low_stock, Category, CategoryId, CustomerInfo, DailyProfitSummary,
    DeductionPolicy, LowStockEvent, NewStockTransaction, Overflow, ProfitBreakdown, Receipt,
    ReceiptItem, RecipeLine, SaleHistoryEntry, SaleOutcome, SaleRecord, StockTransactionType,
};

use super::{CategoryService, NotificationService};
use crate::config::InventoryConfig;
use crate::error::{AppError, AppResult};
use crate::store::{finish, Store, StoreTx};

/// Days covered by the profit summary when none are given
pub const DEFAULT_SUMMARY_DAYS: i64 = 7;

/// Longest profit summary window
const MAX_SUMMARY_DAYS: i64 = 36_500;

/// Sale service
#[derive(Clone)]
pub struct SaleService {
    store: Arc<dyn Store>,
    categories: CategoryService,
    notifications: Option<NotificationService>,
    config: InventoryConfig,
}

/// Everything written by one sale
struct AppliedSale {
    sale: SaleRecord,
    profit: ProfitBreakdown,
    low_stock_events: Vec<LowStockEvent>,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(
        store: Arc<dyn Store>,
        config: InventoryConfig,
        notifications: Option<NotificationService>,
    ) -> Self {
        Self {
            categories: CategoryService::new(store.clone()),
            store,
            notifications,
            config,
        }
    }

    /// Record a sale of `quantity_sold` units of a category.
    ///
    /// Every consumed material is locked, deducted and written together with
    /// the sale record in one transaction. Low-stock events are handed to the
    /// notification service after commit.
    pub async fn record_sale(
        &self,
        category_id: CategoryId,
        quantity_sold: Decimal,
    ) -> AppResult<SaleOutcome> {
        if quantity_sold <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity);
        }

        let category = self.categories.get_category(category_id).await?;
        let mut lines = self.categories.consumption(&category).await?;
        if lines.is_empty() {
            return Err(AppError::NoRecipe(category.name));
        }
        // Lock order is always ascending material id
        lines.sort_by_key(|line| line.material_id);

        let mut tx = self.store.begin().await?;
        let result = apply_sale(
            tx.as_mut(),
            &category,
            &lines,
            quantity_sold,
            self.config.deduction_policy,
        )
        .await;
        let applied = finish(tx, result).await?;

        tracing::info!(
            sale_id = applied.sale.id,
            category = %category.name,
            quantity = %quantity_sold,
            revenue = %applied.profit.total_revenue,
            profit = %applied.profit.total_profit,
            "Sale recorded"
        );
        for event in &applied.low_stock_events {
            tracing::warn!(
                material_id = event.material_id,
                material = %event.name,
                quantity = %event.quantity,
                threshold = %event.threshold,
                "Material is low on stock"
            );
        }

        if let Some(notifications) = &self.notifications {
            notifications.dispatch(applied.low_stock_events.clone());
        }

        Ok(SaleOutcome {
            sale_id: applied.sale.id,
            category_id,
            quantity_sold,
            profit: applied.profit,
            low_stock_events: applied.low_stock_events,
        })
    }

    /// Build a receipt for a set of completed sales
    pub async fn receipt(
        &self,
        sales: &[SaleOutcome],
        customer: CustomerInfo,
    ) -> AppResult<Receipt> {
        let mut items = Vec::with_capacity(sales.len());
        for sale in sales {
            let name = match self.store.get_category(sale.category_id).await? {
                Some(category) => category.name,
                None => format!("Item #{}", sale.category_id),
            };
            items.push(ReceiptItem::new(
                name,
                sale.quantity_sold,
                sale.profit.unit_price,
            ));
        }
        Ok(Receipt::build(&items, customer, Utc::now())?)
    }

    /// Most recent sales, newest first
    pub async fn sales_history(&self, limit: Option<i64>) -> AppResult<Vec<SaleHistoryEntry>> {
        let limit = limit.unwrap_or(self.config.sales_history_limit);
        self.store.list_sales(limit).await
    }

    /// Per-day totals for the last `days` days including today (UTC),
    /// newest first. Today counts as the first day, so `Some(1)` is today
    /// alone; the window is not `days` full days back from today. Capped at
    /// `MAX_SUMMARY_DAYS`.
    pub async fn profit_summary(&self, days: Option<i64>) -> AppResult<Vec<DailyProfitSummary>> {
        let days = days.unwrap_or(DEFAULT_SUMMARY_DAYS).clamp(1, MAX_SUMMARY_DAYS);
        let since = Utc::now().date_naive() - Duration::days(days - 1);
        self.store.daily_profit(since).await
    }
}

async fn apply_sale(
    tx: &mut dyn StoreTx,
    category: &Category,
    lines: &[RecipeLine],
    quantity_sold: Decimal,
    policy: DeductionPolicy,
) -> AppResult<AppliedSale> {
    let mut material_cost_per_unit = Decimal::ZERO;
    let mut low_stock_events = Vec::new();

    for line in lines {
        let material = tx
            .lock_material(line.material_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Material {}", line.name)))?;

        let needed = line.required_for(quantity_sold).map_err(too_large)?;
        let new_quantity = deplete(material.quantity, needed, policy).map_err(|shortfall| {
            AppError::InsufficientStock {
                material: material.name.clone(),
                available: shortfall.available,
                required: shortfall.required,
            }
        })?;

        tx.set_material_quantity(material.id, new_quantity).await?;
        tx.insert_stock_transaction(&NewStockTransaction {
            material_id: material.id,
            transaction_type: StockTransactionType::Sale,
            previous_quantity: material.quantity,
            new_quantity,
            notes: Some(format!("Sold {} x {}", quantity_sold, category.name)),
        })
        .await?;

        material_cost_per_unit = line
            .amount_per_unit
            .checked_mul(material.cost_per_unit)
            .and_then(|cost| material_cost_per_unit.checked_add(cost))
            .ok_or(Overflow("material cost"))
            .map_err(too_large)?;

        if is_low_stock(new_quantity, material.threshold) {
            low_stock_events.push(LowStockEvent {
                material_id: material.id,
                name: material.name,
                quantity: new_quantity,
                unit: material.unit,
                threshold: material.threshold,
                supplier_id: material.supplier_id,
            });
        }
    }

    // Price as of this transaction, not as of when the recipe was read
    let unit_price = tx
        .category(category.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?
        .selling_price;

    let profit = ProfitBreakdown::compute(unit_price, material_cost_per_unit, quantity_sold)
        .map_err(too_large)?;
    let sale = tx.insert_sale(category.id, quantity_sold, &profit).await?;

    Ok(AppliedSale {
        sale,
        profit,
        low_stock_events,
    })
}

/// A sale whose quantity drives a stock or money figure out of range
fn too_large(err: Overflow) -> AppError {
    AppError::validation("quantity_sold", err.to_string())
}
