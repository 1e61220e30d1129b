//! Profitability calculator: material cost and margin per category

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{item_profitability, material_cost_per_unit, sort_by_profit, CategoryId, ItemProfitability};

use super::CategoryService;
use crate::error::{AppError, AppResult};
use crate::store::Store;

/// Profitability service
#[derive(Clone)]
pub struct ProfitabilityService {
    store: Arc<dyn Store>,
    categories: CategoryService,
}

impl ProfitabilityService {
    /// Create a new ProfitabilityService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            categories: CategoryService::new(store.clone()),
            store,
        }
    }

    /// Material cost of one unit at current material prices. Zero when
    /// nothing is mapped.
    pub async fn material_cost_per_unit(&self, category_id: CategoryId) -> AppResult<Decimal> {
        let lines = self.categories.entries_for(category_id).await?;
        Ok(material_cost_per_unit(&lines)?)
    }

    /// Every category with its cost, profit and margin, most profitable first
    pub async fn item_profitability(&self) -> AppResult<Vec<ItemProfitability>> {
        let categories = self.store.list_categories().await?;

        let mut items = Vec::with_capacity(categories.len());
        for category in &categories {
            let item = match self.categories.consumption(category).await {
                Ok(lines) => item_profitability(category, &lines).map_err(AppError::from),
                Err(e) => Err(e),
            };
            match item {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!(
                    category = %category.name,
                    "Skipping category in profitability report: {}",
                    e
                ),
            }
        }

        sort_by_profit(&mut items);
        Ok(items)
    }
}
