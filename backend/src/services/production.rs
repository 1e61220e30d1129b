//! Production predictor: how many units current stock can still make

use std::sync::Arc;

use shared::{predict_units, ProductionForecast};

use super::CategoryService;
use crate::error::AppResult;
use crate::store::Store;

/// Production forecast service
#[derive(Clone)]
pub struct ProductionService {
    store: Arc<dyn Store>,
    categories: CategoryService,
}

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            categories: CategoryService::new(store.clone()),
            store,
        }
    }

    /// Maximum producible units per category, ordered by category name
    pub async fn predict_production(&self) -> AppResult<Vec<ProductionForecast>> {
        let mut categories = self.store.list_categories().await?;
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let mut forecasts = Vec::with_capacity(categories.len());
        for category in &categories {
            let lines = self.categories.consumption(category).await?;
            let forecast = predict_units(category, &lines);
            tracing::debug!(
                category = %category.name,
                max_units = forecast.max_units,
                limit = %forecast.limit,
                "Production forecast"
            );
            forecasts.push(forecast);
        }
        Ok(forecasts)
    }
}
