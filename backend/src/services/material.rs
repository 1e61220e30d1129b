//! Material ledger: raw-material stock levels and their movement history

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{
    apply_delta, low_stock_materials, InventoryStats, Material, MaterialId, NewMaterial,
    NewStockTransaction, StockTransaction, StockTransactionType,
};
use validator::Validate;

use crate::config::InventoryConfig;
use crate::error::{AppError, AppResult};
use crate::store::{finish, Store};

/// Material ledger service
#[derive(Clone)]
pub struct MaterialService {
    store: Arc<dyn Store>,
    config: InventoryConfig,
}

impl MaterialService {
    /// Create a new MaterialService instance
    pub fn new(store: Arc<dyn Store>, config: InventoryConfig) -> Self {
        Self { store, config }
    }

    /// Add a material to the ledger
    pub async fn add(&self, input: NewMaterial) -> AppResult<Material> {
        input.validate()?;
        self.ensure_supplier(&input).await?;

        let mut tx = self.store.begin().await?;
        let result = tx.insert_material(&input).await;
        let material = finish(tx, result).await?;

        tracing::info!(
            material_id = material.id,
            name = %material.name,
            quantity = %material.quantity,
            "Material added"
        );
        Ok(material)
    }

    /// Replace a material's fields. A changed quantity is recorded as an
    /// adjustment in the stock history.
    pub async fn update(&self, id: MaterialId, input: NewMaterial) -> AppResult<Material> {
        input.validate()?;
        self.ensure_supplier(&input).await?;

        let mut tx = self.store.begin().await?;
        let result = async {
            let current = tx
                .lock_material(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

            tx.update_material(id, &input).await?;

            if current.quantity != input.quantity {
                tx.insert_stock_transaction(&NewStockTransaction {
                    material_id: id,
                    transaction_type: StockTransactionType::Adjustment,
                    previous_quantity: current.quantity,
                    new_quantity: input.quantity,
                    notes: Some("Manual update".to_string()),
                })
                .await?;
            }

            tx.lock_material(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Material".to_string()))
        }
        .await;

        let material = finish(tx, result).await?;
        tracing::info!(material_id = id, name = %material.name, "Material updated");
        Ok(material)
    }

    /// Delete a material together with every recipe entry that uses it.
    /// A material sold directly by a category cannot be removed.
    pub async fn remove(&self, id: MaterialId) -> AppResult<()> {
        let sold_directly = self
            .store
            .list_categories()
            .await?
            .into_iter()
            .find(|c| c.kind.direct_material_id() == Some(id));
        if let Some(category) = sold_directly {
            return Err(AppError::validation(
                "material_id",
                format!("Material is sold directly as '{}'", category.name),
            ));
        }

        let mut tx = self.store.begin().await?;
        let result = match tx.delete_material(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::NotFound("Material".to_string())),
            Err(e) => Err(e),
        };
        finish(tx, result).await?;

        tracing::info!(material_id = id, "Material removed");
        Ok(())
    }

    /// Apply a signed change to a material's stock. The result never goes
    /// below zero. Returns the new quantity.
    pub async fn adjust_quantity(&self, id: MaterialId, delta: Decimal) -> AppResult<Decimal> {
        let transaction_type = if delta > Decimal::ZERO {
            StockTransactionType::Restock
        } else {
            StockTransactionType::Adjustment
        };

        let mut tx = self.store.begin().await?;
        let result = async {
            let material = tx
                .lock_material(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

            let new_quantity = apply_delta(material.quantity, delta)
                .map_err(|e| AppError::validation("delta", e.to_string()))?;
            tx.set_material_quantity(id, new_quantity).await?;
            tx.insert_stock_transaction(&NewStockTransaction {
                material_id: id,
                transaction_type,
                previous_quantity: material.quantity,
                new_quantity,
                notes: None,
            })
            .await?;

            Ok::<_, AppError>((material, new_quantity))
        }
        .await;

        let (material, new_quantity) = finish(tx, result).await?;

        tracing::info!(
            material_id = id,
            name = %material.name,
            previous = %material.quantity,
            new = %new_quantity,
            "Stock adjusted"
        );
        if shared::is_low_stock(new_quantity, material.threshold) {
            tracing::warn!(
                material_id = id,
                name = %material.name,
                quantity = %new_quantity,
                threshold = %material.threshold,
                "Material is low on stock"
            );
        }

        Ok(new_quantity)
    }

    /// Add delivered stock
    pub async fn restock(&self, id: MaterialId, amount: Decimal) -> AppResult<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation(
                "amount",
                "Restock amount must be greater than zero",
            ));
        }
        self.adjust_quantity(id, amount).await
    }

    pub async fn get(&self, id: MaterialId) -> AppResult<Material> {
        self.store
            .get_material(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Material".to_string()))
    }

    /// All materials ordered by id
    pub async fn list(&self) -> AppResult<Vec<Material>> {
        self.store.list_materials().await
    }

    /// Materials at or below their threshold, most critical first
    pub async fn low_stock(&self) -> AppResult<Vec<Material>> {
        Ok(low_stock_materials(self.store.list_materials().await?))
    }

    /// Recent stock movements of a material, newest first
    pub async fn stock_history(
        &self,
        id: MaterialId,
        limit: Option<i64>,
    ) -> AppResult<Vec<StockTransaction>> {
        self.get(id).await?;
        let limit = limit.unwrap_or(self.config.stock_history_limit);
        self.store.stock_history(id, limit).await
    }

    pub async fn stats(&self) -> AppResult<InventoryStats> {
        let materials = self.store.list_materials().await?;
        Ok(InventoryStats::from_materials(&materials))
    }

    async fn ensure_supplier(&self, input: &NewMaterial) -> AppResult<()> {
        if let Some(supplier_id) = input.supplier_id {
            if self.store.get_supplier(supplier_id).await?.is_none() {
                return Err(AppError::NotFound("Supplier".to_string()));
            }
        }
        Ok(())
    }
}
