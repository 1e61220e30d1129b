//! Supplier directory

use std::sync::Arc;

use shared::{MaterialId, NewSupplier, Supplier, SupplierContact, SupplierId};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{finish, Store};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    store: Arc<dyn Store>,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn add(&self, input: NewSupplier) -> AppResult<Supplier> {
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let result = tx.insert_supplier(&input).await;
        let supplier = finish(tx, result).await?;

        tracing::info!(supplier_id = supplier.id, name = %supplier.name, "Supplier added");
        Ok(supplier)
    }

    pub async fn update(&self, id: SupplierId, input: NewSupplier) -> AppResult<Supplier> {
        input.validate()?;

        let mut tx = self.store.begin().await?;
        let result = match tx.update_supplier(id, &input).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::NotFound("Supplier".to_string())),
            Err(e) => Err(e),
        };
        finish(tx, result).await?;

        self.get(id).await
    }

    pub async fn get(&self, id: SupplierId) -> AppResult<Supplier> {
        self.store
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Suppliers ordered by id
    pub async fn list(&self, limit: i64) -> AppResult<Vec<Supplier>> {
        self.store.list_suppliers(limit).await
    }

    /// Who to ask for more of a material
    pub async fn contact_for_material(
        &self,
        material_id: MaterialId,
    ) -> AppResult<Option<SupplierContact>> {
        let material = self
            .store
            .get_material(material_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Material".to_string()))?;
        self.resolve_contact(material.supplier_id).await
    }

    /// The assigned supplier if it still exists, otherwise the first
    /// supplier on record
    pub async fn resolve_contact(
        &self,
        supplier_id: Option<SupplierId>,
    ) -> AppResult<Option<SupplierContact>> {
        if let Some(id) = supplier_id {
            if let Some(supplier) = self.store.get_supplier(id).await? {
                return Ok(Some(supplier.into()));
            }
            tracing::debug!(supplier_id = id, "Assigned supplier missing, using fallback");
        }

        Ok(self
            .store
            .list_suppliers(1)
            .await?
            .into_iter()
            .next()
            .map(Into::into))
    }
}
