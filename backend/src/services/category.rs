//! Category recipe map: sellable categories and what they consume

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{
    Category, CategoryId, CategoryKind, MaterialId, NewCategory, RecipeEntry, RecipeLine,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{finish, Store};

/// Category and recipe service
#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn Store>,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a category
    pub async fn create_category(&self, input: NewCategory) -> AppResult<Category> {
        input.validate()?;
        self.ensure_linked_material(&input).await?;

        let mut tx = self.store.begin().await?;
        let result = tx.insert_category(&input).await;
        let category = finish(tx, result).await?;

        tracing::info!(
            category_id = category.id,
            name = %category.name,
            direct = category.kind.is_direct_material(),
            "Category created"
        );
        Ok(category)
    }

    /// Replace a category's fields
    pub async fn update_category(&self, id: CategoryId, input: NewCategory) -> AppResult<Category> {
        input.validate()?;
        self.ensure_linked_material(&input).await?;

        let mut tx = self.store.begin().await?;
        let result = async {
            if !tx.update_category(id, &input).await? {
                return Err(AppError::NotFound("Category".to_string()));
            }
            tx.category(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Category".to_string()))
        }
        .await;

        finish(tx, result).await
    }

    /// Delete a category and its recipe entries
    pub async fn delete_category(&self, id: CategoryId) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        let result = match tx.delete_category(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::NotFound("Category".to_string())),
            Err(e) => Err(e),
        };
        finish(tx, result).await?;

        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }

    pub async fn get_category(&self, id: CategoryId) -> AppResult<Category> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    /// All categories ordered by id
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.store.list_categories().await
    }

    /// Declare how much of a material one unit of a category consumes.
    /// Setting the same pair again replaces the amount.
    pub async fn set_entry(
        &self,
        category_id: CategoryId,
        material_id: MaterialId,
        amount_per_unit: Decimal,
    ) -> AppResult<()> {
        let entry = RecipeEntry {
            category_id,
            material_id,
            amount_per_unit,
        };
        entry.validate()?;

        let category = self.get_category(category_id).await?;
        if category.kind.is_direct_material() {
            return Err(AppError::validation(
                "category_id",
                "Direct-material categories have no recipe entries",
            ));
        }
        if self.store.get_material(material_id).await?.is_none() {
            return Err(AppError::NotFound("Material".to_string()));
        }

        let mut tx = self.store.begin().await?;
        let result = tx.upsert_recipe_entry(&entry).await;
        finish(tx, result).await?;

        tracing::debug!(
            category_id,
            material_id,
            amount = %amount_per_unit,
            "Recipe entry set"
        );
        Ok(())
    }

    /// Remove one recipe entry
    pub async fn remove_entry(
        &self,
        category_id: CategoryId,
        material_id: MaterialId,
    ) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        let result = match tx.delete_recipe_entry(category_id, material_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::NotFound("Recipe entry".to_string())),
            Err(e) => Err(e),
        };
        finish(tx, result).await
    }

    /// What one unit of the category consumes, ordered by material id
    pub async fn entries_for(&self, category_id: CategoryId) -> AppResult<Vec<RecipeLine>> {
        let category = self.get_category(category_id).await?;
        self.consumption(&category).await
    }

    /// Consumption of an already loaded category. A direct-material category
    /// consumes one unit of its linked material.
    pub async fn consumption(&self, category: &Category) -> AppResult<Vec<RecipeLine>> {
        match category.kind {
            CategoryKind::Composed => self.store.recipe_lines(category.id).await,
            CategoryKind::DirectMaterial { material_id } => {
                let material = self
                    .store
                    .get_material(material_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Material".to_string()))?;
                Ok(vec![RecipeLine {
                    material_id: material.id,
                    name: material.name,
                    amount_per_unit: Decimal::ONE,
                    current_stock: material.quantity,
                    unit: material.unit,
                    threshold: material.threshold,
                    supplier_id: material.supplier_id,
                    cost_per_unit: material.cost_per_unit,
                }])
            }
        }
    }

    async fn ensure_linked_material(&self, input: &NewCategory) -> AppResult<()> {
        if let Some(material_id) = input.kind.direct_material_id() {
            if self.store.get_material(material_id).await?.is_none() {
                return Err(AppError::NotFound("Material".to_string()));
            }
        }
        Ok(())
    }
}
