//! Persistence boundary for the canteen engine
//!
//! Services talk to a `Store` for reads and open a `StoreTx` for anything
//! that writes. A transaction either commits every write or none of them.
//! `lock_material` holds the row until commit or rollback so concurrent
//! sales serialize per material.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{
    Category, CategoryId, DailyProfitSummary, Material, MaterialId, NewCategory, NewMaterial,
    NewNotificationLog, NewStockTransaction, NewSupplier, NotificationLogEntry, ProfitBreakdown,
    RecipeEntry, RecipeLine, SaleHistoryEntry, SaleRecord, StockTransaction, Supplier, SupplierId,
};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Read access plus the entry point for transactions
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>>;

    async fn get_material(&self, id: MaterialId) -> AppResult<Option<Material>>;

    /// All materials ordered by id
    async fn list_materials(&self) -> AppResult<Vec<Material>>;

    /// Most recent movements of one material, newest first
    async fn stock_history(
        &self,
        material_id: MaterialId,
        limit: i64,
    ) -> AppResult<Vec<StockTransaction>>;

    async fn get_category(&self, id: CategoryId) -> AppResult<Option<Category>>;

    /// All categories ordered by id
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    /// Recipe entries of a composed category joined with their materials,
    /// ordered by material id
    async fn recipe_lines(&self, category_id: CategoryId) -> AppResult<Vec<RecipeLine>>;

    /// Most recent sales, newest first
    async fn list_sales(&self, limit: i64) -> AppResult<Vec<SaleHistoryEntry>>;

    /// Per-day totals of sales made on or after `since` (UTC), newest first
    async fn daily_profit(&self, since: NaiveDate) -> AppResult<Vec<DailyProfitSummary>>;

    async fn get_supplier(&self, id: SupplierId) -> AppResult<Option<Supplier>>;

    /// Suppliers ordered by id
    async fn list_suppliers(&self, limit: i64) -> AppResult<Vec<Supplier>>;

    /// Most recent notification attempts, newest first
    async fn notification_log(&self, limit: i64) -> AppResult<Vec<NotificationLogEntry>>;
}

/// Writes inside one transaction
#[async_trait]
pub trait StoreTx: Send {
    /// Read a material and hold its row lock until the transaction ends
    async fn lock_material(&mut self, id: MaterialId) -> AppResult<Option<Material>>;

    async fn set_material_quantity(&mut self, id: MaterialId, quantity: Decimal) -> AppResult<()>;

    async fn insert_material(&mut self, input: &NewMaterial) -> AppResult<Material>;

    /// Returns false when the material does not exist
    async fn update_material(&mut self, id: MaterialId, input: &NewMaterial) -> AppResult<bool>;

    /// Deletes the material and every recipe entry naming it.
    /// Returns false when the material does not exist.
    async fn delete_material(&mut self, id: MaterialId) -> AppResult<bool>;

    /// Category as seen inside this transaction
    async fn category(&mut self, id: CategoryId) -> AppResult<Option<Category>>;

    async fn insert_category(&mut self, input: &NewCategory) -> AppResult<Category>;

    /// Replace a category. Switching it to a direct material drops its
    /// recipe entries.
    async fn update_category(&mut self, id: CategoryId, input: &NewCategory) -> AppResult<bool>;

    /// Deletes the category and its recipe entries
    async fn delete_category(&mut self, id: CategoryId) -> AppResult<bool>;

    /// Insert or replace the entry for (category, material)
    async fn upsert_recipe_entry(&mut self, entry: &RecipeEntry) -> AppResult<()>;

    async fn delete_recipe_entry(
        &mut self,
        category_id: CategoryId,
        material_id: MaterialId,
    ) -> AppResult<bool>;

    async fn insert_stock_transaction(
        &mut self,
        input: &NewStockTransaction,
    ) -> AppResult<StockTransaction>;

    async fn insert_sale(
        &mut self,
        category_id: CategoryId,
        quantity: Decimal,
        profit: &ProfitBreakdown,
    ) -> AppResult<SaleRecord>;

    async fn insert_supplier(&mut self, input: &NewSupplier) -> AppResult<Supplier>;

    async fn update_supplier(&mut self, id: SupplierId, input: &NewSupplier) -> AppResult<bool>;

    async fn insert_notification_log(
        &mut self,
        input: &NewNotificationLog,
    ) -> AppResult<NotificationLogEntry>;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Commit on success, roll back on failure. The original error wins over
/// a failed rollback.
pub async fn finish<T>(tx: Box<dyn StoreTx>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("Rollback failed after {}: {}", e, rollback_err);
            }
            Err(e)
        }
    }
}
