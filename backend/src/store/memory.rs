//! In-memory store
//!
//! A transaction takes the single state lock for its whole lifetime and
//! works on a copy. Commit writes the copy back; dropping the transaction
//! discards it. Reads through `Store` wait for any open transaction, so a
//! task must not read through the store while it holds a transaction.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    summarize_daily, Category, CategoryId, DailyProfitSummary, Material, MaterialId, NewCategory,
    NewMaterial, NewNotificationLog, NewStockTransaction, NewSupplier, NotificationLogEntry,
    ProfitBreakdown, RecipeEntry, RecipeLine, SaleHistoryEntry, SaleRecord, StockTransaction,
    Supplier, SupplierId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Store, StoreTx};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    materials: BTreeMap<MaterialId, Material>,
    categories: BTreeMap<CategoryId, Category>,
    recipes: BTreeMap<(CategoryId, MaterialId), Decimal>,
    sales: Vec<SaleHistoryEntry>,
    stock_transactions: Vec<StockTransaction>,
    suppliers: BTreeMap<SupplierId, Supplier>,
    notifications: Vec<NotificationLogEntry>,
    last_material_id: i64,
    last_category_id: i64,
    last_sale_id: i64,
    last_stock_transaction_id: i64,
    last_supplier_id: i64,
    last_notification_id: i64,
}

fn next_id(sequence: &mut i64) -> i64 {
    *sequence += 1;
    *sequence
}

impl MemoryState {
    fn ensure_unique_material_name(&self, name: &str, except: Option<MaterialId>) -> AppResult<()> {
        let taken = self
            .materials
            .values()
            .any(|m| m.name == name && Some(m.id) != except);
        if taken {
            return Err(AppError::DuplicateEntry("materials_name_key".to_string()));
        }
        Ok(())
    }

    fn ensure_unique_category_name(&self, name: &str, except: Option<CategoryId>) -> AppResult<()> {
        let taken = self
            .categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except);
        if taken {
            return Err(AppError::DuplicateEntry("categories_name_key".to_string()));
        }
        Ok(())
    }

    fn ensure_supplier(&self, supplier_id: Option<SupplierId>) -> AppResult<()> {
        match supplier_id {
            Some(id) if !self.suppliers.contains_key(&id) => {
                Err(AppError::NotFound("Supplier".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn ensure_direct_material(&self, input: &NewCategory) -> AppResult<()> {
        match input.kind.direct_material_id() {
            Some(id) if !self.materials.contains_key(&id) => {
                Err(AppError::NotFound("Material".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn material_for(&self, id: MaterialId, input: &NewMaterial) -> Material {
        Material {
            id,
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            unit: input.unit.trim().to_string(),
            threshold: input.threshold,
            cost_per_unit: input.cost_per_unit,
            supplier_id: input.supplier_id,
            updated_at: Utc::now(),
        }
    }
}

/// Store kept entirely in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Open in-memory transaction holding the state lock
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn get_material(&self, id: MaterialId) -> AppResult<Option<Material>> {
        Ok(self.state.lock().await.materials.get(&id).cloned())
    }

    async fn list_materials(&self) -> AppResult<Vec<Material>> {
        Ok(self.state.lock().await.materials.values().cloned().collect())
    }

    async fn stock_history(
        &self,
        material_id: MaterialId,
        limit: i64,
    ) -> AppResult<Vec<StockTransaction>> {
        let state = self.state.lock().await;
        Ok(state
            .stock_transactions
            .iter()
            .rev()
            .filter(|t| t.material_id == material_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get_category(&self, id: CategoryId) -> AppResult<Option<Category>> {
        Ok(self.state.lock().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.state.lock().await.categories.values().cloned().collect())
    }

    async fn recipe_lines(&self, category_id: CategoryId) -> AppResult<Vec<RecipeLine>> {
        let state = self.state.lock().await;
        Ok(state
            .recipes
            .range((category_id, MaterialId::MIN)..=(category_id, MaterialId::MAX))
            .filter_map(|(&(_, material_id), &amount)| {
                state.materials.get(&material_id).map(|m| RecipeLine {
                    material_id,
                    name: m.name.clone(),
                    amount_per_unit: amount,
                    current_stock: m.quantity,
                    unit: m.unit.clone(),
                    threshold: m.threshold,
                    supplier_id: m.supplier_id,
                    cost_per_unit: m.cost_per_unit,
                })
            })
            .collect())
    }

    async fn list_sales(&self, limit: i64) -> AppResult<Vec<SaleHistoryEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .sales
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn daily_profit(&self, since: NaiveDate) -> AppResult<Vec<DailyProfitSummary>> {
        let state = self.state.lock().await;
        Ok(summarize_daily(
            state
                .sales
                .iter()
                .map(|entry| &entry.sale)
                .filter(|sale| sale.sale_date() >= since),
        ))
    }

    async fn get_supplier(&self, id: SupplierId) -> AppResult<Option<Supplier>> {
        Ok(self.state.lock().await.suppliers.get(&id).cloned())
    }

    async fn list_suppliers(&self, limit: i64) -> AppResult<Vec<Supplier>> {
        let state = self.state.lock().await;
        Ok(state
            .suppliers
            .values()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn notification_log(&self, limit: i64) -> AppResult<Vec<NotificationLogEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .notifications
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_material(&mut self, id: MaterialId) -> AppResult<Option<Material>> {
        Ok(self.working.materials.get(&id).cloned())
    }

    async fn set_material_quantity(&mut self, id: MaterialId, quantity: Decimal) -> AppResult<()> {
        let material = self
            .working
            .materials
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Material".to_string()))?;
        material.quantity = quantity;
        material.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_material(&mut self, input: &NewMaterial) -> AppResult<Material> {
        let state = &mut self.working;
        state.ensure_unique_material_name(input.name.trim(), None)?;
        state.ensure_supplier(input.supplier_id)?;

        let id = next_id(&mut state.last_material_id);
        let material = state.material_for(id, input);
        state.materials.insert(id, material.clone());
        Ok(material)
    }

    async fn update_material(&mut self, id: MaterialId, input: &NewMaterial) -> AppResult<bool> {
        let state = &mut self.working;
        if !state.materials.contains_key(&id) {
            return Ok(false);
        }
        state.ensure_unique_material_name(input.name.trim(), Some(id))?;
        state.ensure_supplier(input.supplier_id)?;

        let material = state.material_for(id, input);
        state.materials.insert(id, material);
        Ok(true)
    }

    async fn delete_material(&mut self, id: MaterialId) -> AppResult<bool> {
        let state = &mut self.working;
        if state
            .categories
            .values()
            .any(|c| c.kind.direct_material_id() == Some(id))
        {
            return Err(AppError::validation(
                "material_id",
                "Material is sold directly by a category",
            ));
        }

        state.recipes.retain(|&(_, material_id), _| material_id != id);
        state.stock_transactions.retain(|t| t.material_id != id);
        Ok(state.materials.remove(&id).is_some())
    }

    async fn category(&mut self, id: CategoryId) -> AppResult<Option<Category>> {
        Ok(self.working.categories.get(&id).cloned())
    }

    async fn insert_category(&mut self, input: &NewCategory) -> AppResult<Category> {
        let state = &mut self.working;
        state.ensure_unique_category_name(input.name.trim(), None)?;
        state.ensure_direct_material(input)?;

        let id = next_id(&mut state.last_category_id);
        let category = Category {
            id,
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            selling_price: input.selling_price,
            kind: input.kind,
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(&mut self, id: CategoryId, input: &NewCategory) -> AppResult<bool> {
        let state = &mut self.working;
        if !state.categories.contains_key(&id) {
            return Ok(false);
        }
        state.ensure_unique_category_name(input.name.trim(), Some(id))?;
        state.ensure_direct_material(input)?;

        state.categories.insert(
            id,
            Category {
                id,
                name: input.name.trim().to_string(),
                description: input.description.clone(),
                selling_price: input.selling_price,
                kind: input.kind,
            },
        );
        if input.kind.is_direct_material() {
            state.recipes.retain(|&(category_id, _), _| category_id != id);
        }
        Ok(true)
    }

    async fn delete_category(&mut self, id: CategoryId) -> AppResult<bool> {
        let state = &mut self.working;
        state.recipes.retain(|&(category_id, _), _| category_id != id);
        Ok(state.categories.remove(&id).is_some())
    }

    async fn upsert_recipe_entry(&mut self, entry: &RecipeEntry) -> AppResult<()> {
        let state = &mut self.working;
        if !state.categories.contains_key(&entry.category_id) {
            return Err(AppError::NotFound("Category".to_string()));
        }
        if !state.materials.contains_key(&entry.material_id) {
            return Err(AppError::NotFound("Material".to_string()));
        }
        state
            .recipes
            .insert((entry.category_id, entry.material_id), entry.amount_per_unit);
        Ok(())
    }

    async fn delete_recipe_entry(
        &mut self,
        category_id: CategoryId,
        material_id: MaterialId,
    ) -> AppResult<bool> {
        Ok(self
            .working
            .recipes
            .remove(&(category_id, material_id))
            .is_some())
    }

    async fn insert_stock_transaction(
        &mut self,
        input: &NewStockTransaction,
    ) -> AppResult<StockTransaction> {
        let state = &mut self.working;
        let material_name = state
            .materials
            .get(&input.material_id)
            .map(|m| m.name.clone())
            .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

        let transaction = StockTransaction {
            id: next_id(&mut state.last_stock_transaction_id),
            material_id: input.material_id,
            material_name,
            transaction_type: input.transaction_type,
            quantity_change: input.quantity_change(),
            previous_quantity: input.previous_quantity,
            new_quantity: input.new_quantity,
            notes: input.notes.clone(),
            created_at: Utc::now(),
        };
        state.stock_transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn insert_sale(
        &mut self,
        category_id: CategoryId,
        quantity: Decimal,
        profit: &ProfitBreakdown,
    ) -> AppResult<SaleRecord> {
        let state = &mut self.working;
        let category_name = state
            .categories
            .get(&category_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        let sale = SaleRecord {
            id: next_id(&mut state.last_sale_id),
            category_id,
            quantity_sold: quantity,
            unit_price: profit.unit_price,
            material_cost_per_unit: profit.material_cost_per_unit,
            profit_per_unit: profit.profit_per_unit,
            total_revenue: profit.total_revenue,
            total_cost: profit.total_cost,
            total_profit: profit.total_profit,
            created_at: Utc::now(),
        };
        state.sales.push(SaleHistoryEntry {
            category_name,
            sale: sale.clone(),
        });
        Ok(sale)
    }

    async fn insert_supplier(&mut self, input: &NewSupplier) -> AppResult<Supplier> {
        let state = &mut self.working;
        let supplier = Supplier {
            id: next_id(&mut state.last_supplier_id),
            name: input.name.trim().to_string(),
            whatsapp: input.whatsapp.clone(),
            phone: input.phone.clone(),
            notes: input.notes.clone(),
        };
        state.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn update_supplier(&mut self, id: SupplierId, input: &NewSupplier) -> AppResult<bool> {
        match self.working.suppliers.get_mut(&id) {
            Some(supplier) => {
                supplier.name = input.name.trim().to_string();
                supplier.whatsapp = input.whatsapp.clone();
                supplier.phone = input.phone.clone();
                supplier.notes = input.notes.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_notification_log(
        &mut self,
        input: &NewNotificationLog,
    ) -> AppResult<NotificationLogEntry> {
        let state = &mut self.working;
        let entry = NotificationLogEntry {
            id: next_id(&mut state.last_notification_id),
            supplier_id: input.supplier_id,
            material_id: input.material_id,
            message: input.message.clone(),
            channel: input.channel,
            success: input.success,
            detail: input.detail.clone(),
            created_at: Utc::now(),
        };
        state.notifications.push(entry.clone());
        Ok(entry)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn flour() -> NewMaterial {
        NewMaterial {
            name: "Flour".to_string(),
            quantity: dec("10"),
            unit: "kg".to_string(),
            threshold: dec("2"),
            cost_per_unit: dec("40"),
            supplier_id: None,
        }
    }

    #[tokio::test]
    async fn test_commit_applies_writes() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let material = tx.insert_material(&flour()).await.unwrap();
        tx.commit().await.unwrap();

        let stored = store.get_material(material.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Flour");
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_material(&flour()).await.unwrap();
        }
        assert!(store.list_materials().await.unwrap().is_empty());

        let mut tx = store.begin().await.unwrap();
        tx.insert_material(&flour()).await.unwrap();
        tx.rollback().await.unwrap();
        assert!(store.list_materials().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_material_name_rejected() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_material(&flour()).await.unwrap();
        let err = tx.insert_material(&flour()).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEntry(_)));
    }

    #[tokio::test]
    async fn test_recipe_lines_ordered_by_material_id() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let flour_row = tx.insert_material(&flour()).await.unwrap();
        let mut sugar = flour();
        sugar.name = "Sugar".to_string();
        let sugar_row = tx.insert_material(&sugar).await.unwrap();
        let cake = tx
            .insert_category(&NewCategory::composed("Cake", dec("50")))
            .await
            .unwrap();
        for (material_id, amount) in [(sugar_row.id, "0.1"), (flour_row.id, "0.25")] {
            tx.upsert_recipe_entry(&RecipeEntry {
                category_id: cake.id,
                material_id,
                amount_per_unit: dec(amount),
            })
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        let lines = store.recipe_lines(cake.id).await.unwrap();
        let ids: Vec<_> = lines.iter().map(|l| l.material_id).collect();
        assert_eq!(ids, vec![flour_row.id, sugar_row.id]);
        assert_eq!(lines[0].amount_per_unit, dec("0.25"));
    }
}
