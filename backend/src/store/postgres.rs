//! PostgreSQL store

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    margin_percent, Category, CategoryId, CategoryKind, DailyProfitSummary, Material, MaterialId,
    NewCategory, NewMaterial, NewNotificationLog, NewStockTransaction, NewSupplier,
    NotificationChannel, NotificationLogEntry, ProfitBreakdown, RecipeEntry, RecipeLine,
    SaleHistoryEntry, SaleRecord, StockTransaction, StockTransactionType, Supplier, SupplierId,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{Store, StoreTx};
use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    lock_timeout_ms: u64,
}

/// One open PostgreSQL transaction
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, FromRow)]
struct MaterialRow {
    id: i64,
    name: String,
    quantity: Decimal,
    unit: String,
    threshold: Decimal,
    cost_per_unit: Decimal,
    supplier_id: Option<i64>,
    updated_at: DateTime<Utc>,
}

impl From<MaterialRow> for Material {
    fn from(row: MaterialRow) -> Self {
        Material {
            id: row.id,
            name: row.name,
            quantity: row.quantity,
            unit: row.unit,
            threshold: row.threshold,
            cost_per_unit: row.cost_per_unit,
            supplier_id: row.supplier_id,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    description: String,
    selling_price: Decimal,
    is_direct_material: bool,
    direct_material_id: Option<i64>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = AppError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let kind = CategoryKind::from_columns(row.is_direct_material, row.direct_material_id)?;
        Ok(Category {
            id: row.id,
            name: row.name,
            description: row.description,
            selling_price: row.selling_price,
            kind,
        })
    }
}

#[derive(Debug, FromRow)]
struct RecipeLineRow {
    material_id: i64,
    name: String,
    amount_per_unit: Decimal,
    current_stock: Decimal,
    unit: String,
    threshold: Decimal,
    supplier_id: Option<i64>,
    cost_per_unit: Decimal,
}

impl From<RecipeLineRow> for RecipeLine {
    fn from(row: RecipeLineRow) -> Self {
        RecipeLine {
            material_id: row.material_id,
            name: row.name,
            amount_per_unit: row.amount_per_unit,
            current_stock: row.current_stock,
            unit: row.unit,
            threshold: row.threshold,
            supplier_id: row.supplier_id,
            cost_per_unit: row.cost_per_unit,
        }
    }
}

#[derive(Debug, FromRow)]
struct StockTransactionRow {
    id: i64,
    material_id: i64,
    material_name: String,
    transaction_type: String,
    quantity_change: Decimal,
    previous_quantity: Decimal,
    new_quantity: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<StockTransactionRow> for StockTransaction {
    type Error = AppError;

    fn try_from(row: StockTransactionRow) -> Result<Self, Self::Error> {
        let transaction_type = StockTransactionType::from_str(&row.transaction_type)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Unknown stock transaction type: {}",
                    row.transaction_type
                ))
            })?;
        Ok(StockTransaction {
            id: row.id,
            material_id: row.material_id,
            material_name: row.material_name,
            transaction_type,
            quantity_change: row.quantity_change,
            previous_quantity: row.previous_quantity,
            new_quantity: row.new_quantity,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: i64,
    category_id: i64,
    category_name: String,
    quantity_sold: Decimal,
    unit_price: Decimal,
    material_cost_per_unit: Decimal,
    profit_per_unit: Decimal,
    total_revenue: Decimal,
    total_cost: Decimal,
    total_profit: Decimal,
    created_at: DateTime<Utc>,
}

impl From<SaleRow> for SaleHistoryEntry {
    fn from(row: SaleRow) -> Self {
        SaleHistoryEntry {
            category_name: row.category_name,
            sale: SaleRecord {
                id: row.id,
                category_id: row.category_id,
                quantity_sold: row.quantity_sold,
                unit_price: row.unit_price,
                material_cost_per_unit: row.material_cost_per_unit,
                profit_per_unit: row.profit_per_unit,
                total_revenue: row.total_revenue,
                total_cost: row.total_cost,
                total_profit: row.total_profit,
                created_at: row.created_at,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct DailyProfitRow {
    date: NaiveDate,
    sales_count: i64,
    total_revenue: Decimal,
    total_cost: Decimal,
    total_profit: Decimal,
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    id: i64,
    name: String,
    whatsapp: Option<String>,
    phone: Option<String>,
    notes: Option<String>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            whatsapp: row.whatsapp,
            phone: row.phone,
            notes: row.notes,
        }
    }
}

#[derive(Debug, FromRow)]
struct NotificationLogRow {
    id: i64,
    supplier_id: Option<i64>,
    material_id: Option<i64>,
    message: String,
    channel: String,
    success: bool,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationLogRow> for NotificationLogEntry {
    type Error = AppError;

    fn try_from(row: NotificationLogRow) -> Result<Self, Self::Error> {
        let channel = NotificationChannel::from_str(&row.channel).ok_or_else(|| {
            AppError::Internal(format!("Unknown notification channel: {}", row.channel))
        })?;
        Ok(NotificationLogEntry {
            id: row.id,
            supplier_id: row.supplier_id,
            material_id: row.material_id,
            message: row.message,
            channel,
            success: row.success,
            detail: row.detail,
            created_at: row.created_at,
        })
    }
}

// ============================================================================
// Store
// ============================================================================

impl PgStore {
    pub fn new(pool: PgPool, lock_timeout_ms: u64) -> Self {
        Self {
            pool,
            lock_timeout_ms,
        }
    }

    /// Open a connection pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;
        tracing::info!("Database connection established");

        Ok(Self::new(pool, config.lock_timeout_ms))
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
        tracing::info!("Migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        let mut tx = self.pool.begin().await?;

        // Waiting longer than this on a row lock surfaces as a retryable error
        sqlx::query(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout_ms
        ))
        .execute(&mut *tx)
        .await?;

        Ok(Box::new(PgTx { tx }))
    }

    async fn get_material(&self, id: MaterialId) -> AppResult<Option<Material>> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, quantity, unit, threshold, cost_per_unit, supplier_id, updated_at
            FROM materials
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_materials(&self) -> AppResult<Vec<Material>> {
        let rows = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, quantity, unit, threshold, cost_per_unit, supplier_id, updated_at
            FROM materials
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn stock_history(
        &self,
        material_id: MaterialId,
        limit: i64,
    ) -> AppResult<Vec<StockTransaction>> {
        let rows = sqlx::query_as::<_, StockTransactionRow>(
            r#"
            SELECT st.id, st.material_id, m.name AS material_name, st.transaction_type,
                   st.quantity_change, st.previous_quantity, st.new_quantity, st.notes,
                   st.created_at
            FROM stock_transactions st
            JOIN materials m ON m.id = st.material_id
            WHERE st.material_id = $1
            ORDER BY st.created_at DESC, st.id DESC
            LIMIT $2
            "#,
        )
        .bind(material_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StockTransaction::try_from).collect()
    }

    async fn get_category(&self, id: CategoryId) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, selling_price, is_direct_material, direct_material_id
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Category::try_from).transpose()
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, selling_price, is_direct_material, direct_material_id
            FROM categories
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    async fn recipe_lines(&self, category_id: CategoryId) -> AppResult<Vec<RecipeLine>> {
        let rows = sqlx::query_as::<_, RecipeLineRow>(
            r#"
            SELECT m.id AS material_id, m.name, re.amount_per_unit, m.quantity AS current_stock,
                   m.unit, m.threshold, m.supplier_id, m.cost_per_unit
            FROM recipe_entries re
            JOIN materials m ON m.id = re.material_id
            WHERE re.category_id = $1
            ORDER BY m.id
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_sales(&self, limit: i64) -> AppResult<Vec<SaleHistoryEntry>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, category_id, category_name, quantity_sold, unit_price,
                   material_cost_per_unit, profit_per_unit, total_revenue, total_cost,
                   total_profit, created_at
            FROM sales
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn daily_profit(&self, since: NaiveDate) -> AppResult<Vec<DailyProfitSummary>> {
        let rows = sqlx::query_as::<_, DailyProfitRow>(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS date,
                   COUNT(*) AS sales_count,
                   SUM(total_revenue) AS total_revenue,
                   SUM(total_cost) AS total_cost,
                   SUM(total_profit) AS total_profit
            FROM sales
            WHERE (created_at AT TIME ZONE 'UTC')::date >= $1
            GROUP BY 1
            ORDER BY 1 DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailyProfitSummary {
                date: row.date,
                sales_count: row.sales_count,
                margin_percent: margin_percent(row.total_profit, row.total_revenue).round_dp(2),
                total_revenue: row.total_revenue,
                total_cost: row.total_cost,
                total_profit: row.total_profit,
            })
            .collect())
    }

    async fn get_supplier(&self, id: SupplierId) -> AppResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, name, whatsapp, phone, notes FROM suppliers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_suppliers(&self, limit: i64) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, name, whatsapp, phone, notes FROM suppliers ORDER BY id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn notification_log(&self, limit: i64) -> AppResult<Vec<NotificationLogEntry>> {
        let rows = sqlx::query_as::<_, NotificationLogRow>(
            r#"
            SELECT id, supplier_id, material_id, message, channel, success, detail, created_at
            FROM notification_log
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(NotificationLogEntry::try_from).collect()
    }
}

// ============================================================================
// Transaction
// ============================================================================

#[async_trait]
impl StoreTx for PgTx {
    async fn lock_material(&mut self, id: MaterialId) -> AppResult<Option<Material>> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, quantity, unit, threshold, cost_per_unit, supplier_id, updated_at
            FROM materials
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        tracing::debug!(material_id = id, found = row.is_some(), "Locked material row");
        Ok(row.map(Into::into))
    }

    async fn set_material_quantity(&mut self, id: MaterialId, quantity: Decimal) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE materials SET quantity = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(quantity)
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Material".to_string()));
        }
        Ok(())
    }

    async fn insert_material(&mut self, input: &NewMaterial) -> AppResult<Material> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            INSERT INTO materials (name, quantity, unit, threshold, cost_per_unit, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, quantity, unit, threshold, cost_per_unit, supplier_id, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(input.quantity)
        .bind(input.unit.trim())
        .bind(input.threshold)
        .bind(input.cost_per_unit)
        .bind(input.supplier_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.into())
    }

    async fn update_material(&mut self, id: MaterialId, input: &NewMaterial) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE materials
            SET name = $1, quantity = $2, unit = $3, threshold = $4, cost_per_unit = $5,
                supplier_id = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(input.name.trim())
        .bind(input.quantity)
        .bind(input.unit.trim())
        .bind(input.threshold)
        .bind(input.cost_per_unit)
        .bind(input.supplier_id)
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_material(&mut self, id: MaterialId) -> AppResult<bool> {
        sqlx::query("DELETE FROM recipe_entries WHERE material_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn category(&mut self, id: CategoryId) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, selling_price, is_direct_material, direct_material_id
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(Category::try_from).transpose()
    }

    async fn insert_category(&mut self, input: &NewCategory) -> AppResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, description, selling_price, is_direct_material, direct_material_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, selling_price, is_direct_material, direct_material_id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.selling_price)
        .bind(input.kind.is_direct_material())
        .bind(input.kind.direct_material_id())
        .fetch_one(&mut *self.tx)
        .await?;

        row.try_into()
    }

    async fn update_category(&mut self, id: CategoryId, input: &NewCategory) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $1, description = $2, selling_price = $3, is_direct_material = $4,
                direct_material_id = $5
            WHERE id = $6
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.selling_price)
        .bind(input.kind.is_direct_material())
        .bind(input.kind.direct_material_id())
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        // A directly sold category has no recipe
        if result.rows_affected() > 0 && input.kind.is_direct_material() {
            sqlx::query("DELETE FROM recipe_entries WHERE category_id = $1")
                .bind(id)
                .execute(&mut *self.tx)
                .await?;
        }

        Ok(result.rows_affected() > 0)
    }

    async fn delete_category(&mut self, id: CategoryId) -> AppResult<bool> {
        sqlx::query("DELETE FROM recipe_entries WHERE category_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_recipe_entry(&mut self, entry: &RecipeEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_entries (category_id, material_id, amount_per_unit)
            VALUES ($1, $2, $3)
            ON CONFLICT (category_id, material_id)
            DO UPDATE SET amount_per_unit = EXCLUDED.amount_per_unit
            "#,
        )
        .bind(entry.category_id)
        .bind(entry.material_id)
        .bind(entry.amount_per_unit)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn delete_recipe_entry(
        &mut self,
        category_id: CategoryId,
        material_id: MaterialId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM recipe_entries WHERE category_id = $1 AND material_id = $2",
        )
        .bind(category_id)
        .bind(material_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_stock_transaction(
        &mut self,
        input: &NewStockTransaction,
    ) -> AppResult<StockTransaction> {
        let row = sqlx::query_as::<_, StockTransactionRow>(
            r#"
            WITH inserted AS (
                INSERT INTO stock_transactions (
                    material_id, transaction_type, quantity_change, previous_quantity,
                    new_quantity, notes
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT i.id, i.material_id, m.name AS material_name, i.transaction_type,
                   i.quantity_change, i.previous_quantity, i.new_quantity, i.notes, i.created_at
            FROM inserted i
            JOIN materials m ON m.id = i.material_id
            "#,
        )
        .bind(input.material_id)
        .bind(input.transaction_type.as_str())
        .bind(input.quantity_change())
        .bind(input.previous_quantity)
        .bind(input.new_quantity)
        .bind(&input.notes)
        .fetch_one(&mut *self.tx)
        .await?;

        row.try_into()
    }

    async fn insert_sale(
        &mut self,
        category_id: CategoryId,
        quantity: Decimal,
        profit: &ProfitBreakdown,
    ) -> AppResult<SaleRecord> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            INSERT INTO sales (
                category_id, category_name, quantity_sold, unit_price, material_cost_per_unit,
                profit_per_unit, total_revenue, total_cost, total_profit
            )
            SELECT id, name, $2, $3, $4, $5, $6, $7, $8
            FROM categories
            WHERE id = $1
            RETURNING id, category_id, category_name, quantity_sold, unit_price,
                      material_cost_per_unit, profit_per_unit, total_revenue, total_cost,
                      total_profit, created_at
            "#,
        )
        .bind(category_id)
        .bind(quantity)
        .bind(profit.unit_price)
        .bind(profit.material_cost_per_unit)
        .bind(profit.profit_per_unit)
        .bind(profit.total_revenue)
        .bind(profit.total_cost)
        .bind(profit.total_profit)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        Ok(SaleHistoryEntry::from(row).sale)
    }

    async fn insert_supplier(&mut self, input: &NewSupplier) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            INSERT INTO suppliers (name, whatsapp, phone, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, whatsapp, phone, notes
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.whatsapp)
        .bind(&input.phone)
        .bind(&input.notes)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.into())
    }

    async fn update_supplier(&mut self, id: SupplierId, input: &NewSupplier) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $1, whatsapp = $2, phone = $3, notes = $4
            WHERE id = $5
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.whatsapp)
        .bind(&input.phone)
        .bind(&input.notes)
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_notification_log(
        &mut self,
        input: &NewNotificationLog,
    ) -> AppResult<NotificationLogEntry> {
        let row = sqlx::query_as::<_, NotificationLogRow>(
            r#"
            INSERT INTO notification_log (supplier_id, material_id, message, channel, success, detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, supplier_id, material_id, message, channel, success, detail, created_at
            "#,
        )
        .bind(input.supplier_id)
        .bind(input.material_id)
        .bind(&input.message)
        .bind(input.channel.as_str())
        .bind(input.success)
        .bind(&input.detail)
        .fetch_one(&mut *self.tx)
        .await?;

        row.try_into()
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let PgTx { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let PgTx { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
