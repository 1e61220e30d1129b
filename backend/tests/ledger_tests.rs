//! Material ledger and recipe map tests
//!
//! Tests for stock bookkeeping including:
//! - Non-negative stock under any sequence of adjustments
//! - Stock history for every quantity change
//! - Low-stock ordering
//! - Recipe upserts and cascading deletes

mod common;

use canteen_backend::store::Store;
use canteen_backend::AppError;
use common::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{CategoryKind, NewCategory, StockTransactionType};

// ============================================================================
// Material Ledger
// ============================================================================

/// Blank names and negative quantities are rejected with the field name
#[tokio::test]
async fn test_add_material_validation() {
    let canteen = canteen();

    let err = canteen
        .materials
        .add(new_material("  ", "1", "0", "0"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "name"));

    let err = canteen
        .materials
        .add(new_material("Flour", "-1", "0", "0"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity"));

    assert!(canteen.materials.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_material_name() {
    let canteen = canteen();
    add_material(&canteen, "Flour", "10", "2", "40").await;

    let err = canteen
        .materials
        .add(new_material("Flour", "5", "1", "40"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateEntry(_)));
}

/// Removing more than is in stock leaves zero
#[tokio::test]
async fn test_adjust_quantity_clamps_at_zero() {
    let canteen = canteen();
    let sugar = add_material(&canteen, "Sugar", "5", "1", "45").await;

    let new_quantity = canteen
        .materials
        .adjust_quantity(sugar.id, dec("-8"))
        .await
        .unwrap();
    assert_eq!(new_quantity, Decimal::ZERO);
    assert_eq!(canteen.materials.get(sugar.id).await.unwrap().quantity, Decimal::ZERO);

    let history = canteen.materials.stock_history(sugar.id, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].transaction_type, StockTransactionType::Adjustment);
    assert_eq!(history[0].previous_quantity, dec("5"));
    assert_eq!(history[0].new_quantity, Decimal::ZERO);
    assert_eq!(history[0].quantity_change, dec("-5"));
}

#[tokio::test]
async fn test_restock() {
    let canteen = canteen();
    let milk = add_material(&canteen, "Milk", "2.5", "3", "60").await;

    let new_quantity = canteen.materials.restock(milk.id, dec("10")).await.unwrap();
    assert_eq!(new_quantity, dec("12.5"));

    let history = canteen.materials.stock_history(milk.id, Some(10)).await.unwrap();
    assert_eq!(history[0].transaction_type, StockTransactionType::Restock);

    let err = canteen.materials.restock(milk.id, Decimal::ZERO).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

/// A delta that would push stock out of range is refused and leaves
/// no trace
#[tokio::test]
async fn test_adjust_quantity_out_of_range() {
    let canteen = canteen();
    let salt = add_material(&canteen, "Salt", "5", "1", "20").await;

    let err = canteen
        .materials
        .adjust_quantity(salt.id, Decimal::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "delta"));

    assert_eq!(canteen.materials.get(salt.id).await.unwrap().quantity, dec("5"));
    assert!(canteen
        .materials
        .stock_history(salt.id, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_adjust_unknown_material() {
    let canteen = canteen();
    let err = canteen
        .materials
        .adjust_quantity(42, dec("1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

/// Changing the quantity through an update is recorded as an adjustment
#[tokio::test]
async fn test_update_records_adjustment() {
    let canteen = canteen();
    let rice = add_material(&canteen, "Rice", "20", "5", "50").await;

    let updated = canteen
        .materials
        .update(rice.id, new_material("Basmati Rice", "18", "5", "55"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Basmati Rice");
    assert_eq!(updated.quantity, dec("18"));
    assert_eq!(updated.cost_per_unit, dec("55"));

    let history = canteen.materials.stock_history(rice.id, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].quantity_change, dec("-2"));

    // Same quantity, no new history row
    canteen
        .materials
        .update(rice.id, new_material("Basmati Rice", "18", "4", "55"))
        .await
        .unwrap();
    let history = canteen.materials.stock_history(rice.id, None).await.unwrap();
    assert_eq!(history.len(), 1);

    let err = canteen
        .materials
        .update(99, new_material("Ghost", "1", "0", "0"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

/// Zero thresholds first, then lowest quantity/threshold ratio
#[tokio::test]
async fn test_low_stock_ordering() {
    let canteen = canteen();
    let oil = add_material(&canteen, "Oil", "1", "10", "120").await;
    let tea = add_material(&canteen, "Tea", "5", "10", "300").await;
    let salt = add_material(&canteen, "Salt", "0", "0", "20").await;
    add_material(&canteen, "Rice", "50", "10", "50").await;

    let low: Vec<_> = canteen
        .materials
        .low_stock()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(low, vec![salt.id, oil.id, tea.id]);

    let stats = canteen.materials.stats().await.unwrap();
    assert_eq!(stats.total_items, 4);
    assert_eq!(stats.low_stock, 3);
    assert_eq!(stats.out_of_stock, 1);
}

/// Removing a material removes the recipe entries that name it
#[tokio::test]
async fn test_remove_material_cascades_recipe_entries() {
    let canteen = canteen();
    let flour = add_material(&canteen, "Flour", "10", "2", "40").await;
    let sugar = add_material(&canteen, "Sugar", "5", "1", "45").await;
    let cake = add_recipe(&canteen, "Cake", "60", &[(&flour, "0.2"), (&sugar, "0.1")]).await;

    canteen.materials.remove(flour.id).await.unwrap();

    let lines = canteen.categories.entries_for(cake.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].material_id, sugar.id);

    let err = canteen.materials.remove(flour.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_remove_material_sold_directly_is_refused() {
    let canteen = canteen();
    let cola = add_material(&canteen, "Cola Bottle", "24", "6", "30").await;
    canteen
        .categories
        .create_category(NewCategory::direct_material("Cold Drinks", dec("40"), cola.id))
        .await
        .unwrap();

    let err = canteen.materials.remove(cola.id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
    assert!(canteen.materials.get(cola.id).await.is_ok());
}

// ============================================================================
// Category Recipe Map
// ============================================================================

/// Setting the same pair twice leaves one entry with the last amount
#[tokio::test]
async fn test_set_entry_upsert_is_idempotent() {
    let canteen = canteen();
    let flour = add_material(&canteen, "Flour", "10", "2", "40").await;
    let bread = add_recipe(&canteen, "Bread", "30", &[(&flour, "0.5")]).await;

    for _ in 0..2 {
        canteen
            .categories
            .set_entry(bread.id, flour.id, dec("0.3"))
            .await
            .unwrap();
    }

    let lines = canteen.categories.entries_for(bread.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].amount_per_unit, dec("0.3"));
    assert_eq!(lines[0].current_stock, dec("10"));
}

#[tokio::test]
async fn test_set_entry_rejections() {
    let canteen = canteen();
    let flour = add_material(&canteen, "Flour", "10", "2", "40").await;
    let bread = add_recipe(&canteen, "Bread", "30", &[]).await;

    let err = canteen
        .categories
        .set_entry(bread.id, flour.id, Decimal::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "amount_per_unit"));

    let err = canteen
        .categories
        .set_entry(bread.id, 99, dec("1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = canteen
        .categories
        .set_entry(99, flour.id, dec("1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = canteen
        .categories
        .remove_entry(bread.id, flour.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

/// Deleting a category removes its recipe entries
#[tokio::test]
async fn test_delete_category_cascades_recipe_entries() {
    let canteen = canteen();
    let flour = add_material(&canteen, "Flour", "10", "2", "40").await;
    let bread = add_recipe(&canteen, "Bread", "30", &[(&flour, "0.5")]).await;

    canteen.categories.delete_category(bread.id).await.unwrap();

    assert!(canteen.store().recipe_lines(bread.id).await.unwrap().is_empty());
    assert!(matches!(
        canteen.categories.get_category(bread.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    // The material itself stays
    assert!(canteen.materials.get(flour.id).await.is_ok());
}

#[tokio::test]
async fn test_direct_material_category() {
    let canteen = canteen();
    let cola = add_material(&canteen, "Cola Bottle", "24", "6", "30").await;
    let drinks = canteen
        .categories
        .create_category(NewCategory::direct_material("Cold Drinks", dec("40"), cola.id))
        .await
        .unwrap();
    assert_eq!(drinks.kind, CategoryKind::DirectMaterial { material_id: cola.id });

    let lines = canteen.categories.entries_for(drinks.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].material_id, cola.id);
    assert_eq!(lines[0].amount_per_unit, Decimal::ONE);

    let err = canteen
        .categories
        .set_entry(drinks.id, cola.id, dec("2"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = canteen
        .categories
        .create_category(NewCategory::direct_material("Juice", dec("30"), 99))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

/// Turning a composed category into a direct material drops its recipe,
/// so turning it back starts from an empty one
#[tokio::test]
async fn test_switching_to_direct_material_drops_recipe() {
    let canteen = canteen();
    let flour = add_material(&canteen, "Flour", "10", "2", "40").await;
    let cola = add_material(&canteen, "Cola Bottle", "24", "6", "30").await;
    let bread = add_recipe(&canteen, "Bread", "30", &[(&flour, "0.5")]).await;

    canteen
        .categories
        .update_category(bread.id, NewCategory::direct_material("Bread", dec("30"), cola.id))
        .await
        .unwrap();
    assert!(canteen.store().recipe_lines(bread.id).await.unwrap().is_empty());

    let bread = canteen
        .categories
        .update_category(bread.id, NewCategory::composed("Bread", dec("30")))
        .await
        .unwrap();
    assert_eq!(bread.kind, CategoryKind::Composed);
    assert!(canteen.categories.entries_for(bread.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_category_crud() {
    let canteen = canteen();
    let tea = canteen
        .categories
        .create_category(NewCategory::composed("Tea", dec("15")).with_description("Masala chai"))
        .await
        .unwrap();

    let err = canteen
        .categories
        .create_category(NewCategory::composed("Tea", dec("10")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateEntry(_)));

    let updated = canteen
        .categories
        .update_category(tea.id, NewCategory::composed("Tea", dec("18")))
        .await
        .unwrap();
    assert_eq!(updated.selling_price, dec("18"));

    let coffee = canteen
        .categories
        .create_category(NewCategory::composed("Coffee", dec("20")))
        .await
        .unwrap();
    let ids: Vec<_> = canteen
        .categories
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![tea.id, coffee.id]);

    let err = canteen
        .categories
        .create_category(NewCategory::composed("Free Water", dec("-1")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "selling_price"));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Stock never goes negative, whatever the sequence of adjustments
    #[test]
    fn prop_adjustments_never_negative(
        start in 0i64..1_000,
        deltas in prop::collection::vec(-500i64..500, 1..20),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let canteen = canteen();
            let material = add_material(&canteen, "Flour", &start.to_string(), "0", "0").await;

            let mut expected = Decimal::from(start);
            for delta in &deltas {
                let delta = Decimal::from(*delta);
                let new_quantity = canteen
                    .materials
                    .adjust_quantity(material.id, delta)
                    .await
                    .unwrap();
                expected = (expected + delta).max(Decimal::ZERO);
                assert!(new_quantity >= Decimal::ZERO);
                assert_eq!(new_quantity, expected);
            }
        });
    }
}
