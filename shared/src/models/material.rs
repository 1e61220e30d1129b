//! Raw material models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{MaterialId, SupplierId};
use crate::validation::{self, FieldError};

/// A raw material tracked by quantity and unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Current stock, denominated in `unit`
    pub quantity: Decimal,
    pub unit: String,
    /// Reorder point
    pub threshold: Decimal,
    /// Purchase cost of one `unit`; zero when unknown
    pub cost_per_unit: Decimal,
    pub supplier_id: Option<SupplierId>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    pub fn is_low_stock(&self) -> bool {
        crate::stock::is_low_stock(self.quantity, self.threshold)
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= Decimal::ZERO
    }
}

/// Input for adding or updating a material
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct NewMaterial {
    #[validate(custom = "validation::not_blank")]
    pub name: String,
    #[validate(custom = "validation::non_negative")]
    pub quantity: Decimal,
    #[validate(custom = "validation::not_blank")]
    pub unit: String,
    #[validate(custom = "validation::non_negative")]
    pub threshold: Decimal,
    #[validate(custom = "validation::non_negative")]
    pub cost_per_unit: Decimal,
    pub supplier_id: Option<SupplierId>,
}

impl NewMaterial {
    /// Build an input from raw form text, as typed into the till.
    ///
    /// A blank cost is read as zero (unknown).
    pub fn parse(
        name: &str,
        quantity: &str,
        unit: &str,
        threshold: &str,
        cost_per_unit: &str,
        supplier_id: Option<SupplierId>,
    ) -> Result<Self, FieldError> {
        validation::validate_not_blank(name).map_err(|m| FieldError::new("name", m))?;
        validation::validate_not_blank(unit).map_err(|m| FieldError::new("unit", m))?;

        let quantity =
            validation::parse_quantity(quantity).map_err(|m| FieldError::new("quantity", m))?;
        let threshold =
            validation::parse_quantity(threshold).map_err(|m| FieldError::new("threshold", m))?;
        let cost_per_unit = if cost_per_unit.trim().is_empty() {
            Decimal::ZERO
        } else {
            validation::parse_quantity(cost_per_unit)
                .map_err(|m| FieldError::new("cost_per_unit", m))?
        };

        Ok(Self {
            name: name.trim().to_string(),
            quantity,
            unit: unit.trim().to_string(),
            threshold,
            cost_per_unit,
            supplier_id,
        })
    }
}

/// Kinds of stock movement recorded in the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockTransactionType {
    Restock,
    Sale,
    Adjustment,
}

impl StockTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockTransactionType::Restock => "restock",
            StockTransactionType::Sale => "sale",
            StockTransactionType::Adjustment => "adjustment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "restock" => Some(StockTransactionType::Restock),
            "sale" => Some(StockTransactionType::Sale),
            "adjustment" => Some(StockTransactionType::Adjustment),
            _ => None,
        }
    }
}

/// One quantity change of one material
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockTransaction {
    pub id: i64,
    pub material_id: MaterialId,
    pub material_name: String,
    pub transaction_type: StockTransactionType,
    /// Signed change actually applied (after clamping)
    pub quantity_change: Decimal,
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stock movement about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewStockTransaction {
    pub material_id: MaterialId,
    pub transaction_type: StockTransactionType,
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
    pub notes: Option<String>,
}

impl NewStockTransaction {
    pub fn quantity_change(&self) -> Decimal {
        self.new_quantity - self.previous_quantity
    }
}

/// Headline counters for the inventory screen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InventoryStats {
    pub total_items: usize,
    /// Materials at or below their threshold
    pub low_stock: usize,
    /// Materials with nothing left
    pub out_of_stock: usize,
}

impl InventoryStats {
    pub fn from_materials(materials: &[Material]) -> Self {
        Self {
            total_items: materials.len(),
            low_stock: materials.iter().filter(|m| m.is_low_stock()).count(),
            out_of_stock: materials.iter().filter(|m| m.is_out_of_stock()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn material(id: MaterialId, quantity: &str, threshold: &str) -> Material {
        Material {
            id,
            name: format!("Material {}", id),
            quantity: dec(quantity),
            unit: "kg".to_string(),
            threshold: dec(threshold),
            cost_per_unit: Decimal::ZERO,
            supplier_id: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_material_form() {
        let input = NewMaterial::parse(" Flour ", "10", "kg", "2.5", "", None).unwrap();
        assert_eq!(input.name, "Flour");
        assert_eq!(input.quantity, dec("10"));
        assert_eq!(input.threshold, dec("2.5"));
        assert_eq!(input.cost_per_unit, Decimal::ZERO);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_parse_material_form_rejects_bad_fields() {
        let err = NewMaterial::parse("", "10", "kg", "2", "0", None).unwrap_err();
        assert_eq!(err.field, "name");

        let err = NewMaterial::parse("Flour", "ten", "kg", "2", "0", None).unwrap_err();
        assert_eq!(err.field, "quantity");

        let err = NewMaterial::parse("Flour", "10", "  ", "2", "0", None).unwrap_err();
        assert_eq!(err.field, "unit");

        let err = NewMaterial::parse("Flour", "10", "kg", "-1", "0", None).unwrap_err();
        assert_eq!(err.field, "threshold");
    }

    #[test]
    fn test_new_material_validation() {
        let mut input = NewMaterial::parse("Sugar", "5", "kg", "1", "40", Some(1)).unwrap();
        assert!(input.validate().is_ok());

        input.cost_per_unit = dec("-0.01");
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cost_per_unit"));
    }

    #[test]
    fn test_inventory_stats() {
        let materials = vec![
            material(1, "10", "2"),
            material(2, "2", "2"),
            material(3, "0", "1"),
        ];
        let stats = InventoryStats::from_materials(&materials);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.low_stock, 2);
        assert_eq!(stats.out_of_stock, 1);
    }

    #[test]
    fn test_stock_transaction_types() {
        for t in [
            StockTransactionType::Restock,
            StockTransactionType::Sale,
            StockTransactionType::Adjustment,
        ] {
            assert_eq!(StockTransactionType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(StockTransactionType::from_str("transfer"), None);
    }
}
