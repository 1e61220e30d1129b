//! Category to material mapping models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{checked_product, CategoryId, MaterialId, Overflow, SupplierId};
use crate::validation;

/// Declared consumption of one material per unit of one category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RecipeEntry {
    pub category_id: CategoryId,
    pub material_id: MaterialId,
    #[validate(custom = "validation::positive")]
    pub amount_per_unit: Decimal,
}

/// A recipe entry joined with the live state of its material
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeLine {
    pub material_id: MaterialId,
    pub name: String,
    pub amount_per_unit: Decimal,
    pub current_stock: Decimal,
    pub unit: String,
    pub threshold: Decimal,
    pub supplier_id: Option<SupplierId>,
    pub cost_per_unit: Decimal,
}

impl RecipeLine {
    /// Material needed to make `quantity` units
    pub fn required_for(&self, quantity: Decimal) -> Result<Decimal, Overflow> {
        checked_product(self.amount_per_unit, quantity, "required quantity")
    }

    /// Material cost contributed to one unit of the category
    pub fn unit_cost(&self) -> Result<Decimal, Overflow> {
        checked_product(self.amount_per_unit, self.cost_per_unit, "material cost")
    }
}
