//! Sellable category models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{CategoryId, MaterialId};
use crate::validation::{self, FieldError};

/// How selling one unit of a category consumes stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CategoryKind {
    /// Consumes materials according to its recipe entries
    #[default]
    Composed,
    /// The category is one material sold as-is (e.g. a bottled drink);
    /// each unit sold consumes one unit of that material
    DirectMaterial { material_id: MaterialId },
}

impl CategoryKind {
    pub fn is_direct_material(&self) -> bool {
        matches!(self, CategoryKind::DirectMaterial { .. })
    }

    pub fn direct_material_id(&self) -> Option<MaterialId> {
        match self {
            CategoryKind::Composed => None,
            CategoryKind::DirectMaterial { material_id } => Some(*material_id),
        }
    }

    /// Rebuild the kind from its stored columns
    pub fn from_columns(
        is_direct_material: bool,
        direct_material_id: Option<MaterialId>,
    ) -> Result<Self, FieldError> {
        match (is_direct_material, direct_material_id) {
            (false, _) => Ok(CategoryKind::Composed),
            (true, Some(material_id)) => Ok(CategoryKind::DirectMaterial { material_id }),
            (true, None) => Err(FieldError::new(
                "direct_material_id",
                "Direct-material category has no linked material",
            )),
        }
    }
}

/// A sellable menu item or product line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub selling_price: Decimal,
    pub kind: CategoryKind,
}

/// Input for creating or updating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct NewCategory {
    #[validate(custom = "validation::not_blank")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(custom = "validation::non_negative")]
    pub selling_price: Decimal,
    #[serde(default)]
    pub kind: CategoryKind,
}

impl NewCategory {
    pub fn composed(name: impl Into<String>, selling_price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            selling_price,
            kind: CategoryKind::Composed,
        }
    }

    pub fn direct_material(
        name: impl Into<String>,
        selling_price: Decimal,
        material_id: MaterialId,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            selling_price,
            kind: CategoryKind::DirectMaterial { material_id },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
