//! Supplier models

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::SupplierId;
use crate::validation;

/// A supplier that can be asked to restock materials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    /// WhatsApp number in international form, e.g. +919876543210
    pub whatsapp: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Input for adding or updating a supplier
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct NewSupplier {
    #[validate(custom = "validation::not_blank")]
    pub name: String,
    #[validate(custom = "validation::messaging_number")]
    pub whatsapp: Option<String>,
    #[validate(custom = "validation::messaging_number")]
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Resolved contact used to address a supply request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplierContact {
    pub supplier_id: SupplierId,
    pub name: String,
    pub whatsapp: Option<String>,
    pub phone: Option<String>,
}

impl SupplierContact {
    /// Number to message: WhatsApp if set, otherwise the phone number
    pub fn messaging_handle(&self) -> Option<&str> {
        self.whatsapp
            .as_deref()
            .or(self.phone.as_deref())
            .filter(|h| !h.trim().is_empty())
    }
}

impl From<Supplier> for SupplierContact {
    fn from(supplier: Supplier) -> Self {
        Self {
            supplier_id: supplier.id,
            name: supplier.name,
            whatsapp: supplier.whatsapp,
            phone: supplier.phone,
        }
    }
}
