//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a raw material row
pub type MaterialId = i64;

/// Identifier of a sellable category
pub type CategoryId = i64;

/// Identifier of a supplier
pub type SupplierId = i64;

/// Identifier of a recorded sale
pub type SaleId = i64;

/// What happens when a sale needs more of a material than is in stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeductionPolicy {
    /// Deduct what is there and leave the material at zero
    #[default]
    Clamp,
    /// Refuse the whole sale
    Reject,
}

impl DeductionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeductionPolicy::Clamp => "clamp",
            DeductionPolicy::Reject => "reject",
        }
    }
}

/// Customer details printed on a receipt
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// A quantity or money amount grew past what a decimal can hold.
/// Carries the name of the figure that overflowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is too large")]
pub struct Overflow(pub &'static str);

/// `a * b`, or the overflow of the named figure
pub fn checked_product(a: Decimal, b: Decimal, figure: &'static str) -> Result<Decimal, Overflow> {
    a.checked_mul(b).ok_or(Overflow(figure))
}
