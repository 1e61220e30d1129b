//! Receipt data handed to the presentation layer for rendering

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{checked_product, CustomerInfo, Overflow};

/// An item as entered at the till
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl ReceiptItem {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }
}

/// A priced receipt line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Plain receipt: the core never formats currency or bill text itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receipt {
    pub lines: Vec<ReceiptLine>,
    pub total: Decimal,
    #[serde(default)]
    pub customer: CustomerInfo,
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    pub fn build(
        items: &[ReceiptItem],
        customer: CustomerInfo,
        issued_at: DateTime<Utc>,
    ) -> Result<Self, Overflow> {
        let lines = items
            .iter()
            .map(|item| {
                Ok(ReceiptLine {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: checked_product(item.quantity, item.unit_price, "line total")?,
                })
            })
            .collect::<Result<Vec<_>, Overflow>>()?;
        let total = lines.iter().try_fold(Decimal::ZERO, |total, line| {
            total.checked_add(line.line_total).ok_or(Overflow("total"))
        })?;

        Ok(Self {
            lines,
            total,
            customer,
            issued_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_totals() {
        let items = vec![
            ReceiptItem::new("Bread", Decimal::from(2), Decimal::new(2050, 2)),
            ReceiptItem::new("Tea", Decimal::from(3), Decimal::from(10)),
        ];
        let receipt = Receipt::build(&items, CustomerInfo::default(), Utc::now()).unwrap();

        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.lines[0].line_total, Decimal::from(41));
        assert_eq!(receipt.lines[1].line_total, Decimal::from(30));
        assert_eq!(receipt.total, Decimal::from(71));
    }

    #[test]
    fn test_empty_receipt() {
        let receipt = Receipt::build(&[], CustomerInfo::default(), Utc::now()).unwrap();
        assert!(receipt.lines.is_empty());
        assert_eq!(receipt.total, Decimal::ZERO);
    }

    #[test]
    fn test_receipt_total_out_of_range() {
        let items = vec![
            ReceiptItem::new("Bread", Decimal::ONE, Decimal::MAX),
            ReceiptItem::new("Tea", Decimal::ONE, Decimal::ONE),
        ];
        assert_eq!(
            Receipt::build(&items, CustomerInfo::default(), Utc::now()),
            Err(Overflow("total"))
        );
    }
}
