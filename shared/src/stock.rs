//! Stock level arithmetic
//!
//! Quantities are fixed-point decimals so repeated deductions never drift.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Material;
use crate::types::{DeductionPolicy, Overflow};

/// A deduction that asked for more than was in stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub available: Decimal,
    pub required: Decimal,
}

/// Apply a signed change to a stock level, never going below zero.
/// Fails only when the raised level cannot be represented.
pub fn apply_delta(current: Decimal, delta: Decimal) -> Result<Decimal, Overflow> {
    match current.checked_add(delta) {
        Some(level) => Ok(level.max(Decimal::ZERO)),
        None if delta < Decimal::ZERO => Ok(Decimal::ZERO),
        None => Err(Overflow("quantity")),
    }
}

/// Remove `needed` from `current` under the given policy
pub fn deplete(
    current: Decimal,
    needed: Decimal,
    policy: DeductionPolicy,
) -> Result<Decimal, Shortfall> {
    match policy {
        DeductionPolicy::Clamp => Ok(current
            .checked_sub(needed)
            .map_or(Decimal::ZERO, |left| left.max(Decimal::ZERO))),
        DeductionPolicy::Reject if current < needed => Err(Shortfall {
            available: current,
            required: needed,
        }),
        DeductionPolicy::Reject => Ok(current - needed),
    }
}

/// A material is low once it reaches its threshold
pub fn is_low_stock(quantity: Decimal, threshold: Decimal) -> bool {
    quantity <= threshold
}

/// Order low-stock materials most critically depleted first.
///
/// The key is `quantity / threshold`. A zero threshold has no ratio and
/// sorts ahead of everything else; ties fall back to id.
pub fn low_stock_ordering(a: &Material, b: &Material) -> Ordering {
    depletion_key(a)
        .cmp(&depletion_key(b))
        .then_with(|| a.id.cmp(&b.id))
}

fn depletion_key(material: &Material) -> (u8, Decimal) {
    match material.quantity.checked_div(material.threshold) {
        Some(ratio) if !material.threshold.is_zero() => (1, ratio),
        _ => (0, Decimal::ZERO),
    }
}

/// Keep only low-stock materials, most critical first
pub fn low_stock_materials(materials: impl IntoIterator<Item = Material>) -> Vec<Material> {
    let mut low: Vec<Material> = materials
        .into_iter()
        .filter(|m| m.is_low_stock())
        .collect();
    low.sort_by(low_stock_ordering);
    low
}

/// Quantity to ask a supplier for: enough to reach twice the threshold,
/// and never less than the threshold itself
pub fn suggested_reorder_quantity(quantity: Decimal, threshold: Decimal) -> Decimal {
    threshold
        .checked_mul(Decimal::TWO)
        .and_then(|target| target.checked_sub(quantity))
        .map_or(threshold, |gap| gap.max(threshold))
        .round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn material(id: i64, quantity: &str, threshold: &str) -> Material {
        Material {
            id,
            name: format!("M{}", id),
            quantity: dec(quantity),
            unit: "kg".to_string(),
            threshold: dec(threshold),
            cost_per_unit: Decimal::ZERO,
            supplier_id: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_delta_clamps_at_zero() {
        assert_eq!(apply_delta(dec("10"), dec("-7.5")), Ok(dec("2.5")));
        assert_eq!(apply_delta(dec("10"), dec("-12")), Ok(Decimal::ZERO));
        assert_eq!(apply_delta(dec("0"), dec("4")), Ok(dec("4")));
    }

    #[test]
    fn test_apply_delta_out_of_range() {
        assert_eq!(
            apply_delta(Decimal::MAX, dec("1")),
            Err(Overflow("quantity"))
        );
        assert_eq!(apply_delta(dec("5"), Decimal::MIN), Ok(Decimal::ZERO));
        assert_eq!(
            deplete(dec("5"), Decimal::MAX, DeductionPolicy::Clamp),
            Ok(Decimal::ZERO)
        );
        assert_eq!(suggested_reorder_quantity(dec("1"), Decimal::MAX), Decimal::MAX);
    }

    #[test]
    fn test_deplete_policies() {
        assert_eq!(
            deplete(dec("3"), dec("5"), DeductionPolicy::Clamp),
            Ok(Decimal::ZERO)
        );
        assert_eq!(
            deplete(dec("3"), dec("5"), DeductionPolicy::Reject),
            Err(Shortfall {
                available: dec("3"),
                required: dec("5"),
            })
        );
        assert_eq!(
            deplete(dec("5"), dec("5"), DeductionPolicy::Reject),
            Ok(Decimal::ZERO)
        );
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(is_low_stock(dec("2"), dec("2")));
        assert!(is_low_stock(dec("0"), dec("0")));
        assert!(!is_low_stock(dec("2.5"), dec("2")));
    }

    #[test]
    fn test_low_stock_ordering() {
        let materials = vec![
            material(1, "4", "5"),   // 0.8
            material(2, "1", "10"),  // 0.1
            material(3, "0", "0"),   // no ratio
            material(4, "20", "5"),  // not low
            material(5, "5", "10"),  // 0.5
        ];
        let ids: Vec<i64> = low_stock_materials(materials).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2, 5, 1]);
    }

    #[test]
    fn test_suggested_reorder_quantity() {
        // threshold 5, stock 2.5 -> 10 - 2.5 = 7.5
        assert_eq!(suggested_reorder_quantity(dec("2.5"), dec("5")), dec("7.5"));
        // stock already near threshold -> at least the threshold
        assert_eq!(suggested_reorder_quantity(dec("6"), dec("5")), dec("5"));
        assert_eq!(suggested_reorder_quantity(dec("0"), dec("1.333")), dec("2.67"));
    }

    fn delta_strategy() -> impl Strategy<Value = Decimal> {
        (-100_000i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Stock never goes negative whatever sequence of adjustments is applied
        #[test]
        fn prop_adjustments_never_negative(
            start in (0i64..=100_000i64).prop_map(|n| Decimal::new(n, 2)),
            deltas in prop::collection::vec(delta_strategy(), 0..30)
        ) {
            let mut quantity = start;
            for delta in deltas {
                quantity = apply_delta(quantity, delta).unwrap();
                prop_assert!(quantity >= Decimal::ZERO);
            }
        }

        /// Under the reject policy a successful deduction is exact
        #[test]
        fn prop_reject_is_exact_or_refuses(
            current in (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 1)),
            needed in (1i64..=10_000i64).prop_map(|n| Decimal::new(n, 1))
        ) {
            match deplete(current, needed, DeductionPolicy::Reject) {
                Ok(left) => prop_assert_eq!(left + needed, current),
                Err(short) => prop_assert!(short.available < short.required),
            }
        }
    }
}
