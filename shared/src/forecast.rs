//! Production forecasting from current stock

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{Category, ForecastLimit, ProductionForecast, RecipeLine};

/// Whole units of one recipe line that current stock can cover.
///
/// Returns `None` for a non-positive amount, which is invalid rather than
/// unlimited.
pub fn possible_units(line: &RecipeLine) -> Option<i64> {
    if line.amount_per_unit <= Decimal::ZERO {
        return None;
    }
    let units = line
        .current_stock
        .max(Decimal::ZERO)
        .checked_div(line.amount_per_unit)?
        .floor();
    Some(units.to_i64().unwrap_or(i64::MAX))
}

/// Maximum units of `category` producible from its recipe lines; the
/// scarcest material is the limit
pub fn predict_units(category: &Category, lines: &[RecipeLine]) -> ProductionForecast {
    let forecast = |max_units, limit| ProductionForecast {
        category_id: category.id,
        category_name: category.name.clone(),
        max_units,
        limit,
    };

    if lines.is_empty() {
        return forecast(0, ForecastLimit::NoMaterialsMapped);
    }

    let mut bottleneck: Option<(i64, &RecipeLine)> = None;
    for line in lines {
        let Some(units) = possible_units(line) else {
            continue;
        };
        if bottleneck.map_or(true, |(min, _)| units < min) {
            bottleneck = Some((units, line));
        }
    }

    match bottleneck {
        Some((units, line)) => forecast(
            units,
            ForecastLimit::Material {
                material_id: line.material_id,
                name: line.name.clone(),
                available: line.current_stock,
                unit: line.unit.clone(),
            },
        ),
        None => forecast(0, ForecastLimit::InvalidMaterialAmounts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryKind;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn bread() -> Category {
        Category {
            id: 1,
            name: "Bread".to_string(),
            description: String::new(),
            selling_price: dec("30"),
            kind: CategoryKind::Composed,
        }
    }

    fn line(id: i64, name: &str, amount: Decimal, stock: Decimal) -> RecipeLine {
        RecipeLine {
            material_id: id,
            name: name.to_string(),
            amount_per_unit: amount,
            current_stock: stock,
            unit: "kg".to_string(),
            threshold: Decimal::ZERO,
            supplier_id: None,
            cost_per_unit: Decimal::ZERO,
        }
    }

    #[test]
    fn test_bottleneck_material_wins() {
        let lines = vec![
            line(1, "Flour", dec("0.5"), dec("10")),  // 20
            line(2, "Yeast", dec("0.01"), dec("0.15")), // 15
            line(3, "Salt", dec("0.02"), dec("1")),   // 50
        ];
        let forecast = predict_units(&bread(), &lines);
        assert_eq!(forecast.max_units, 15);
        match forecast.limit {
            ForecastLimit::Material { material_id, .. } => assert_eq!(material_id, 2),
            other => panic!("unexpected limit {:?}", other),
        }
    }

    #[test]
    fn test_no_materials_mapped() {
        let forecast = predict_units(&bread(), &[]);
        assert_eq!(forecast.max_units, 0);
        assert_eq!(forecast.limit, ForecastLimit::NoMaterialsMapped);
    }

    #[test]
    fn test_invalid_amounts_are_skipped() {
        let lines = vec![
            line(1, "Flour", Decimal::ZERO, dec("10")),
            line(2, "Salt", dec("-1"), dec("10")),
        ];
        let forecast = predict_units(&bread(), &lines);
        assert_eq!(forecast.max_units, 0);
        assert_eq!(forecast.limit, ForecastLimit::InvalidMaterialAmounts);

        let lines = vec![
            line(1, "Flour", Decimal::ZERO, dec("10")),
            line(2, "Salt", dec("0.3"), dec("1")),
        ];
        assert_eq!(predict_units(&bread(), &lines).max_units, 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Forecast equals min(floor(stock / amount)) over valid lines
        #[test]
        fn prop_forecast_is_minimum_floor(
            lines in prop::collection::vec(
                ((-5i64..=500i64), (0i64..=100_000i64)),
                1..8
            )
        ) {
            let lines: Vec<RecipeLine> = lines
                .iter()
                .enumerate()
                .map(|(i, (amount, stock))| {
                    line(i as i64, "M", Decimal::new(*amount, 2), Decimal::new(*stock, 2))
                })
                .collect();

            let expected = lines
                .iter()
                .filter(|l| l.amount_per_unit > Decimal::ZERO)
                .map(|l| (l.current_stock / l.amount_per_unit).floor().to_i64().unwrap())
                .min()
                .unwrap_or(0);

            prop_assert_eq!(predict_units(&bread(), &lines).max_units, expected);
        }
    }
}
