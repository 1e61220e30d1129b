//! Cost, profit and margin arithmetic

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Category, DailyProfitSummary, ItemProfitability, RecipeLine, SaleRecord};
use crate::types::{checked_product, Overflow};

/// Profit figures for `quantity` units sold at `unit_price`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProfitBreakdown {
    pub unit_price: Decimal,
    pub material_cost_per_unit: Decimal,
    pub profit_per_unit: Decimal,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub margin_percent: Decimal,
}

impl ProfitBreakdown {
    pub fn compute(
        unit_price: Decimal,
        material_cost_per_unit: Decimal,
        quantity: Decimal,
    ) -> Result<Self, Overflow> {
        let profit_per_unit = unit_price
            .checked_sub(material_cost_per_unit)
            .ok_or(Overflow("profit"))?;
        Ok(Self {
            unit_price,
            material_cost_per_unit,
            profit_per_unit,
            total_revenue: checked_product(unit_price, quantity, "revenue")?,
            total_cost: checked_product(material_cost_per_unit, quantity, "cost")?,
            total_profit: checked_product(profit_per_unit, quantity, "profit")?,
            margin_percent: margin_percent(profit_per_unit, unit_price),
        })
    }
}

/// Profit as a percentage of price; zero when there is no price or the
/// ratio is out of range
pub fn margin_percent(profit: Decimal, price: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    profit
        .checked_div(price)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Material cost of one unit: the sum of amount times cost over the recipe
pub fn material_cost_per_unit(lines: &[RecipeLine]) -> Result<Decimal, Overflow> {
    lines.iter().try_fold(Decimal::ZERO, |total, line| {
        total
            .checked_add(line.unit_cost()?)
            .ok_or(Overflow("material cost"))
    })
}

/// Profitability of one category at current prices and costs
pub fn item_profitability(
    category: &Category,
    lines: &[RecipeLine],
) -> Result<ItemProfitability, Overflow> {
    let material_cost = material_cost_per_unit(lines)?;
    let profit_per_unit = category
        .selling_price
        .checked_sub(material_cost)
        .ok_or(Overflow("profit"))?;

    Ok(ItemProfitability {
        category_id: category.id,
        name: category.name.clone(),
        selling_price: category.selling_price,
        material_cost,
        profit_per_unit,
        margin_percent: margin_percent(profit_per_unit, category.selling_price).round_dp(2),
    })
}

/// Most profitable first
pub fn sort_by_profit(items: &mut [ItemProfitability]) {
    items.sort_by(|a, b| {
        b.profit_per_unit
            .cmp(&a.profit_per_unit)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Aggregate sales per day, newest day first. Day totals saturate rather
/// than overflow.
pub fn summarize_daily<'a>(
    sales: impl IntoIterator<Item = &'a SaleRecord>,
) -> Vec<DailyProfitSummary> {
    let mut days: BTreeMap<NaiveDate, (i64, Decimal, Decimal, Decimal)> = BTreeMap::new();
    for sale in sales {
        let day = days
            .entry(sale.sale_date())
            .or_insert((0, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        day.0 += 1;
        day.1 = day.1.saturating_add(sale.total_revenue);
        day.2 = day.2.saturating_add(sale.total_cost);
        day.3 = day.3.saturating_add(sale.total_profit);
    }

    days.into_iter()
        .rev()
        .map(|(date, (count, revenue, cost, profit))| DailyProfitSummary {
            date,
            sales_count: count,
            total_revenue: revenue,
            total_cost: cost,
            total_profit: profit,
            margin_percent: margin_percent(profit, revenue).round_dp(2),
        })
        .collect()
}
