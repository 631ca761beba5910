//! # Daily Sales Report

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::range::DateRange;
use crate::report::GroupTotals;
use crate::types::PaymentMethod;

/// How many products/customers the top lists keep.
pub const TOP_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySalesReport {
    pub period: DateRange,
    pub summary: SalesSummary,
    pub payments: PaymentBreakdown,
    pub by_ncf_type: Vec<GroupTotals>,
    pub top_products: Vec<TopProduct>,
    pub top_customers: Vec<TopCustomer>,
    /// 24 buckets, hour 0 through 23 (UTC).
    pub hourly: Vec<HourlyBucket>,
    pub stock_alerts: StockAlerts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub total_sales: i64,
    pub subtotal: Money,
    pub total_tax: Money,
    pub total_amount: Money,
    pub average_sale: Money,
}

/// Totals per payment method, with the four named totals spelled out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentBreakdown {
    pub total_cash: Money,
    pub total_card: Money,
    pub total_transfer: Money,
    pub total_credit: Money,
    pub by_method: Vec<GroupTotals>,
}

impl PaymentBreakdown {
    /// Builds the breakdown from grouped rows; methods absent from `rows` stay at zero.
    pub fn from_groups(rows: Vec<GroupTotals>) -> Self {
        let mut breakdown = PaymentBreakdown::default();
        for row in &rows {
            match row.key.parse::<PaymentMethod>() {
                Ok(PaymentMethod::Cash) => breakdown.total_cash += row.total,
                Ok(PaymentMethod::Card) => breakdown.total_card += row.total,
                Ok(PaymentMethod::Transfer) => breakdown.total_transfer += row.total,
                Ok(PaymentMethod::Credit) => breakdown.total_credit += row.total,
                Err(_) => {}
            }
        }
        breakdown.by_method = rows;
        breakdown
    }

    pub fn total(&self) -> Money {
        self.by_method.iter().map(|g| g.total).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub category: Option<String>,
    pub units_sold: i64,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopCustomer {
    pub customer_id: String,
    pub name: String,
    pub tax_id: Option<String>,
    pub purchases: i64,
    pub total_spent: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HourlyBucket {
    pub hour: u32,
    pub count: i64,
    pub total: Money,
}

impl HourlyBucket {
    /// Expands sparse `(hour, count, total)` rows into all 24 hours.
    pub fn fill_day(rows: &[(u32, i64, Money)]) -> Vec<HourlyBucket> {
        (0..24)
            .map(|hour| {
                let (count, total) = rows
                    .iter()
                    .find(|(h, _, _)| *h == hour)
                    .map(|(_, c, t)| (*c, *t))
                    .unwrap_or((0, Money::zero()));
                HourlyBucket { hour, count, total }
            })
            .collect()
    }
}

/// Stock alert counts over the trailing 30-day window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAlerts {
    /// stock == 0
    pub critical: i64,
    /// 0 < stock ≤ min_stock
    pub low: i64,
    /// In stock and selling, with under 7 days left.
    pub reorder_soon: i64,
    /// Nothing sold in 30 days and more than RD$1,000 at retail on hand.
    pub high_value_slow_moving: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(key: &str, total: i64) -> GroupTotals {
        GroupTotals {
            key: key.into(),
            count: 1,
            subtotal: Money::zero(),
            tax: Money::zero(),
            total: Money::from_cents(total),
        }
    }

    #[test]
    fn test_payment_breakdown_sums_named_totals() {
        let b = PaymentBreakdown::from_groups(vec![group("cash", 3000_00), group("card", 150_00)]);
        assert_eq!(b.total_cash, Money::from_cents(3000_00));
        assert_eq!(b.total_card, Money::from_cents(150_00));
        assert_eq!(b.total_credit, Money::zero());
        assert_eq!(b.total(), Money::from_cents(3150_00));
    }

    #[test]
    fn test_hourly_fill() {
        let buckets = HourlyBucket::fill_day(&[(9, 2, Money::from_cents(500)), (23, 1, Money::from_cents(100))]);
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[9].count, 2);
        assert_eq!(buckets[10].count, 0);
        assert_eq!(buckets[23].total, Money::from_cents(100));
    }
}
