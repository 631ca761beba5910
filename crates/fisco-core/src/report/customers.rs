//! # Customers Report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::insights::LoyaltyTier;
use crate::money::Money;
use crate::range::DateRange;
use crate::report::Recommendation;
use crate::types::{CustomerClass, PaymentMethod};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomersReport {
    pub period: DateRange,
    pub summary: CustomerSummary,
    pub segments: Vec<CustomerSegment>,
    /// Active customers, highest spend first.
    pub customers: Vec<CustomerInsight>,
    pub category_preferences: Vec<CategoryPreference>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerSummary {
    pub total_customers: i64,
    /// Customers with at least one purchase in the period.
    pub active_customers: i64,
    /// `active / total`, a ratio in `[0, 1]`.
    pub retention_rate: f64,
    pub total_revenue: Money,
    pub average_spend: Money,
    /// Customers whose tax id matches the format of their class.
    pub valid_tax_ids: i64,
}

/// Totals for one customer class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerSegment {
    pub class: CustomerClass,
    pub label: String,
    pub customers: i64,
    pub active: i64,
    pub purchases: i64,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInsight {
    pub customer_id: String,
    pub name: String,
    pub class: CustomerClass,
    pub tax_id: Option<String>,
    pub tax_id_valid: bool,
    pub purchases: i64,
    pub total_spent: Money,
    pub average_ticket: Money,
    #[ts(as = "Option<String>")]
    pub last_purchase: Option<DateTime<Utc>>,
    pub days_since_last: Option<i64>,
    pub preferred_payment: Option<PaymentMethod>,
    pub loyalty_score: u8,
    pub tier: LoyaltyTier,
}

/// Units and revenue per category, split by customer class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryPreference {
    pub category: String,
    pub business_units: i64,
    pub business_revenue: Money,
    pub individual_units: i64,
    pub individual_revenue: Money,
}

impl CategoryPreference {
    pub fn new(category: impl Into<String>) -> Self {
        CategoryPreference {
            category: category.into(),
            business_units: 0,
            business_revenue: Money::zero(),
            individual_units: 0,
            individual_revenue: Money::zero(),
        }
    }

    pub fn add(&mut self, class: CustomerClass, units: i64, revenue: Money) {
        match class {
            CustomerClass::Business => {
                self.business_units += units;
                self.business_revenue += revenue;
            }
            CustomerClass::Individual => {
                self.individual_units += units;
                self.individual_revenue += revenue;
            }
        }
    }

    pub fn total_revenue(&self) -> Money {
        self.business_revenue + self.individual_revenue
    }
}

/// `active / total`, or 0 when there are no customers.
pub fn retention_rate(active: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    active as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_rate() {
        assert_eq!(retention_rate(0, 0), 0.0);
        assert!((retention_rate(3, 4) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_category_preference_split() {
        let mut pref = CategoryPreference::new("Bebidas");
        pref.add(CustomerClass::Business, 10, Money::from_cents(1000));
        pref.add(CustomerClass::Individual, 2, Money::from_cents(300));
        pref.add(CustomerClass::Business, 1, Money::from_cents(100));
        assert_eq!(pref.business_units, 11);
        assert_eq!(pref.individual_revenue, Money::from_cents(300));
        assert_eq!(pref.total_revenue(), Money::from_cents(1400));
    }
}
