//! # ITBIS Report

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::insights::TaxVariance;
use crate::money::Money;
use crate::range::DateRange;
use crate::report::{GroupTotals, Recommendation, TrendDirection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItbisReport {
    pub period: DateRange,
    pub summary: ItbisSummary,
    pub by_ncf_type: Vec<TaxShare>,
    pub by_payment_method: Vec<TaxShare>,
    pub daily: Vec<DailyTax>,
    pub trend: TrendDirection,
    pub variance: TaxVariance,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItbisSummary {
    pub transactions: i64,
    pub taxable_base: Money,
    pub total_tax: Money,
    pub total_with_tax: Money,
    /// `total_tax / taxable_base × 100`.
    pub effective_rate: f64,
    /// `100 − |effective_rate − 18|`, in `[0, 100]`.
    pub compliance_pct: f64,
}

/// Tax collected under one key, with its share of the period's tax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxShare {
    pub key: String,
    pub label: String,
    pub transactions: i64,
    pub taxable_base: Money,
    pub tax: Money,
    pub percentage: f64,
}

impl TaxShare {
    pub fn from_group(group: &GroupTotals, label: impl Into<String>, total_tax: Money) -> Self {
        TaxShare {
            key: group.key.clone(),
            label: label.into(),
            transactions: group.count,
            taxable_base: group.subtotal,
            tax: group.tax,
            percentage: group.tax.percent_of(total_tax),
        }
    }
}

/// One calendar day of the tax trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyTax {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub transactions: i64,
    pub taxable_base: Money,
    pub tax: Money,
}
