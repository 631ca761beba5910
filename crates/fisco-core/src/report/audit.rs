//! # Audit Report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::insights::RiskAssessment;
use crate::money::Money;
use crate::range::DateRange;
use crate::report::{GroupTotals, Recommendation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditReport {
    pub period: DateRange,
    pub summary: AuditSummary,
    pub cashiers: Vec<CashierPerformance>,
    pub payment_risk: PaymentRisk,
    pub high_value: Vec<HighValueSale>,
    pub risk: RiskAssessment,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditSummary {
    pub total_transactions: i64,
    pub total_amount: Money,
    pub average_sale: Money,
    pub with_valid_ncf: i64,
    /// `with_valid_ncf / total_transactions`, a ratio in `[0, 1]`.
    pub ncf_compliance_rate: f64,
    pub duplicate_ncf: i64,
}

/// Per-cashier rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashierPerformance {
    pub cashier_id: String,
    pub name: String,
    pub transactions: i64,
    pub total: Money,
    pub average_sale: Money,
    pub cash_total: Money,
    /// Sales rung up without a receipt number.
    pub missing_ncf: i64,
}

/// Revenue split by payment method, with the cash-concentration flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRisk {
    pub by_method: Vec<GroupTotals>,
    pub cash_percentage: f64,
    /// Cash above 80 % of revenue.
    pub flagged: bool,
}

/// A sale above 3× the period's average ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HighValueSale {
    pub sale_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub cashier: String,
    pub total: Money,
    pub ncf: Option<String>,
}
