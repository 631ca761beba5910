//! # DGII Summary Report

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::insights::TaxVariance;
use crate::money::Money;
use crate::range::DateRange;
use crate::report::{GroupTotals, Recommendation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DgiiReport {
    pub period: DateRange,
    pub summary: DgiiSummary,
    pub by_ncf_type: Vec<GroupTotals>,
    pub variance: TaxVariance,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DgiiSummary {
    pub total_sales: i64,
    pub taxable_base: Money,
    pub total_tax: Money,
    pub total_amount: Money,
    pub with_ncf: i64,
    /// Percent of sales carrying a receipt number.
    pub ncf_coverage: f64,
    /// Sales to a customer with a well-formed RNC/Cédula.
    pub with_tax_id: i64,
    /// Percent of sales with a valid buyer tax id.
    pub tax_id_coverage: f64,
}

/// `part / total × 100`, or 0 without sales.
pub fn coverage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage() {
        assert_eq!(coverage(0, 0), 0.0);
        assert!((coverage(1, 4) - 25.0).abs() < 1e-9);
        assert!((coverage(4, 4) - 100.0).abs() < 1e-9);
    }
}
