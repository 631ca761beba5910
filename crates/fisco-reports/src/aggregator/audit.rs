//! # Audit Aggregator
//!
//! Cashier rollups, cash concentration, high-value transactions and the
//! period's risk score.
//!
//! ```text
//! totals ──────────────┐
//! by cashier ──────────┤
//! by payment method ───┼── try_join! ──► per-cashier rollup ──┐
//! sale snapshots ──────┘                 high-value scan ─────┼──► AuditReport
//!                                        check_receipts ──────┘
//! ```

use std::collections::HashMap;

use fisco_core::compliance::check_receipts;
use fisco_core::insights::{
    is_high_value, RiskAssessment, RiskSignals, CASH_CONCENTRATION_THRESHOLD,
};
use fisco_core::recommend;
use fisco_core::report::{AuditReport, AuditSummary, CashierPerformance, HighValueSale, PaymentRisk};
use fisco_core::{DateRange, Money, PaymentMethod, Sale};
use fisco_db::{Database, DbResult, SaleDimension};
use tracing::debug;

use crate::enrich::{EntityKeys, Lookups};

pub async fn aggregate_audit(db: &Database, range: &DateRange) -> DbResult<AuditReport> {
    let sales = db.sales();

    let (totals, by_cashier, by_method, snapshots) = tokio::try_join!(
        sales.totals(range),
        sales.totals_by(SaleDimension::Cashier, range),
        sales.totals_by(SaleDimension::PaymentMethod, range),
        sales.list_in_range(range),
    )?;

    let keys = EntityKeys::new().cashiers(by_cashier.iter().map(|g| g.key.as_str()));
    let lookups = Lookups::fetch(db, keys).await?;

    let check = check_receipts(snapshots.iter().map(|s| s.ncf.as_deref().map(str::trim)));
    let with_valid_ncf = check.valid_count;
    let summary = AuditSummary {
        total_transactions: totals.count,
        total_amount: totals.total,
        average_sale: totals.average(),
        with_valid_ncf,
        ncf_compliance_rate: if totals.count > 0 {
            with_valid_ncf as f64 / totals.count as f64
        } else {
            0.0
        },
        duplicate_ncf: check.duplicate_count,
    };

    let mut cash_by_cashier: HashMap<&str, Money> = HashMap::new();
    let mut missing_by_cashier: HashMap<&str, i64> = HashMap::new();
    for sale in &snapshots {
        if sale.payment_method == PaymentMethod::Cash {
            *cash_by_cashier.entry(sale.cashier_id.as_str()).or_default() += sale.total;
        }
        if !sale.has_ncf() {
            *missing_by_cashier.entry(sale.cashier_id.as_str()).or_default() += 1;
        }
    }

    let cashiers = by_cashier
        .iter()
        .map(|g| CashierPerformance {
            cashier_id: g.key.clone(),
            name: lookups.cashier_name(&g.key),
            transactions: g.count,
            total: g.total,
            average_sale: g.total.average_over(g.count),
            cash_total: cash_by_cashier.get(g.key.as_str()).copied().unwrap_or_default(),
            missing_ncf: missing_by_cashier.get(g.key.as_str()).copied().unwrap_or(0),
        })
        .collect();

    let cash_total = by_method
        .iter()
        .filter(|g| g.key == PaymentMethod::Cash.as_str())
        .map(|g| g.total)
        .sum::<Money>();
    let cash_percentage = cash_total.percent_of(totals.total);
    let payment_risk = PaymentRisk {
        by_method,
        cash_percentage,
        flagged: cash_percentage > CASH_CONCENTRATION_THRESHOLD,
    };

    let high_value = high_value_sales(&snapshots, summary.average_sale, &lookups);
    let risk = RiskAssessment::evaluate(&RiskSignals {
        high_value_count: high_value.len() as i64,
        total_count: totals.count,
        cash_concentrated: payment_risk.flagged,
        ncf_compliance_rate: summary.ncf_compliance_rate,
        duplicate_receipts: summary.duplicate_ncf,
    });
    debug!(
        high_value = high_value.len(),
        score = risk.score,
        cash_percentage,
        "Audit risk evaluated"
    );

    let recommendations = recommend::for_audit(&summary, &payment_risk, &risk, high_value.len());

    Ok(AuditReport {
        period: *range,
        summary,
        cashiers,
        payment_risk,
        high_value,
        risk,
        recommendations,
    })
}

/// Sales above 3× the period's average ticket, largest first.
fn high_value_sales(sales: &[Sale], average: Money, lookups: &Lookups) -> Vec<HighValueSale> {
    let mut flagged: Vec<HighValueSale> = sales
        .iter()
        .filter(|s| is_high_value(s.total, average))
        .map(|s| HighValueSale {
            sale_id: s.id.clone(),
            created_at: s.created_at,
            cashier: lookups.cashier_name(&s.cashier_id),
            total: s.total,
            ncf: s.ncf.clone(),
        })
        .collect();
    flagged.sort_by(|a, b| b.total.cmp(&a.total));
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fixtures::*;
    use fisco_core::insights::RiskLevel;
    use fisco_core::report::Priority;
    use fisco_core::{Cashier, NcfType};

    #[tokio::test]
    async fn test_high_value_and_cashier_rollup() {
        let db = store().await;
        db.cashiers()
            .insert(&Cashier { id: "u2".into(), name: "Luis Gómez".into() })
            .await
            .unwrap();

        // Ten RD$100 cash tickets from u1, the last one without a receipt.
        for i in 0..10 {
            let mut s = sale(&format!("s{i}"), at(2024, 1, 2 + i, 10), 100_00, 0);
            if i < 9 {
                s.ncf = receipt(NcfType::B02, i as i64 + 1);
            }
            db.sales().insert(&s).await.unwrap();
        }
        // One RD$5,000 card sale from u2.
        let mut big = sale("big", at(2024, 1, 20, 15), 5_000_00, 0);
        big.cashier_id = "u2".into();
        big.payment_method = PaymentMethod::Card;
        big.ncf = receipt(NcfType::B02, 10);
        db.sales().insert(&big).await.unwrap();

        let report = aggregate_audit(&db, &january()).await.unwrap();

        assert_eq!(report.summary.total_transactions, 11);
        assert_eq!(report.summary.with_valid_ncf, 10);
        assert!((report.summary.ncf_compliance_rate - 10.0 / 11.0).abs() < 1e-9);
        assert_eq!(report.summary.duplicate_ncf, 0);

        // Average RD$545.45: only the RD$5,000 sale is above 3×.
        assert_eq!(report.high_value.len(), 1);
        assert_eq!(report.high_value[0].sale_id, "big");
        assert_eq!(report.high_value[0].cashier, "Luis Gómez");
        // 1 of 11 is above 5 %
        assert_eq!(report.risk.score, 20);
        assert_eq!(report.risk.level, RiskLevel::Low);

        let ana = report.cashiers.iter().find(|c| c.cashier_id == "u1").unwrap();
        assert_eq!(ana.name, "Ana Martínez");
        assert_eq!(ana.transactions, 10);
        assert_eq!(ana.cash_total, Money::from_cents(1_000_00));
        assert_eq!(ana.missing_ncf, 1);

        assert!(!report.payment_risk.flagged);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.priority == Priority::High && r.message.contains("sin NCF")));
    }

    #[tokio::test]
    async fn test_cash_concentration_flagged() {
        let db = store().await;
        for i in 0..3 {
            let mut s = sale(&format!("s{i}"), at(2024, 1, 10, 9 + i), 1_000_00, 180_00);
            s.ncf = receipt(NcfType::B02, i as i64 + 1);
            db.sales().insert(&s).await.unwrap();
        }

        let report = aggregate_audit(&db, &january()).await.unwrap();

        assert!((report.payment_risk.cash_percentage - 100.0).abs() < 1e-9);
        assert!(report.payment_risk.flagged);
        assert!(report.high_value.is_empty());
        assert_eq!(report.risk.score, 30);
        assert_eq!(report.risk.level, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn test_repeated_malformed_receipt_keeps_valid_count() {
        let db = store().await;
        let mut valid = sale("ok", at(2024, 1, 5, 9), 100_00, 0);
        valid.ncf = receipt(NcfType::B02, 1);
        db.sales().insert(&valid).await.unwrap();
        for i in 0..2 {
            let mut bad = sale(&format!("bad{i}"), at(2024, 1, 6, 9 + i), 100_00, 0);
            bad.ncf = Some("X-1".into());
            db.sales().insert(&bad).await.unwrap();
        }

        let report = aggregate_audit(&db, &january()).await.unwrap();

        assert_eq!(report.summary.with_valid_ncf, 1);
        assert!((report.summary.ncf_compliance_rate - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.summary.duplicate_ncf, 1);
        // cash +30, compliance under 90 % +30, duplicate +20
        assert_eq!(report.risk.score, 80);
        assert_eq!(report.risk.level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_empty_period() {
        let db = store().await;
        let report = aggregate_audit(&db, &january()).await.unwrap();
        assert_eq!(report.summary.ncf_compliance_rate, 0.0);
        assert!(report.cashiers.is_empty());
        assert!(!report.payment_risk.flagged);
        assert_eq!(report.risk.level, RiskLevel::Low);
    }
}
