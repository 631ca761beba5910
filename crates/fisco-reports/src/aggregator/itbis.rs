//! # ITBIS Aggregator
//!
//! Effective tax rate, tax shares per NCF type and payment method, a daily
//! series, its trend, and the 18 % variance check.

use fisco_core::insights::{effective_rate, rate_compliance, TaxVariance};
use fisco_core::recommend;
use fisco_core::report::{DailyTax, ItbisReport, ItbisSummary, TaxShare, TrendDirection};
use fisco_core::DateRange;
use fisco_db::{Database, DbResult, SaleDimension};

use crate::aggregator::{ncf_type_label, payment_label};

pub async fn aggregate_itbis(db: &Database, range: &DateRange) -> DbResult<ItbisReport> {
    let sales = db.sales();

    let (totals, by_ncf_type, by_method, daily) = tokio::try_join!(
        sales.totals(range),
        sales.totals_by(SaleDimension::NcfType, range),
        sales.totals_by(SaleDimension::PaymentMethod, range),
        sales.daily_totals(range),
    )?;

    let rate = effective_rate(totals.tax, totals.subtotal);
    let summary = ItbisSummary {
        transactions: totals.count,
        taxable_base: totals.subtotal,
        total_tax: totals.tax,
        total_with_tax: totals.total,
        effective_rate: rate,
        compliance_pct: rate_compliance(rate),
    };

    let by_ncf_type = by_ncf_type
        .iter()
        .map(|g| TaxShare::from_group(g, ncf_type_label(&g.key), totals.tax))
        .collect();
    let by_payment_method = by_method
        .iter()
        .map(|g| TaxShare::from_group(g, payment_label(&g.key), totals.tax))
        .collect();

    let daily: Vec<DailyTax> = daily
        .into_iter()
        .map(|d| DailyTax {
            date: d.date,
            transactions: d.count,
            taxable_base: d.subtotal,
            tax: d.tax,
        })
        .collect();

    let trend = TrendDirection::between(daily.first().map(|d| d.tax), daily.last().map(|d| d.tax));
    let variance = TaxVariance::check(totals.subtotal, totals.tax);
    let recommendations = recommend::for_itbis(&variance, trend);

    Ok(ItbisReport {
        period: *range,
        summary,
        by_ncf_type,
        by_payment_method,
        daily,
        trend,
        variance,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fixtures::*;
    use fisco_core::{Money, NcfType, PaymentMethod};

    #[tokio::test]
    async fn test_exact_itbis_is_compliant() {
        let db = store().await;
        db.sales().insert(&sale("a", at(2024, 1, 10, 9), 6_000_00, 1_080_00)).await.unwrap();
        let mut card = sale("b", at(2024, 1, 11, 9), 4_000_00, 720_00);
        card.payment_method = PaymentMethod::Card;
        card.ncf_type = NcfType::B01;
        db.sales().insert(&card).await.unwrap();

        let report = aggregate_itbis(&db, &january()).await.unwrap();

        assert_eq!(report.summary.taxable_base, Money::from_cents(10_000_00));
        assert_eq!(report.summary.total_tax, Money::from_cents(1_800_00));
        assert!((report.summary.effective_rate - 18.0).abs() < 1e-9);
        assert!((report.summary.compliance_pct - 100.0).abs() < 1e-9);
        assert!(report.variance.compliant);

        let share_sum: f64 = report.by_payment_method.iter().map(|s| s.percentage).sum();
        assert!((share_sum - 100.0).abs() < 1e-9);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.trend, TrendDirection::Decreasing);
    }

    #[tokio::test]
    async fn test_under_collected_itbis_is_flagged() {
        let db = store().await;
        db.sales().insert(&sale("a", at(2024, 1, 10, 9), 10_000_00, 1_600_00)).await.unwrap();

        let report = aggregate_itbis(&db, &january()).await.unwrap();

        assert!(!report.variance.compliant);
        assert_eq!(report.variance.expected, Money::from_cents(1_800_00));
        assert!(!report.recommendations.is_empty());
        assert_eq!(report.trend, TrendDirection::Stable);
    }

    #[tokio::test]
    async fn test_empty_period() {
        let db = store().await;
        let report = aggregate_itbis(&db, &january()).await.unwrap();
        assert_eq!(report.summary.transactions, 0);
        assert_eq!(report.summary.effective_rate, 0.0);
        assert!(report.daily.is_empty());
        assert!(report.variance.compliant);
    }
}
