//! # DGII Summary Aggregator
//!
//! Filing-oriented totals: taxable base, ITBIS, receipt coverage and how
//! many sales identify the buyer with a valid RNC/Cédula.

use fisco_core::compliance::check_receipts;
use fisco_core::insights::TaxVariance;
use fisco_core::recommend;
use fisco_core::report::{coverage, DgiiReport, DgiiSummary};
use fisco_core::validation::validate_tax_id;
use fisco_core::DateRange;
use fisco_db::{Database, DbResult, SaleDimension};

pub async fn aggregate_dgii(db: &Database, range: &DateRange) -> DbResult<DgiiReport> {
    let sales = db.sales();

    let (totals, by_ncf_type, receipts, buyers) = tokio::try_join!(
        sales.totals(range),
        sales.totals_by(SaleDimension::NcfType, range),
        sales.receipts_in_range(range),
        sales.customer_sales(range, None),
    )?;

    let ids: Vec<String> = buyers.iter().map(|b| b.customer_id.clone()).collect();
    let directory = db.customers().by_ids(&ids).await?;

    let with_tax_id = buyers
        .iter()
        .filter(|b| {
            directory.get(&b.customer_id).is_some_and(|c| {
                c.tax_id
                    .as_deref()
                    .is_some_and(|id| validate_tax_id(c.class, id).is_ok())
            })
        })
        .map(|b| b.purchases)
        .sum::<i64>();

    let with_ncf = check_receipts(receipts.iter().map(|r| r.as_deref())).with_receipt;

    let summary = DgiiSummary {
        total_sales: totals.count,
        taxable_base: totals.subtotal,
        total_tax: totals.tax,
        total_amount: totals.total,
        with_ncf,
        ncf_coverage: coverage(with_ncf, totals.count),
        with_tax_id,
        tax_id_coverage: coverage(with_tax_id, totals.count),
    };

    let variance = TaxVariance::check(totals.subtotal, totals.tax);
    let recommendations = recommend::for_dgii(&summary, &variance);

    Ok(DgiiReport {
        period: *range,
        summary,
        by_ncf_type,
        variance,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fixtures::*;
    use fisco_core::{CustomerClass, Money, NcfType};

    #[tokio::test]
    async fn test_coverage_figures() {
        let db = store().await;
        db.customers()
            .insert(&customer("b1", "Distribuidora Caribe", CustomerClass::Business, Some("130123456")))
            .await
            .unwrap();
        db.customers()
            .insert(&customer("b2", "Sin Papeles SRL", CustomerClass::Business, Some("12")))
            .await
            .unwrap();

        let buyers = [Some("b1"), Some("b1"), Some("b2"), None];
        for (i, buyer) in buyers.into_iter().enumerate() {
            let mut s = sale(&format!("s{i}"), at(2024, 1, 8, 9 + i as u32), 1_000_00, 180_00);
            s.customer_id = buyer.map(Into::into);
            if i < 3 {
                s.ncf_type = NcfType::B01;
                s.ncf = receipt(NcfType::B01, i as i64 + 1);
            }
            db.sales().insert(&s).await.unwrap();
        }

        let report = aggregate_dgii(&db, &january()).await.unwrap();

        assert_eq!(report.summary.total_sales, 4);
        assert_eq!(report.summary.taxable_base, Money::from_cents(4_000_00));
        assert_eq!(report.summary.total_tax, Money::from_cents(720_00));
        assert_eq!(report.summary.with_ncf, 3);
        assert!((report.summary.ncf_coverage - 75.0).abs() < 1e-9);
        assert_eq!(report.summary.with_tax_id, 2);
        assert!((report.summary.tax_id_coverage - 50.0).abs() < 1e-9);
        assert!(report.variance.compliant);

        let keys: Vec<_> = report.by_ncf_type.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["B01", "B02"]);
    }

    #[tokio::test]
    async fn test_empty_period_has_zero_coverage() {
        let db = store().await;
        let report = aggregate_dgii(&db, &january()).await.unwrap();
        assert_eq!(report.summary.ncf_coverage, 0.0);
        assert_eq!(report.summary.tax_id_coverage, 0.0);
        assert!(report.recommendations.is_empty());
    }
}
