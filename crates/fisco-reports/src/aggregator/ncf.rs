//! # NCF Sequence Control Aggregator
//!
//! Usage of every active fiscal sequence over the period, receipt
//! compliance (duplicates, malformed numbers) and the depletion estimate.
//!
//! ```text
//! list_active ──┐
//! totals_by(ncf_type) ──► used per sequence (joined in memory)
//!                                     │
//! receipts_in_range ──► check_receipts ──► assess ──┐
//! daily_totals.receipts ──► average_daily ──────────┼──► NcfReport
//!                              estimate_depletion ──┘
//! ```

use std::collections::HashMap;

use fisco_core::compliance::{assess, average_daily_consumption, check_receipts, estimate_depletion};
use fisco_core::recommend;
use fisco_core::report::{NcfReport, SequenceUsage};
use fisco_core::DateRange;
use fisco_db::{Database, DbResult, SaleDimension};
use tracing::debug;

pub async fn aggregate_ncf(db: &Database, range: &DateRange) -> DbResult<NcfReport> {
    let sales = db.sales();
    let ncf_sequences = db.ncf_sequences();

    let (sequences, usage_by_type, receipts, daily) = tokio::try_join!(
        ncf_sequences.list_active(),
        sales.totals_by(SaleDimension::NcfType, range),
        sales.receipts_in_range(range),
        sales.daily_totals(range),
    )?;

    let used_by_type: HashMap<&str, i64> = usage_by_type
        .iter()
        .map(|g| (g.key.as_str(), g.count))
        .collect();

    let usage: Vec<SequenceUsage> = sequences
        .iter()
        .map(|sequence| {
            let used = used_by_type.get(sequence.ncf_type.as_str()).copied().unwrap_or(0);
            SequenceUsage::new(sequence, used)
        })
        .collect();

    let check = check_receipts(receipts.iter().map(|r| r.as_deref()));
    let compliance = assess(&check, &sequences);

    let per_day: Vec<i64> = daily.iter().map(|d| d.receipts).filter(|n| *n > 0).collect();
    let depletion = estimate_depletion(&sequences, average_daily_consumption(&per_day));

    debug!(
        sequences = usage.len(),
        duplicates = check.duplicate_count,
        invalid = check.invalid_format_count,
        days_remaining = ?depletion.estimated_days_remaining,
        "NCF compliance computed"
    );

    let recommendations = recommend::for_ncf(&usage, &compliance, &depletion);

    Ok(NcfReport {
        period: *range,
        sequences: usage,
        usage_by_type,
        compliance,
        depletion,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fixtures::*;
    use fisco_core::compliance::{IssueKind, SequenceStatus};
    use fisco_core::report::Priority;
    use fisco_core::{FiscalSequence, NcfType};

    #[tokio::test]
    async fn test_nearly_exhausted_sequence() {
        let db = store().await;
        db.ncf_sequences()
            .upsert(&FiscalSequence::new(NcfType::B01, 9_950, 10_000, true).unwrap())
            .await
            .unwrap();
        db.ncf_sequences()
            .upsert(&FiscalSequence::new(NcfType::B02, 10, 50_000, true).unwrap())
            .await
            .unwrap();

        let mut b01 = sale("a", at(2024, 1, 10, 9), 1_000_00, 180_00);
        b01.ncf_type = NcfType::B01;
        b01.ncf = receipt(NcfType::B01, 9_950);
        db.sales().insert(&b01).await.unwrap();

        let report = aggregate_ncf(&db, &january()).await.unwrap();

        let b01 = &report.sequences[0];
        assert_eq!(b01.ncf_type, NcfType::B01);
        assert_eq!(b01.remaining, 50);
        assert_eq!(b01.status, SequenceStatus::Low);
        assert_eq!(b01.used, 1);
        assert!(b01.current <= b01.max);
        assert_eq!(report.sequences[1].used, 0);
        assert_eq!(report.sequences[1].status, SequenceStatus::Ok);

        assert!(report
            .compliance
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::LowSequence));
        // 50 left at 1 per day
        assert_eq!(report.depletion.limiting_type, Some(NcfType::B01));
        assert_eq!(report.depletion.estimated_days_remaining, Some(50.0));
        assert!(!report.depletion.urgent);
        assert_eq!(report.recommendations[0].priority, Priority::Urgent);
    }

    #[tokio::test]
    async fn test_duplicate_and_malformed_receipts() {
        let db = store().await;
        let receipts = [
            receipt(NcfType::B02, 1),
            receipt(NcfType::B02, 1),
            Some("B02-123".to_string()),
            None,
        ];
        for (i, ncf) in receipts.into_iter().enumerate() {
            let mut s = sale(&format!("s{i}"), at(2024, 1, 5, 8 + i as u32), 100_00, 18_00);
            s.ncf = ncf;
            db.sales().insert(&s).await.unwrap();
        }

        let report = aggregate_ncf(&db, &january()).await.unwrap();

        assert_eq!(report.compliance.total_sales, 4);
        assert_eq!(report.compliance.duplicate_count, 1);
        assert_eq!(report.compliance.invalid_format_count, 1);
        assert!((report.compliance.compliance_score - 50.0).abs() < 1e-9);
        assert!(report.sequences.is_empty());
        assert_eq!(report.depletion.estimated_days_remaining, None);
    }
}
