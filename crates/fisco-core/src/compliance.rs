//! # NCF Compliance
//!
//! Fiscal-receipt checks shared by the NCF, audit and DGII reports.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Receipt Compliance                                  │
//! │                                                                         │
//! │  sale receipts ──► check_receipts ──► ReceiptCheck                      │
//! │                     ├── seen-set      duplicate_count                   │
//! │                     └── NCF pattern   invalid_format_count              │
//! │                                            │                            │
//! │  sequences ─────────────────────────┐      ▼                            │
//! │                                     ├──► assess ──► ComplianceSummary   │
//! │                                     │              score + issues       │
//! │  receipts per day ──► average ──────┴──► estimate_depletion             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thresholds
//! | Rule                      | Value         |
//! |---------------------------|---------------|
//! | Sequence status `low`     | remaining < 100 |
//! | Sequence status `warning` | remaining < 500 |
//! | Urgent renewal            | used > 90 %   |
//! | Plan renewal              | used > 80 %   |
//! | Urgent depletion          | 0 < days < 30 |

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::types::{FiscalSequence, NcfType};
use crate::validation::is_valid_ncf;

/// Below this many remaining numbers a sequence is `low`.
pub const LOW_REMAINING_THRESHOLD: i64 = 100;

/// Below this many remaining numbers a sequence is `warning`.
pub const WARNING_REMAINING_THRESHOLD: i64 = 500;

/// Usage percentage above which renewal is urgent.
pub const URGENT_USAGE_PERCENTAGE: f64 = 90.0;

/// Usage percentage above which renewal should be planned.
pub const PLAN_RENEWAL_USAGE_PERCENTAGE: f64 = 80.0;

/// Depletion estimates under this many days need urgent action.
pub const URGENT_DEPLETION_DAYS: f64 = 30.0;

// =============================================================================
// Sequence Status
// =============================================================================

/// Stock level of a fiscal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStatus {
    Low,
    Warning,
    Ok,
}

impl SequenceStatus {
    pub fn for_remaining(remaining: i64) -> Self {
        if remaining < LOW_REMAINING_THRESHOLD {
            SequenceStatus::Low
        } else if remaining < WARNING_REMAINING_THRESHOLD {
            SequenceStatus::Warning
        } else {
            SequenceStatus::Ok
        }
    }

    pub fn of(sequence: &FiscalSequence) -> Self {
        Self::for_remaining(sequence.remaining())
    }

    pub fn label(&self) -> &'static str {
        match self {
            SequenceStatus::Low => "Bajo",
            SequenceStatus::Warning => "Advertencia",
            SequenceStatus::Ok => "Normal",
        }
    }
}

/// Renewal urgency of a fiscal sequence, from its usage percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RenewalUrgency {
    Urgent,
    PlanRenewal,
    None,
}

impl RenewalUrgency {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage > URGENT_USAGE_PERCENTAGE {
            RenewalUrgency::Urgent
        } else if percentage > PLAN_RENEWAL_USAGE_PERCENTAGE {
            RenewalUrgency::PlanRenewal
        } else {
            RenewalUrgency::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RenewalUrgency::Urgent => "Renovar ya",
            RenewalUrgency::PlanRenewal => "Planificar renovación",
            RenewalUrgency::None => "-",
        }
    }
}

// =============================================================================
// Receipt Checks
// =============================================================================

/// Duplicate and format findings over the receipts of a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptCheck {
    /// Every sale in the period, with or without a receipt.
    pub total_sales: i64,
    pub with_receipt: i64,
    /// Each repeat occurrence counts once (three copies = 2 duplicates).
    pub duplicate_count: i64,
    pub invalid_format_count: i64,
    /// Present, first occurrence and well formed.
    pub valid_count: i64,
    /// Distinct receipt numbers seen more than once, in first-repeat order.
    pub duplicated_receipts: Vec<String>,
    pub invalid_receipts: Vec<String>,
}

/// Scans the receipt numbers of a period.
///
/// `None` and blank receipts count toward `total_sales` but are neither
/// format-checked nor considered for duplicates.
pub fn check_receipts<'a, I>(receipts: I) -> ReceiptCheck
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut check = ReceiptCheck::default();
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut reported: HashSet<&'a str> = HashSet::new();

    for receipt in receipts {
        check.total_sales += 1;

        let Some(ncf) = receipt.filter(|n| !n.trim().is_empty()) else {
            continue;
        };
        check.with_receipt += 1;

        let first = seen.insert(ncf);
        if !first {
            check.duplicate_count += 1;
            if reported.insert(ncf) {
                check.duplicated_receipts.push(ncf.to_string());
            }
        }

        let well_formed = is_valid_ncf(ncf);
        if !well_formed {
            check.invalid_format_count += 1;
            check.invalid_receipts.push(ncf.to_string());
        }

        if first && well_formed {
            check.valid_count += 1;
        }
    }

    check
}

/// `100 − violations / total_sales × 100`, clamped to `[0, 100]`.
///
/// A period without sales has nothing to violate and scores 100.
pub fn compliance_score(total_sales: i64, duplicate_count: i64, invalid_format_count: i64) -> f64 {
    if total_sales <= 0 {
        return 100.0;
    }
    let violations = (duplicate_count + invalid_format_count) as f64;
    (100.0 - violations / total_sales as f64 * 100.0).clamp(0.0, 100.0)
}

// =============================================================================
// Issues
// =============================================================================

/// Kind of compliance finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateReceipt,
    InvalidFormat,
    LowSequence,
}

/// One entry in the compliance issue list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComplianceIssue {
    pub kind: IssueKind,
    pub message: String,
}

/// Score plus issue list for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComplianceSummary {
    pub total_sales: i64,
    pub duplicate_count: i64,
    pub invalid_format_count: i64,
    pub compliance_score: f64,
    pub issues: Vec<ComplianceIssue>,
}

/// Combines receipt findings with the state of the active sequences.
pub fn assess(check: &ReceiptCheck, sequences: &[FiscalSequence]) -> ComplianceSummary {
    let mut issues = Vec::new();

    if check.duplicate_count > 0 {
        issues.push(ComplianceIssue {
            kind: IssueKind::DuplicateReceipt,
            message: format!(
                "{} NCF duplicado(s): {}",
                check.duplicate_count,
                check.duplicated_receipts.join(", ")
            ),
        });
    }

    if check.invalid_format_count > 0 {
        issues.push(ComplianceIssue {
            kind: IssueKind::InvalidFormat,
            message: format!("{} NCF con formato inválido", check.invalid_format_count),
        });
    }

    for sequence in sequences
        .iter()
        .filter(|s| s.remaining() < LOW_REMAINING_THRESHOLD)
    {
        issues.push(ComplianceIssue {
            kind: IssueKind::LowSequence,
            message: format!(
                "Secuencia {} con solo {} comprobantes disponibles",
                sequence.ncf_type,
                sequence.remaining()
            ),
        });
    }

    ComplianceSummary {
        total_sales: check.total_sales,
        duplicate_count: check.duplicate_count,
        invalid_format_count: check.invalid_format_count,
        compliance_score: compliance_score(
            check.total_sales,
            check.duplicate_count,
            check.invalid_format_count,
        ),
        issues,
    }
}

// =============================================================================
// Depletion
// =============================================================================

/// How long the scarcest sequence lasts at the current issuing pace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DepletionEstimate {
    pub average_daily_consumption: f64,
    /// `None` when no sequence is under the warning threshold or nothing was issued.
    pub estimated_days_remaining: Option<f64>,
    /// The sequence the estimate comes from.
    pub limiting_type: Option<NcfType>,
    pub urgent: bool,
}

/// Mean receipts issued per day, over the days that issued any.
pub fn average_daily_consumption(receipts_per_day: &[i64]) -> f64 {
    if receipts_per_day.is_empty() {
        return 0.0;
    }
    receipts_per_day.iter().sum::<i64>() as f64 / receipts_per_day.len() as f64
}

/// `min(remaining / average)` over sequences below the warning threshold.
pub fn estimate_depletion(sequences: &[FiscalSequence], average_daily: f64) -> DepletionEstimate {
    let limiting = if average_daily > 0.0 {
        sequences
            .iter()
            .filter(|s| s.remaining() < WARNING_REMAINING_THRESHOLD)
            .map(|s| (s.ncf_type, s.remaining() as f64 / average_daily))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    } else {
        None
    };

    let days = limiting.map(|(_, d)| d);
    DepletionEstimate {
        average_daily_consumption: average_daily,
        estimated_days_remaining: days,
        limiting_type: limiting.map(|(t, _)| t),
        urgent: days.is_some_and(|d| d > 0.0 && d < URGENT_DEPLETION_DAYS),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(ncf_type: NcfType, current: i64, max: i64) -> FiscalSequence {
        FiscalSequence::new(ncf_type, current, max, true).unwrap()
    }

    #[test]
    fn test_sequence_status_thresholds() {
        let b01 = seq(NcfType::B01, 9950, 10000);
        assert_eq!(b01.remaining(), 50);
        assert_eq!(SequenceStatus::of(&b01), SequenceStatus::Low);
        assert_eq!(SequenceStatus::for_remaining(100), SequenceStatus::Warning);
        assert_eq!(SequenceStatus::for_remaining(499), SequenceStatus::Warning);
        assert_eq!(SequenceStatus::for_remaining(500), SequenceStatus::Ok);
    }

    #[test]
    fn test_renewal_urgency() {
        assert_eq!(RenewalUrgency::for_percentage(99.5), RenewalUrgency::Urgent);
        assert_eq!(RenewalUrgency::for_percentage(90.0), RenewalUrgency::PlanRenewal);
        assert_eq!(RenewalUrgency::for_percentage(80.0), RenewalUrgency::None);
    }

    #[test]
    fn test_duplicates_and_formats() {
        let receipts = [
            Some("B0100000001"),
            Some("B0100000001"),
            Some("B0100000001"),
            Some("B02-0000001"),
            None,
            Some("B0200000002"),
        ];
        let check = check_receipts(receipts.iter().copied());
        assert_eq!(check.total_sales, 6);
        assert_eq!(check.with_receipt, 5);
        assert_eq!(check.duplicate_count, 2);
        assert_eq!(check.duplicated_receipts, vec!["B0100000001".to_string()]);
        assert_eq!(check.invalid_format_count, 1);
        assert_eq!(check.valid_count, 2);

        let score = compliance_score(check.total_sales, 2, 1);
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_malformed_receipt_counts_once_against_valid() {
        let check = check_receipts([Some("X-1"), Some("X-1"), Some("B0100000001")]);
        assert_eq!(check.with_receipt, 3);
        assert_eq!(check.duplicate_count, 1);
        assert_eq!(check.invalid_format_count, 2);
        assert_eq!(check.valid_count, 1);
    }

    #[test]
    fn test_score_clamped_and_empty() {
        assert_eq!(compliance_score(0, 0, 0), 100.0);
        assert_eq!(compliance_score(1, 3, 3), 0.0);
    }

    #[test]
    fn test_low_sequence_adds_issue() {
        let check = check_receipts(std::iter::empty());
        let summary = assess(&check, &[seq(NcfType::B01, 9950, 10000), seq(NcfType::B02, 0, 10000)]);
        assert_eq!(summary.issues.len(), 1);
        assert_eq!(summary.issues[0].kind, IssueKind::LowSequence);
        assert_eq!(summary.compliance_score, 100.0);
    }

    #[test]
    fn test_depletion_estimate() {
        let avg = average_daily_consumption(&[10, 20, 30]);
        assert!((avg - 20.0).abs() < 1e-9);

        let sequences = [seq(NcfType::B01, 9700, 10000), seq(NcfType::B02, 9600, 10000)];
        let estimate = estimate_depletion(&sequences, avg);
        assert_eq!(estimate.estimated_days_remaining, Some(15.0));
        assert_eq!(estimate.limiting_type, Some(NcfType::B01));
        assert!(estimate.urgent);

        let idle = estimate_depletion(&sequences, 0.0);
        assert_eq!(idle.estimated_days_remaining, None);
        assert!(!idle.urgent);

        let healthy = estimate_depletion(&[seq(NcfType::B01, 0, 10000)], avg);
        assert_eq!(healthy.estimated_days_remaining, None);
    }
}
