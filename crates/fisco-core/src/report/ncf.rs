//! # NCF Sequence Control Report

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::compliance::{ComplianceSummary, DepletionEstimate, RenewalUrgency, SequenceStatus};
use crate::range::DateRange;
use crate::report::{GroupTotals, Recommendation};
use crate::types::{FiscalSequence, NcfType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NcfReport {
    pub period: DateRange,
    pub sequences: Vec<SequenceUsage>,
    pub usage_by_type: Vec<GroupTotals>,
    pub compliance: ComplianceSummary,
    pub depletion: DepletionEstimate,
    pub recommendations: Vec<Recommendation>,
}

/// One active sequence and how much of it the period consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SequenceUsage {
    pub ncf_type: NcfType,
    pub description: String,
    pub current: i64,
    pub max: i64,
    /// Sales of this type inside the period.
    pub used: i64,
    pub remaining: i64,
    pub percentage: f64,
    pub status: SequenceStatus,
    pub urgency: RenewalUrgency,
}

impl SequenceUsage {
    pub fn new(sequence: &FiscalSequence, used: i64) -> Self {
        let percentage = sequence.percentage_used();
        SequenceUsage {
            ncf_type: sequence.ncf_type,
            description: sequence.ncf_type.description().to_string(),
            current: sequence.current(),
            max: sequence.max(),
            used,
            remaining: sequence.remaining(),
            percentage,
            status: SequenceStatus::of(sequence),
            urgency: RenewalUrgency::for_percentage(percentage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_sequence_usage() {
        let seq = FiscalSequence::new(NcfType::B01, 9950, 10000, true).unwrap();
        let usage = SequenceUsage::new(&seq, 12);
        assert_eq!(usage.remaining, 50);
        assert_eq!(usage.status, SequenceStatus::Low);
        assert_eq!(usage.urgency, RenewalUrgency::Urgent);
        assert!(usage.current <= usage.max);
        assert_eq!(usage.current + usage.remaining, usage.max);
    }
}
