//! # Business Insights
//!
//! Scores synthesized on top of aggregated figures: customer loyalty,
//! ITBIS variance, audit risk.
//!
//! ## Loyalty Score (0–100)
//! ```text
//! ┌────────────────┬───────────────────────────────────────┬──────┐
//! │ Component      │ Formula                               │ Cap  │
//! ├────────────────┼───────────────────────────────────────┼──────┤
//! │ frequency      │ purchases/day × 30 × 10               │  40  │
//! │ recency        │ 30 − days_since_last / 7              │  30  │
//! │ value          │ spent (RD$) / 1000 × 30               │  30  │
//! └────────────────┴───────────────────────────────────────┴──────┘
//! ```
//!
//! ## Risk Score (0–100)
//! Starts at 0, +20 when high-value sales (> 3× the period average) are
//! more than 5 % of all sales. The other audit signals add on top: cash
//! concentration +30, receipt compliance under 90 % +30, duplicated
//! receipts +20. Capped at 100.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::TaxRate;

// =============================================================================
// Loyalty
// =============================================================================

const FREQUENCY_CAP: f64 = 40.0;
const RECENCY_CAP: f64 = 30.0;
const VALUE_CAP: f64 = 30.0;
/// Pesos of spend that earn the full value component.
const VALUE_UNIT_PESOS: f64 = 1000.0;

/// A customer's purchases inside the report period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurchaseHistory {
    pub purchases: i64,
    pub total_spent: Money,
    /// Whole days between the last purchase and the end of the period.
    pub days_since_last: i64,
}

/// Loyalty score rounded to the nearest integer.
///
/// ## Example
/// ```rust
/// use fisco_core::insights::{loyalty_score, PurchaseHistory};
/// use fisco_core::money::Money;
///
/// let history = PurchaseHistory {
///     purchases: 5,
///     total_spent: Money::from_cents(6_000_00),
///     days_since_last: 3,
/// };
/// // 40 (capped) + 29.57 + 30 (capped) = 99.57
/// assert_eq!(loyalty_score(&history, 30), 100);
/// ```
pub fn loyalty_score(history: &PurchaseHistory, days_in_range: i64) -> u8 {
    if history.purchases <= 0 || days_in_range <= 0 {
        return 0;
    }

    let per_month = history.purchases as f64 / days_in_range as f64 * 30.0;
    let frequency = (per_month * 10.0).min(FREQUENCY_CAP);
    let recency = (RECENCY_CAP - history.days_since_last.max(0) as f64 / 7.0).max(0.0);
    let value = (history.total_spent.as_major() / VALUE_UNIT_PESOS * VALUE_CAP).clamp(0.0, VALUE_CAP);

    (frequency + recency + value).round().clamp(0.0, 100.0) as u8
}

/// Loyalty bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    Gold,
    Silver,
    Bronze,
    New,
}

impl LoyaltyTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => LoyaltyTier::Gold,
            50..=79 => LoyaltyTier::Silver,
            20..=49 => LoyaltyTier::Bronze,
            _ => LoyaltyTier::New,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoyaltyTier::Gold => "Oro",
            LoyaltyTier::Silver => "Plata",
            LoyaltyTier::Bronze => "Bronce",
            LoyaltyTier::New => "Nuevo",
        }
    }
}

// =============================================================================
// ITBIS
// =============================================================================

/// Largest variance (percent of expected) still considered compliant.
pub const VARIANCE_TOLERANCE_PCT: f64 = 0.01;

/// `tax / taxable_base × 100`, or 0 for an empty base.
pub fn effective_rate(tax: Money, taxable_base: Money) -> f64 {
    tax.percent_of(taxable_base)
}

/// `100 − |effective_rate − 18|`, clamped to `[0, 100]`.
pub fn rate_compliance(effective_rate: f64) -> f64 {
    let standard = TaxRate::ITBIS_STANDARD.percentage();
    (100.0 - (effective_rate - standard).abs()).clamp(0.0, 100.0)
}

/// Collected ITBIS compared with 18 % of the taxable base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxVariance {
    pub expected: Money,
    pub actual: Money,
    pub variance: Money,
    pub variance_pct: f64,
    pub compliant: bool,
}

impl TaxVariance {
    pub fn check(taxable_base: Money, actual: Money) -> Self {
        let expected = taxable_base.calculate_tax(TaxRate::ITBIS_STANDARD);
        let variance = (expected - actual).abs();
        let variance_pct = variance.percent_of(expected);

        TaxVariance {
            expected,
            actual,
            variance,
            variance_pct,
            compliant: variance_pct <= VARIANCE_TOLERANCE_PCT,
        }
    }
}

// =============================================================================
// Risk
// =============================================================================

/// A sale is high-value above this multiple of the period average.
pub const HIGH_VALUE_MULTIPLIER: i64 = 3;

/// Share of high-value sales (percent) above which risk goes up.
pub const HIGH_VALUE_SHARE_THRESHOLD: f64 = 5.0;

/// Cash share of revenue (percent) that flags payment-method risk.
pub const CASH_CONCENTRATION_THRESHOLD: f64 = 80.0;

/// Receipt compliance rate below which risk goes up.
pub const LOW_NCF_COMPLIANCE_RATE: f64 = 0.9;

const HIGH_VALUE_RISK_POINTS: u8 = 20;
const CASH_CONCENTRATION_RISK_POINTS: u8 = 30;
const LOW_COMPLIANCE_RISK_POINTS: u8 = 30;
const DUPLICATE_RECEIPT_RISK_POINTS: u8 = 20;

pub fn is_high_value(total: Money, period_average: Money) -> bool {
    period_average.is_positive() && total > period_average * HIGH_VALUE_MULTIPLIER
}

/// Audit risk bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => RiskLevel::Low,
            30..=59 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Bajo",
            RiskLevel::Medium => "Medio",
            RiskLevel::High => "Alto",
        }
    }
}

/// Risk score for an audit period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RiskAssessment {
    pub score: u8,
    pub level: RiskLevel,
    /// High-value sales as a percent of all sales.
    pub high_value_share: f64,
}

/// Period signals the audit risk score is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskSignals {
    pub high_value_count: i64,
    pub total_count: i64,
    /// Cash share of revenue is above [`CASH_CONCENTRATION_THRESHOLD`].
    pub cash_concentrated: bool,
    /// Sales with a valid receipt over all sales, in `[0, 1]`.
    pub ncf_compliance_rate: f64,
    pub duplicate_receipts: i64,
}

impl RiskAssessment {
    /// Scores a period.
    ///
    /// | Signal                               | Points |
    /// |--------------------------------------|--------|
    /// | high-value sales above 5 % of sales  | 20     |
    /// | cash above 80 % of revenue           | 30     |
    /// | receipt compliance below 90 %        | 30     |
    /// | any duplicated receipt               | 20     |
    ///
    /// The sum is capped at 100. A period without sales scores 0.
    pub fn evaluate(signals: &RiskSignals) -> Self {
        let total_count = signals.total_count;
        if total_count <= 0 {
            return RiskAssessment {
                score: 0,
                level: RiskLevel::Low,
                high_value_share: 0.0,
            };
        }

        let high_value_share = signals.high_value_count as f64 / total_count as f64 * 100.0;

        let mut score: u8 = 0;
        // integer form of `share > 5 %` so the boundary is exact
        if signals.high_value_count * 100 > total_count * HIGH_VALUE_SHARE_THRESHOLD as i64 {
            score = score.saturating_add(HIGH_VALUE_RISK_POINTS);
        }
        if signals.cash_concentrated {
            score = score.saturating_add(CASH_CONCENTRATION_RISK_POINTS);
        }
        if signals.ncf_compliance_rate < LOW_NCF_COMPLIANCE_RATE {
            score = score.saturating_add(LOW_COMPLIANCE_RISK_POINTS);
        }
        if signals.duplicate_receipts > 0 {
            score = score.saturating_add(DUPLICATE_RECEIPT_RISK_POINTS);
        }
        let score = score.min(100);

        RiskAssessment {
            score,
            level: RiskLevel::from_score(score),
            high_value_share,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn history(purchases: i64, cents: i64, days_since_last: i64) -> PurchaseHistory {
        PurchaseHistory {
            purchases,
            total_spent: Money::from_cents(cents),
            days_since_last,
        }
    }

    #[test]
    fn test_loyalty_scenario() {
        assert_eq!(loyalty_score(&history(5, 6_000_00, 3), 30), 100);
    }

    #[test]
    fn test_loyalty_empty_history_is_zero() {
        assert_eq!(loyalty_score(&history(0, 0, 0), 30), 0);
    }

    #[test]
    fn test_loyalty_components() {
        // 1 purchase in 30 days → 10; 70 days ago → 20; RD$500 → 15
        assert_eq!(loyalty_score(&history(1, 500_00, 70), 30), 45);
        // Recency floors at zero
        assert_eq!(loyalty_score(&history(1, 0, 400), 30), 10);
    }

    #[test]
    fn test_loyalty_always_in_bounds() {
        for purchases in [1, 3, 50, 10_000] {
            for cents in [0, 1, 99_999_999_99] {
                for days in [0, 7, 365, 10_000] {
                    for range in [1, 30, 365] {
                        let score = loyalty_score(&history(purchases, cents, days), range);
                        assert!(score <= 100);
                    }
                }
            }
        }
    }

    #[test]
    fn test_tiers() {
        assert_eq!(LoyaltyTier::from_score(100), LoyaltyTier::Gold);
        assert_eq!(LoyaltyTier::from_score(80), LoyaltyTier::Gold);
        assert_eq!(LoyaltyTier::from_score(50), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::from_score(20), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::from_score(19), LoyaltyTier::New);
    }

    #[test]
    fn test_exact_itbis_is_compliant() {
        let v = TaxVariance::check(Money::from_cents(10_000_00), Money::from_cents(1_800_00));
        assert!(v.compliant);
        assert_eq!(v.variance, Money::zero());
        assert!((effective_rate(v.actual, Money::from_cents(10_000_00)) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_variance_over_tolerance_is_flagged() {
        // 1 peso off RD$1,800 is 0.055 %
        let v = TaxVariance::check(Money::from_cents(10_000_00), Money::from_cents(1_799_00));
        assert!(!v.compliant);
        assert!(v.variance_pct > VARIANCE_TOLERANCE_PCT);
    }

    #[test]
    fn test_variance_with_empty_base() {
        let v = TaxVariance::check(Money::zero(), Money::zero());
        assert_eq!(v.variance_pct, 0.0);
        assert!(v.compliant);
    }

    #[test]
    fn test_rate_compliance() {
        assert_eq!(rate_compliance(18.0), 100.0);
        assert!((rate_compliance(16.5) - 98.5).abs() < 1e-9);
        assert_eq!(rate_compliance(500.0), 0.0);
    }

    fn signals(high_value_count: i64, total_count: i64) -> RiskSignals {
        RiskSignals {
            high_value_count,
            total_count,
            ncf_compliance_rate: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_risk_score() {
        let quiet = RiskAssessment::evaluate(&signals(0, 100));
        assert_eq!(quiet.score, 0);
        assert_eq!(quiet.level, RiskLevel::Low);

        let noisy = RiskAssessment::evaluate(&signals(6, 100));
        assert_eq!(noisy.score, 20);
        assert_eq!(noisy.level, RiskLevel::Low);

        assert_eq!(RiskAssessment::evaluate(&signals(5, 100)).score, 0);
        assert_eq!(RiskAssessment::evaluate(&signals(0, 0)).score, 0);
    }

    #[test]
    fn test_risk_reaches_medium_and_high() {
        let cash_heavy = RiskAssessment::evaluate(&RiskSignals {
            cash_concentrated: true,
            ..signals(6, 100)
        });
        assert_eq!(cash_heavy.score, 50);
        assert_eq!(cash_heavy.level, RiskLevel::Medium);

        let everything = RiskAssessment::evaluate(&RiskSignals {
            high_value_count: 100,
            total_count: 100,
            cash_concentrated: true,
            ncf_compliance_rate: 0.5,
            duplicate_receipts: 3,
        });
        assert_eq!(everything.score, 100);
        assert_eq!(everything.level, RiskLevel::High);
        assert!((everything.high_value_share - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_compliance_alone_is_medium() {
        let risk = RiskAssessment::evaluate(&RiskSignals {
            ncf_compliance_rate: 0.89,
            ..signals(0, 100)
        });
        assert_eq!(risk.score, 30);
        assert_eq!(risk.level, RiskLevel::Medium);
    }

    #[test]
    fn test_high_value() {
        let avg = Money::from_cents(1_000_00);
        assert!(is_high_value(Money::from_cents(3_000_01), avg));
        assert!(!is_high_value(Money::from_cents(3_000_00), avg));
        assert!(!is_high_value(Money::from_cents(1), Money::zero()));
    }
}
