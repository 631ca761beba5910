//! # es-DO Number Formatting
//!
//! Dominican conventions: `,` groups thousands, `.` separates decimals,
//! currency always carries two decimals, dates are `dd/mm/yyyy`.
//!
//! ```text
//! Money(123456789)  → "1,234,567.89"
//! 1234              → "1,234"
//! 18.0              → "18.00%"
//! 2024-01-31        → "31/01/2024"
//! ```

use chrono::NaiveDate;
use fisco_core::{Money, ReportResult};

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// `1,234.56`, without a currency symbol.
pub fn format_amount(amount: Money) -> String {
    let sign = if amount.cents() < 0 { "-" } else { "" };
    let pesos = amount.pesos().unsigned_abs().to_string();
    format!("{}{}.{:02}", sign, group_thousands(&pesos), amount.cents_part().abs())
}

/// `RD$1,234.56`.
pub fn format_currency(amount: Money) -> String {
    let formatted = format_amount(amount);
    match formatted.strip_prefix('-') {
        Some(rest) => format!("-RD${rest}"),
        None => format!("RD${formatted}"),
    }
}

pub fn format_count(n: i64) -> String {
    let sign = if n < 0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(&n.unsigned_abs().to_string()))
}

/// Two decimals, grouped.
pub fn format_decimal(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, group_thousands(whole), fraction)
}

/// `18.00%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_decimal(value))
}

/// A `[0, 1]` ratio shown as a percent.
pub fn format_ratio(ratio: f64) -> String {
    format_percent(ratio * 100.0)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `01/01/2024 - 31/01/2024`, or `Al 15/03/2024` for the inventory snapshot.
pub fn period_label(report: &ReportResult) -> String {
    match (report, report.period()) {
        (_, Some(range)) => format!(
            "{} - {}",
            format_date(range.from_date()),
            format_date(range.to_date())
        ),
        (ReportResult::Inventory(r), None) => format!("Al {}", format_date(r.as_of)),
        (_, None) => String::new(),
    }
}

/// Inverse of [`format_amount`] / [`format_currency`].
pub fn parse_amount(text: &str) -> Option<Money> {
    let text = text.trim();
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits: String = text
        .trim_start_matches("RD$")
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let (whole, fraction) = digits.split_once('.')?;
    if fraction.len() != 2 {
        return None;
    }
    let cents = whole.parse::<i64>().ok()? * 100 + fraction.parse::<i64>().ok()?;
    Some(Money::from_cents(if negative { -cents } else { cents }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amounts() {
        assert_eq!(format_amount(Money::from_cents(0)), "0.00");
        assert_eq!(format_amount(Money::from_cents(5)), "0.05");
        assert_eq!(format_amount(Money::from_cents(123_456_789)), "1,234,567.89");
        assert_eq!(format_amount(Money::from_cents(-100_050)), "-1,000.50");
        assert_eq!(format_currency(Money::from_cents(300_000)), "RD$3,000.00");
        assert_eq!(format_currency(Money::from_cents(-1)), "-RD$0.01");
    }

    #[test]
    fn test_counts_and_percents() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(-12_345), "-12,345");
        assert_eq!(format_percent(18.0), "18.00%");
        assert_eq!(format_percent(1234.5), "1,234.50%");
        assert_eq!(format_ratio(0.755), "75.50%");
        assert_eq!(format_decimal(-0.001), "0.00");
    }

    #[test]
    fn test_date() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(format_date(d), "31/01/2024");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234,567.89"), Some(Money::from_cents(123_456_789)));
        assert_eq!(parse_amount("RD$3,000.00"), Some(Money::from_cents(300_000)));
        assert_eq!(parse_amount("-RD$0.01"), Some(Money::from_cents(-1)));
        assert_eq!(parse_amount("12"), None);
        assert_eq!(parse_amount("abc.de"), None);
    }
}
