//! # Validation Module
//!
//! Format rules for DGII identifiers and report inputs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Report request (orchestrator)                                │
//! │  └── validate_date_range: both dates present, from ≤ to                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store boundary (fisco-db)                                    │
//! │  └── Sale::validate, FiscalSequence::new: domain contract              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Compliance scoring (THIS MODULE)                             │
//! │  ├── is_valid_ncf: receipt number format                               │
//! │  └── validate_tax_id: RNC / Cédula per customer class                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fisco_core::validation::{is_valid_ncf, validate_rnc};
//!
//! assert!(is_valid_ncf("B0100000001"));
//! assert!(validate_rnc("131-24567-8").is_ok());
//! ```

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;
use crate::range::DateRange;
use crate::types::CustomerClass;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// One uppercase series letter, two type digits, eight sequence digits.
static NCF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]{2}[0-9]{8}$").unwrap());

/// Length of an RNC (business tax id), digits only.
pub const RNC_DIGITS: usize = 9;

/// Length of a Cédula (individual tax id), digits only.
pub const CEDULA_DIGITS: usize = 11;

// =============================================================================
// NCF
// =============================================================================

/// Checks a receipt number against the NCF pattern (`B0100000001`).
///
/// ## Example
/// ```rust
/// use fisco_core::validation::is_valid_ncf;
///
/// assert!(is_valid_ncf("B0200001234"));
/// assert!(!is_valid_ncf("b0200001234"));   // lowercase series
/// assert!(!is_valid_ncf("B02-00001234"));  // separator
/// assert!(!is_valid_ncf("B020000123"));    // 7 sequence digits
/// ```
pub fn is_valid_ncf(ncf: &str) -> bool {
    NCF_PATTERN.is_match(ncf)
}

/// Same as [`is_valid_ncf`] but reports why.
pub fn validate_ncf(ncf: &str) -> ValidationResult<()> {
    if ncf.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "ncf".to_string(),
        });
    }

    if !is_valid_ncf(ncf) {
        return Err(ValidationError::InvalidFormat {
            field: "ncf".to_string(),
            reason: "expected one uppercase letter followed by 10 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Tax IDs
// =============================================================================

fn digits_only(value: &str) -> ValidationResult<String> {
    let cleaned: String = value.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(ValidationError::Required {
            field: "tax_id".to_string(),
        });
    }

    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "tax_id".to_string(),
            reason: "must contain only digits and dashes".to_string(),
        });
    }

    Ok(cleaned)
}

/// Validates an RNC: 9 digits, dashes ignored.
pub fn validate_rnc(rnc: &str) -> ValidationResult<()> {
    let digits = digits_only(rnc)?;
    if digits.len() != RNC_DIGITS {
        return Err(ValidationError::InvalidFormat {
            field: "rnc".to_string(),
            reason: format!("must have {} digits", RNC_DIGITS),
        });
    }
    Ok(())
}

/// Validates a Cédula: 11 digits, dashes ignored.
pub fn validate_cedula(cedula: &str) -> ValidationResult<()> {
    let digits = digits_only(cedula)?;
    if digits.len() != CEDULA_DIGITS {
        return Err(ValidationError::InvalidFormat {
            field: "cedula".to_string(),
            reason: format!("must have {} digits", CEDULA_DIGITS),
        });
    }
    Ok(())
}

/// Validates a tax id against the format its customer class requires.
pub fn validate_tax_id(class: CustomerClass, tax_id: &str) -> ValidationResult<()> {
    match class {
        CustomerClass::Business => validate_rnc(tax_id),
        CustomerClass::Individual => validate_cedula(tax_id),
    }
}

// =============================================================================
// Date Range
// =============================================================================

/// Validates a report period and normalizes it.
///
/// ## Rules
/// - Both `from` and `to` are required
/// - `from ≤ to`
/// - `to` is extended to 23:59:59.999 so range queries are end-inclusive
pub fn validate_date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> ValidationResult<DateRange> {
    let from = from.ok_or_else(|| ValidationError::Required {
        field: "from".to_string(),
    })?;
    let to = to.ok_or_else(|| ValidationError::Required {
        field: "to".to_string(),
    })?;

    DateRange::new(from, to)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ncf_format() {
        assert!(is_valid_ncf("B0100000001"));
        assert!(is_valid_ncf("E3100000001"));
        assert!(!is_valid_ncf(""));
        assert!(!is_valid_ncf("B01000000001")); // 9 sequence digits
        assert!(!is_valid_ncf("BB100000001"));
        assert!(!is_valid_ncf(" B0100000001"));
        assert!(validate_ncf("").is_err());
    }

    #[test]
    fn test_tax_ids() {
        assert!(validate_rnc("101010101").is_ok());
        assert!(validate_rnc("1-01-01010-1").is_ok());
        assert!(validate_rnc("10101010").is_err());
        assert!(validate_rnc("10101010A").is_err());

        assert!(validate_cedula("001-1234567-8").is_ok());
        assert!(validate_cedula("0011234567").is_err());

        assert!(validate_tax_id(CustomerClass::Business, "131245678").is_ok());
        assert!(validate_tax_id(CustomerClass::Individual, "131245678").is_err());
    }

    #[test]
    fn test_date_range_required() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(matches!(
            validate_date_range(None, d),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_date_range(d, None),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_date_range(d, d).is_ok());
    }
}
