//! # Error Types
//!
//! Domain-specific error types for fisco-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fisco-core errors (this file)                                         │
//! │  ├── CoreError        - Store snapshots that break the domain contract │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  fisco-db errors       └── DbError      - Store facade failures        │
//! │  fisco-reports errors  └── ReportError  - What the caller sees         │
//! │  fisco-export errors   └── RenderError  - Rendering failures           │
//! │                                                                         │
//! │  Flow: ValidationError → ReportError::InvalidRange                     │
//! │        CoreError → DbError::InvalidData → ReportError::Aggregation     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// A snapshot fetched from the store violates a domain invariant.
///
/// The store contract is validated once, where rows become domain types,
/// so aggregation math never has to second-guess its inputs.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `total != subtotal + tax` beyond one centavo.
    #[error("Sale {sale_id}: total {total} does not match subtotal {subtotal} + tax {tax}")]
    TotalMismatch {
        sale_id: String,
        subtotal: i64,
        tax: i64,
        total: i64,
    },

    /// A line item with a non-positive quantity.
    #[error("Sale {sale_id}: line item for product {product_id} has non-positive quantity")]
    InvalidLineItem { sale_id: String, product_id: String },

    /// Fiscal sequence counter outside `0..=max`.
    #[error("NCF sequence {ncf_type}: counter {current} outside 0..={max}")]
    SequenceOutOfBounds {
        ncf_type: String,
        current: i64,
        max: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g. malformed NCF, RNC with letters, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field}: '{value}' is not an allowed value")]
    NotAllowed { field: String, value: String },

    /// `from` is after `to`.
    #[error("date range is inverted: {from} is after {to}")]
    InvertedRange { from: String, to: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
