//! # Report Error Types
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Report Request Failures                              │
//! │                                                                         │
//! │  Variant                  Cause                         Caller sees     │
//! │  ───────────────────────  ────────────────────────────  ─────────────   │
//! │  InvalidRange             from/to missing or inverted   4xx + message   │
//! │  UnsupportedReportType    unknown tag                   4xx + message   │
//! │  Aggregation(DbError)     store query failed            generic failure │
//! │                                                                         │
//! │  Nothing is retried here: every operation is a read, the caller may    │
//! │  simply re-issue the request.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use fisco_core::ValidationError;
use fisco_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for report generation.
pub type EngineResult<T> = Result<T, ReportError>;

/// Report generation failure.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Missing or inverted date range.
    #[error("Invalid date range: {0}")]
    InvalidRange(#[source] ValidationError),

    /// Tag outside the seven known report types.
    #[error("Unsupported report type: '{0}'")]
    UnsupportedReportType(String),

    /// The store facade failed; propagated unchanged.
    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] DbError),
}

/// Machine-readable error code for hosts that map errors to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad date range (400)
    InvalidRange,
    /// Unknown report type (400)
    UnsupportedReportType,
    /// Store failure (500)
    AggregationFailed,
}

impl ReportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReportError::InvalidRange(_) => ErrorCode::InvalidRange,
            ReportError::UnsupportedReportType(_) => ErrorCode::UnsupportedReportType,
            ReportError::Aggregation(_) => ErrorCode::AggregationFailed,
        }
    }

    /// Whether the request itself was wrong (4xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ReportError::Aggregation(_))
    }

    /// Message safe to show to an end user; store details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ReportError::Aggregation(_) => "No se pudo generar el reporte".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        let err = ReportError::InvalidRange(ValidationError::Required { field: "from".into() });
        assert!(err.is_client_error());
        assert_eq!(err.code(), ErrorCode::InvalidRange);

        let err = ReportError::Aggregation(DbError::PoolExhausted);
        assert!(!err.is_client_error());
        assert_eq!(err.user_message(), "No se pudo generar el reporte");
    }
}
