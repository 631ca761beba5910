//! # Report Payloads
//!
//! One strongly typed payload per report type, gathered in the closed
//! [`ReportResult`] sum type.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ ReportResult                                                         │
//! │  ├── DailySales(DailySalesReport)   sales.rs                         │
//! │  ├── Itbis(ItbisReport)             tax.rs                           │
//! │  ├── Ncf(NcfReport)                 ncf.rs                           │
//! │  ├── Inventory(InventoryReport)     inventory.rs                     │
//! │  ├── Customers(CustomersReport)     customers.rs                     │
//! │  ├── Audit(AuditReport)             audit.rs                         │
//! │  └── Dgii(DgiiReport)               dgii.rs                          │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Results are built fresh per request and never persisted.

pub mod audit;
pub mod customers;
pub mod dgii;
pub mod inventory;
pub mod ncf;
pub mod sales;
pub mod tax;

pub use audit::*;
pub use customers::*;
pub use dgii::*;
pub use inventory::*;
pub use ncf::*;
pub use sales::*;
pub use tax::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::range::DateRange;

// =============================================================================
// Report Type
// =============================================================================

/// The seven report types the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    DailySales,
    Itbis,
    Ncf,
    Inventory,
    Customers,
    Audit,
    Dgii,
}

/// Tag → report type lookup table.
const REPORT_TYPE_TABLE: [(&str, ReportType); 7] = [
    ("daily-sales", ReportType::DailySales),
    ("itbis", ReportType::Itbis),
    ("ncf", ReportType::Ncf),
    ("inventory", ReportType::Inventory),
    ("customers", ReportType::Customers),
    ("audit", ReportType::Audit),
    ("dgii", ReportType::Dgii),
];

impl ReportType {
    /// Every report type, in menu order.
    pub fn all() -> impl Iterator<Item = ReportType> {
        REPORT_TYPE_TABLE.iter().map(|(_, t)| *t)
    }

    /// The wire tag (`daily-sales`, `itbis`, ...), also used in export filenames.
    pub fn tag(&self) -> &'static str {
        REPORT_TYPE_TABLE
            .iter()
            .find(|(_, t)| t == self)
            .map(|(tag, _)| *tag)
            .unwrap_or("unknown")
    }

    /// Document title.
    pub fn title(&self) -> &'static str {
        match self {
            ReportType::DailySales => "Reporte de Ventas",
            ReportType::Itbis => "Reporte de ITBIS",
            ReportType::Ncf => "Control de Secuencias NCF",
            ReportType::Inventory => "Reporte de Inventario",
            ReportType::Customers => "Reporte de Clientes",
            ReportType::Audit => "Reporte de Auditoría",
            ReportType::Dgii => "Resumen DGII",
        }
    }

    /// Inventory is a point-in-time snapshot and ignores the date range.
    pub fn requires_range(&self) -> bool {
        !matches!(self, ReportType::Inventory)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ReportType {
    type Err = ValidationError;

    /// Case-insensitive; `_` and spaces are accepted in place of `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        REPORT_TYPE_TABLE
            .iter()
            .find(|(tag, _)| *tag == normalized)
            .map(|(_, t)| *t)
            .ok_or(ValidationError::NotAllowed {
                field: "report_type".to_string(),
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Report Result
// =============================================================================

/// The structured result of one report request.
///
/// Serialized as `{"type": "itbis", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ReportResult {
    DailySales(DailySalesReport),
    Itbis(ItbisReport),
    Ncf(NcfReport),
    Inventory(InventoryReport),
    Customers(CustomersReport),
    Audit(AuditReport),
    Dgii(DgiiReport),
}

impl ReportResult {
    pub fn report_type(&self) -> ReportType {
        match self {
            ReportResult::DailySales(_) => ReportType::DailySales,
            ReportResult::Itbis(_) => ReportType::Itbis,
            ReportResult::Ncf(_) => ReportType::Ncf,
            ReportResult::Inventory(_) => ReportType::Inventory,
            ReportResult::Customers(_) => ReportType::Customers,
            ReportResult::Audit(_) => ReportType::Audit,
            ReportResult::Dgii(_) => ReportType::Dgii,
        }
    }

    /// The period the report covers; `None` for the inventory snapshot.
    pub fn period(&self) -> Option<DateRange> {
        match self {
            ReportResult::DailySales(r) => Some(r.period),
            ReportResult::Itbis(r) => Some(r.period),
            ReportResult::Ncf(r) => Some(r.period),
            ReportResult::Inventory(_) => None,
            ReportResult::Customers(r) => Some(r.period),
            ReportResult::Audit(r) => Some(r.period),
            ReportResult::Dgii(r) => Some(r.period),
        }
    }

    /// Recommendations synthesized for this report (empty for daily sales).
    pub fn recommendations(&self) -> &[Recommendation] {
        match self {
            ReportResult::DailySales(_) => &[],
            ReportResult::Itbis(r) => &r.recommendations,
            ReportResult::Ncf(r) => &r.recommendations,
            ReportResult::Inventory(r) => &r.recommendations,
            ReportResult::Customers(r) => &r.recommendations,
            ReportResult::Audit(r) => &r.recommendations,
            ReportResult::Dgii(r) => &r.recommendations,
        }
    }
}

// =============================================================================
// Shared Building Blocks
// =============================================================================

/// Recommendation urgency, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Urgent => "Urgente",
            Priority::High => "Alta",
            Priority::Medium => "Media",
            Priority::Low => "Baja",
        }
    }
}

/// An actionable suggestion derived from report insights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
}

impl Recommendation {
    pub fn new(priority: Priority, message: impl Into<String>) -> Self {
        Recommendation {
            priority,
            message: message.into(),
        }
    }
}

/// Sorts recommendations most-urgent first, keeping insertion order within a priority.
pub fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by_key(|r| r.priority);
}

/// Direction of a series between its first and last point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Compares the first and last values; fewer than two points is stable.
    pub fn between(first: Option<Money>, last: Option<Money>) -> Self {
        match (first, last) {
            (Some(first), Some(last)) if last > first => TrendDirection::Increasing,
            (Some(first), Some(last)) if last < first => TrendDirection::Decreasing,
            _ => TrendDirection::Stable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "En aumento",
            TrendDirection::Decreasing => "En disminución",
            TrendDirection::Stable => "Estable",
        }
    }
}

/// Totals for one group-by key (payment method, NCF type, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupTotals {
    pub key: String,
    pub count: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}
