//! # fisco-core: Pure Domain Logic for the Fisco Reporting Engine
//!
//! This crate holds everything the reporting engine knows about DGII fiscal
//! rules and business insight, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fisco Reporting Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/reporter (CLI host)                     │   │
//! │  │    config ──► ReportEngine::generate ──► Exporter::export       │   │
//! │  └───────────────┬───────────────────────────────┬─────────────────┘   │
//! │                  │                               │                      │
//! │  ┌───────────────▼──────────────┐   ┌────────────▼─────────────────┐   │
//! │  │  fisco-reports               │   │  fisco-export                │   │
//! │  │  aggregators + orchestrator  │   │  PDF layout + CSV            │   │
//! │  └───────────────┬──────────────┘   └────────────┬─────────────────┘   │
//! │                  │                               │                      │
//! │  ┌───────────────▼───────────────────────────────▼─────────────────┐   │
//! │  │               ★ fisco-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌──────────────┐    │   │
//! │  │   │  types   │ │  money   │ │ compliance │ │   insights   │    │   │
//! │  │   │  Sale    │ │  Money   │ │ duplicates │ │   loyalty    │    │   │
//! │  │   │  NcfType │ │  TaxRate │ │ depletion  │ │   variance   │    │   │
//! │  │   └──────────┘ └──────────┘ └────────────┘ └──────────────┘    │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌────────────┐                     │   │
//! │  │   │  range   │ │validation│ │   report   │                     │   │
//! │  │   │DateRange │ │ NCF, RNC │ │ReportResult│                     │   │
//! │  │   └──────────┘ └──────────┘ └────────────┘                     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │                    fisco-db (Store Query Facade)                │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain snapshots (Sale, FiscalSequence, Customer, Product)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`range`] - End-inclusive report periods
//! - [`validation`] - NCF pattern, RNC/Cédula formats, date-range rules
//! - [`compliance`] - Duplicate/format checks, compliance score, depletion
//! - [`insights`] - Loyalty, ITBIS variance, audit risk
//! - [`recommend`] - Prioritized recommendations from insights
//! - [`report`] - `ReportType` and the `ReportResult` sum type
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in centavos (i64); floats only for ratios
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use fisco_core::insights::TaxVariance;
//! use fisco_core::money::Money;
//!
//! let base = Money::from_cents(10_000_00);   // RD$10,000.00
//! let itbis = Money::from_cents(1_800_00);   // RD$1,800.00
//!
//! let variance = TaxVariance::check(base, itbis);
//! assert!(variance.compliant);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod compliance;
pub mod error;
pub mod insights;
pub mod money;
pub mod range;
pub mod recommend;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use fisco_core::Money` instead of
// `use fisco_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use range::DateRange;
pub use report::{ReportResult, ReportType};
pub use types::*;

