//! # fisco-db: Store Query Facade
//!
//! Read access to the point-of-sale store for the reporting engine. SQLite
//! through sqlx; every report query is a grouped aggregate or a batched
//! key-set lookup.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fisco Data Flow                                  │
//! │                                                                         │
//! │  ReportEngine::generate("itbis", from, to)   (fisco-reports)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     fisco-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo       │    │ 001_reporting│  │   │
//! │  │   │ WAL, FKs on   │    │ ProductRepo    │    │   _schema    │  │   │
//! │  │   │               │    │ NcfSequenceRepo│    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (see apps/reporter config)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening the store, repository accessors
//! - `migrations` - Embedded schema, applied on open
//! - [`error`] - Database error types
//! - [`repository`] - Aggregates and batched lookups
//! - [`seed`] - Demo data for a fresh store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fisco_db::{Database, DbConfig, SaleDimension};
//!
//! let db = Database::new(DbConfig::new("fisco.db")).await?;
//! let by_type = db.sales().totals_by(SaleDimension::NcfType, &range).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use seed::{seed_demo_data, SeedSummary};

pub use repository::{
    CashierRepository, CategoryClassSales, CategoryRepository, CustomerPaymentCount,
    CustomerRepository, CustomerSales, DailyTotals, HourlyTotals, NcfSequenceRepository,
    ProductRepository, ProductSales, SaleDimension, SaleRepository, SalesTotals,
};
