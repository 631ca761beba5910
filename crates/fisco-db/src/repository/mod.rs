//! # Repository Module
//!
//! The Store Query Facade: group/filter/aggregate primitives over the
//! reporting tables.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store Query Facade                                   │
//! │                                                                         │
//! │  Aggregator (fisco-reports)                                            │
//! │       │                                                                 │
//! │       │  db.sales().totals_by(SaleDimension::NcfType, &range)          │
//! │       │  db.products().by_ids(&keys)                                   │
//! │       ▼                                                                 │
//! │  SaleRepository            grouped sums/counts, top-N, day/hour       │
//! │  ProductRepository         catalog snapshot, batched lookup           │
//! │  CategoryRepository        batched lookup                             │
//! │  CustomerRepository        snapshot, batched lookup                   │
//! │  CashierRepository         batched lookup                             │
//! │  NcfSequenceRepository     active sequences                           │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked, FromRow rows)                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Rows are converted to fisco-core types here and validated once.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SaleRepository`] - Aggregates over sales and sale items
//! - [`ProductRepository`] / [`CategoryRepository`] - Catalog
//! - [`CustomerRepository`] - Customers
//! - [`CashierRepository`] - POS users
//! - [`NcfSequenceRepository`] - DGII fiscal sequences

pub mod cashier;
pub mod customer;
pub mod ncf;
pub mod product;
pub mod sale;

pub use cashier::CashierRepository;
pub use customer::CustomerRepository;
pub use ncf::NcfSequenceRepository;
pub use product::{CategoryRepository, ProductRepository};
pub use sale::{
    CategoryClassSales, CustomerPaymentCount, CustomerSales, DailyTotals, HourlyTotals,
    ProductSales, SaleDimension, SaleRepository, SalesTotals,
};

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{QueryBuilder, Sqlite};

use crate::error::{DbError, DbResult};

// =============================================================================
// Timestamps
// =============================================================================

/// Formats an instant the way the schema stores it: `2024-01-15T10:30:00.000Z`.
///
/// Fixed width, so string comparison in SQL is chronological.
pub fn to_db_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_db_timestamp(entity: &str, value: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::invalid(entity, format!("bad timestamp '{value}': {e}")))
}

// =============================================================================
// Batched Lookups
// =============================================================================

/// Builds `<select> WHERE <column> IN (?, ?, ...)` for a key set.
///
/// Callers return early on an empty key set; `IN ()` is not valid SQL.
pub(crate) fn select_in<'a>(select: &str, column: &str, ids: &'a [String]) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new(select);
    qb.push(" WHERE ");
    qb.push(column);
    qb.push(" IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_is_fixed_width() {
        let a = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap();
        assert_eq!(to_db_timestamp(a), "2024-01-31T23:59:59.000Z");
        assert_eq!(to_db_timestamp(a).len(), to_db_timestamp(b).len());
        assert!(to_db_timestamp(b) < to_db_timestamp(a));
        assert_eq!(parse_db_timestamp("sale", &to_db_timestamp(a)).unwrap(), a);
        assert!(parse_db_timestamp("sale", "yesterday").is_err());
    }

    #[test]
    fn test_select_in_sql() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let qb = select_in("SELECT id FROM products", "id", &ids);
        assert_eq!(qb.sql(), "SELECT id FROM products WHERE id IN (?, ?)");
    }
}
