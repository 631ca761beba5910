//! # Sale Repository
//!
//! Read-side aggregates over `sales` and `sale_items`.
//!
//! ## Query Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Aggregates                                   │
//! │                                                                         │
//! │  totals(range)               COUNT, SUM(subtotal/tax/total)            │
//! │  totals_by(dim, range)       ... GROUP BY payment_method | ncf_type |  │
//! │                                           cashier_id                   │
//! │  daily_totals(range)         ... GROUP BY substr(created_at, 1, 10)    │
//! │  hourly_totals(range)        ... GROUP BY substr(created_at, 12, 2)    │
//! │  product_sales(range, n)     SUM(quantity/line_total) GROUP BY product │
//! │  customer_sales(range, n)    COUNT, SUM, MAX(created_at) per customer  │
//! │  list_in_range(range)        full snapshots, items in one extra query  │
//! │                                                                         │
//! │  All ranges: created_at >= start AND created_at <= end (inclusive)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Top-N lists break revenue ties by insertion order (`MIN(rowid)`), so the
//! ordering is stable across runs.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{parse_db_timestamp, to_db_timestamp};
use fisco_core::report::GroupTotals;
use fisco_core::{CustomerClass, DateRange, Money, NcfType, PaymentMethod, Sale, SaleLineItem};

// =============================================================================
// Public Result Types
// =============================================================================

/// Group-by dimensions over the `sales` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleDimension {
    PaymentMethod,
    NcfType,
    Cashier,
}

impl SaleDimension {
    fn column(&self) -> &'static str {
        match self {
            SaleDimension::PaymentMethod => "payment_method",
            SaleDimension::NcfType => "ncf_type",
            SaleDimension::Cashier => "cashier_id",
        }
    }
}

/// Period-level sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesTotals {
    pub count: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl SalesTotals {
    /// Average ticket, zero without sales.
    pub fn average(&self) -> Money {
        self.total.average_over(self.count)
    }
}

/// Sums for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub count: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    /// Sales that carry a receipt number.
    pub receipts: i64,
}

/// Sums for one hour of day (UTC), across every day of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyTotals {
    pub hour: u32,
    pub count: i64,
    pub total: Money,
}

/// Units and revenue for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSales {
    pub product_id: String,
    pub units: i64,
    pub revenue: Money,
}

/// Purchase history of one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSales {
    pub customer_id: String,
    pub purchases: i64,
    pub total: Money,
    pub last_purchase: DateTime<Utc>,
}

/// How often a customer paid with a given method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerPaymentCount {
    pub customer_id: String,
    pub method: PaymentMethod,
    pub count: i64,
}

/// Units and revenue of one category bought by one customer class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryClassSales {
    pub category_id: Option<String>,
    pub class: CustomerClass,
    pub units: i64,
    pub revenue: Money,
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, FromRow)]
struct TotalsRow {
    count: i64,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
}

#[derive(Debug, FromRow)]
struct GroupRow {
    key: String,
    count: i64,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
}

impl From<GroupRow> for GroupTotals {
    fn from(row: GroupRow) -> Self {
        GroupTotals {
            key: row.key,
            count: row.count,
            subtotal: Money::from_cents(row.subtotal_cents),
            tax: Money::from_cents(row.tax_cents),
            total: Money::from_cents(row.total_cents),
        }
    }
}

#[derive(Debug, FromRow)]
struct DailyRow {
    day: String,
    count: i64,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    receipts: i64,
}

#[derive(Debug, FromRow)]
struct HourlyRow {
    hour: i64,
    count: i64,
    total_cents: i64,
}

#[derive(Debug, FromRow)]
struct ProductSalesRow {
    product_id: String,
    units: i64,
    revenue_cents: i64,
}

#[derive(Debug, FromRow)]
struct CustomerSalesRow {
    customer_id: String,
    purchases: i64,
    total_cents: i64,
    last_purchase: String,
}

#[derive(Debug, FromRow)]
struct CustomerPaymentRow {
    customer_id: String,
    method: String,
    count: i64,
}

#[derive(Debug, FromRow)]
struct CategoryClassRow {
    category_id: Option<String>,
    class: CustomerClass,
    units: i64,
    revenue_cents: i64,
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    created_at: String,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    ncf: Option<String>,
    ncf_type: NcfType,
    payment_method: PaymentMethod,
    cashier_id: String,
    customer_id: Option<String>,
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    sale_id: String,
    product_id: String,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale aggregates.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    fn bounds(range: &DateRange) -> (String, String) {
        (to_db_timestamp(range.start()), to_db_timestamp(range.end()))
    }

    /// Count and sums over the whole range.
    pub async fn totals(&self, range: &DateRange) -> DbResult<SalesTotals> {
        let (start, end) = Self::bounds(range);
        debug!(%range, "Querying sale totals");

        let row: TotalsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS count,
                COALESCE(SUM(subtotal_cents), 0) AS subtotal_cents,
                COALESCE(SUM(tax_cents), 0) AS tax_cents,
                COALESCE(SUM(total_cents), 0) AS total_cents
            FROM sales
            WHERE created_at >= ?1 AND created_at <= ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesTotals {
            count: row.count,
            subtotal: Money::from_cents(row.subtotal_cents),
            tax: Money::from_cents(row.tax_cents),
            total: Money::from_cents(row.total_cents),
        })
    }

    /// Count and sums per value of `dimension`, largest total first.
    pub async fn totals_by(&self, dimension: SaleDimension, range: &DateRange) -> DbResult<Vec<GroupTotals>> {
        let (start, end) = Self::bounds(range);
        let column = dimension.column();
        debug!(%range, group_by = column, "Querying grouped sale totals");

        let sql = format!(
            r#"
            SELECT
                {column} AS key,
                COUNT(*) AS count,
                COALESCE(SUM(subtotal_cents), 0) AS subtotal_cents,
                COALESCE(SUM(tax_cents), 0) AS tax_cents,
                COALESCE(SUM(total_cents), 0) AS total_cents
            FROM sales
            WHERE created_at >= ?1 AND created_at <= ?2
            GROUP BY {column}
            ORDER BY total_cents DESC, key ASC
            "#
        );

        let rows: Vec<GroupRow> = sqlx::query_as(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(GroupTotals::from).collect())
    }

    /// Sums per calendar day, oldest first. Days without sales are absent.
    pub async fn daily_totals(&self, range: &DateRange) -> DbResult<Vec<DailyTotals>> {
        let (start, end) = Self::bounds(range);
        debug!(%range, "Querying daily sale totals");

        let rows: Vec<DailyRow> = sqlx::query_as(
            r#"
            SELECT
                substr(created_at, 1, 10) AS day,
                COUNT(*) AS count,
                COALESCE(SUM(subtotal_cents), 0) AS subtotal_cents,
                COALESCE(SUM(tax_cents), 0) AS tax_cents,
                COALESCE(SUM(total_cents), 0) AS total_cents,
                COUNT(NULLIF(TRIM(ncf), '')) AS receipts
            FROM sales
            WHERE created_at >= ?1 AND created_at <= ?2
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let date = NaiveDate::parse_from_str(&row.day, "%Y-%m-%d")
                    .map_err(|e| DbError::invalid("sale", format!("bad day bucket '{}': {e}", row.day)))?;
                Ok(DailyTotals {
                    date,
                    count: row.count,
                    subtotal: Money::from_cents(row.subtotal_cents),
                    tax: Money::from_cents(row.tax_cents),
                    total: Money::from_cents(row.total_cents),
                    receipts: row.receipts,
                })
            })
            .collect()
    }

    /// Sums per hour of day. Hours without sales are absent.
    pub async fn hourly_totals(&self, range: &DateRange) -> DbResult<Vec<HourlyTotals>> {
        let (start, end) = Self::bounds(range);
        debug!(%range, "Querying hourly sale totals");

        let rows: Vec<HourlyRow> = sqlx::query_as(
            r#"
            SELECT
                CAST(substr(created_at, 12, 2) AS INTEGER) AS hour,
                COUNT(*) AS count,
                COALESCE(SUM(total_cents), 0) AS total_cents
            FROM sales
            WHERE created_at >= ?1 AND created_at <= ?2
            GROUP BY hour
            ORDER BY hour ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let hour = u32::try_from(row.hour)
                    .ok()
                    .filter(|h| *h < 24)
                    .ok_or_else(|| DbError::invalid("sale", format!("bad hour bucket {}", row.hour)))?;
                Ok(HourlyTotals {
                    hour,
                    count: row.count,
                    total: Money::from_cents(row.total_cents),
                })
            })
            .collect()
    }

    /// Units and revenue per product, highest revenue first.
    ///
    /// `limit = None` returns every product that sold in the range.
    pub async fn product_sales(&self, range: &DateRange, limit: Option<i64>) -> DbResult<Vec<ProductSales>> {
        let (start, end) = Self::bounds(range);
        debug!(%range, ?limit, "Querying product sales");

        let rows: Vec<ProductSalesRow> = sqlx::query_as(
            r#"
            SELECT
                si.product_id AS product_id,
                COALESCE(SUM(si.quantity), 0) AS units,
                COALESCE(SUM(si.line_total_cents), 0) AS revenue_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.created_at >= ?1 AND s.created_at <= ?2
            GROUP BY si.product_id
            ORDER BY revenue_cents DESC, MIN(si.id) ASC
            LIMIT ?3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductSales {
                product_id: row.product_id,
                units: row.units,
                revenue: Money::from_cents(row.revenue_cents),
            })
            .collect())
    }

    /// Purchase history per identified customer, highest spend first.
    ///
    /// Walk-in sales (no customer) are excluded.
    pub async fn customer_sales(&self, range: &DateRange, limit: Option<i64>) -> DbResult<Vec<CustomerSales>> {
        let (start, end) = Self::bounds(range);
        debug!(%range, ?limit, "Querying customer sales");

        let rows: Vec<CustomerSalesRow> = sqlx::query_as(
            r#"
            SELECT
                customer_id,
                COUNT(*) AS purchases,
                COALESCE(SUM(total_cents), 0) AS total_cents,
                MAX(created_at) AS last_purchase
            FROM sales
            WHERE customer_id IS NOT NULL
              AND created_at >= ?1 AND created_at <= ?2
            GROUP BY customer_id
            ORDER BY total_cents DESC, MIN(rowid) ASC
            LIMIT ?3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CustomerSales {
                    last_purchase: parse_db_timestamp("sale", &row.last_purchase)?,
                    customer_id: row.customer_id,
                    purchases: row.purchases,
                    total: Money::from_cents(row.total_cents),
                })
            })
            .collect()
    }

    /// Sale counts per (customer, payment method).
    pub async fn customer_payment_counts(&self, range: &DateRange) -> DbResult<Vec<CustomerPaymentCount>> {
        let (start, end) = Self::bounds(range);
        debug!(%range, "Querying customer payment preferences");

        let rows: Vec<CustomerPaymentRow> = sqlx::query_as(
            r#"
            SELECT
                customer_id,
                payment_method AS method,
                COUNT(*) AS count
            FROM sales
            WHERE customer_id IS NOT NULL
              AND created_at >= ?1 AND created_at <= ?2
            GROUP BY customer_id, payment_method
            ORDER BY customer_id ASC, count DESC, payment_method ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let method = row
                    .method
                    .parse::<PaymentMethod>()
                    .map_err(|e| DbError::invalid("sale", e.to_string()))?;
                Ok(CustomerPaymentCount {
                    customer_id: row.customer_id,
                    method,
                    count: row.count,
                })
            })
            .collect()
    }

    /// Units and revenue per (category, customer class), for identified customers.
    pub async fn category_sales_by_class(&self, range: &DateRange) -> DbResult<Vec<CategoryClassSales>> {
        let (start, end) = Self::bounds(range);
        debug!(%range, "Querying category sales by customer class");

        let rows: Vec<CategoryClassRow> = sqlx::query_as(
            r#"
            SELECT
                p.category_id AS category_id,
                c.class AS class,
                COALESCE(SUM(si.quantity), 0) AS units,
                COALESCE(SUM(si.line_total_cents), 0) AS revenue_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            JOIN customers c ON c.id = s.customer_id
            JOIN products p ON p.id = si.product_id
            WHERE s.created_at >= ?1 AND s.created_at <= ?2
            GROUP BY p.category_id, c.class
            ORDER BY revenue_cents DESC, MIN(si.id) ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryClassSales {
                category_id: row.category_id,
                class: row.class,
                units: row.units,
                revenue: Money::from_cents(row.revenue_cents),
            })
            .collect())
    }

    /// Receipt numbers of every sale in the range, in sale order.
    ///
    /// Blank receipts come back as `None`.
    pub async fn receipts_in_range(&self, range: &DateRange) -> DbResult<Vec<Option<String>>> {
        let (start, end) = Self::bounds(range);
        debug!(%range, "Querying receipt numbers");

        let receipts: Vec<(Option<String>,)> = sqlx::query_as(
            r#"
            SELECT NULLIF(TRIM(ncf), '') AS ncf
            FROM sales
            WHERE created_at >= ?1 AND created_at <= ?2
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(receipts.into_iter().map(|(ncf,)| ncf).collect())
    }

    /// Full sale snapshots in the range, oldest first, each validated.
    ///
    /// Items come from a single second query and are joined in memory.
    pub async fn list_in_range(&self, range: &DateRange) -> DbResult<Vec<Sale>> {
        let (start, end) = Self::bounds(range);
        debug!(%range, "Loading sales");

        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT
                id, created_at, subtotal_cents, tax_cents, total_cents,
                ncf, ncf_type, payment_method, cashier_id, customer_id
            FROM sales
            WHERE created_at >= ?1 AND created_at <= ?2
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(&start)
        .bind(&end)
        .fetch_all(&self.pool)
        .await?;

        let item_rows: Vec<SaleItemRow> = sqlx::query_as(
            r#"
            SELECT
                si.sale_id, si.product_id, si.quantity,
                si.unit_price_cents, si.line_total_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.created_at >= ?1 AND s.created_at <= ?2
            ORDER BY si.id ASC
            "#,
        )
        .bind(&start)
        .bind(&end)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<String, Vec<SaleLineItem>> = HashMap::new();
        for row in item_rows {
            items.entry(row.sale_id).or_default().push(SaleLineItem {
                product_id: row.product_id,
                quantity: row.quantity,
                unit_price: Money::from_cents(row.unit_price_cents),
                line_total: Money::from_cents(row.line_total_cents),
            });
        }

        rows.into_iter()
            .map(|row| {
                let sale = Sale {
                    created_at: parse_db_timestamp("sale", &row.created_at)?,
                    items: items.remove(&row.id).unwrap_or_default(),
                    id: row.id,
                    subtotal: Money::from_cents(row.subtotal_cents),
                    tax: Money::from_cents(row.tax_cents),
                    total: Money::from_cents(row.total_cents),
                    ncf: row.ncf,
                    ncf_type: row.ncf_type,
                    payment_method: row.payment_method,
                    cashier_id: row.cashier_id,
                    customer_id: row.customer_id,
                };
                sale.validate()?;
                Ok(sale)
            })
            .collect()
    }

    /// Inserts a sale and its items in one transaction.
    ///
    /// Used by seeding and tests; report generation never writes.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        sale.validate()?;
        debug!(id = %sale.id, ncf = ?sale.ncf, "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, created_at, subtotal_cents, tax_cents, total_cents,
                ncf, ncf_type, payment_method, cashier_id, customer_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&sale.id)
        .bind(to_db_timestamp(sale.created_at))
        .bind(sale.subtotal.cents())
        .bind(sale.tax.cents())
        .bind(sale.total.cents())
        .bind(&sale.ncf)
        .bind(sale.ncf_type)
        .bind(sale.payment_method)
        .bind(&sale.cashier_id)
        .bind(&sale.customer_id)
        .execute(&mut *tx)
        .await?;

        for item in &sale.items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, product_id, quantity, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price.cents())
            .bind(item.line_total.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use fisco_core::{Cashier, Category, Customer, Product};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap()
    }

    fn sale(id: &str, at: DateTime<Utc>, subtotal: i64, method: PaymentMethod) -> Sale {
        let tax = subtotal * 18 / 100;
        Sale {
            id: id.to_string(),
            created_at: at,
            subtotal: Money::from_cents(subtotal),
            tax: Money::from_cents(tax),
            total: Money::from_cents(subtotal + tax),
            ncf: Some(format!("B02{:08}", id.len())),
            ncf_type: NcfType::B02,
            payment_method: method,
            cashier_id: "u1".to_string(),
            customer_id: None,
            items: vec![SaleLineItem {
                product_id: "p1".to_string(),
                quantity: 1,
                unit_price: Money::from_cents(subtotal),
                line_total: Money::from_cents(subtotal),
            }],
        }
    }

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.cashiers()
            .insert(&Cashier { id: "u1".into(), name: "Ana".into() })
            .await
            .unwrap();
        db.categories()
            .insert(&Category { id: "c1".into(), name: "Bebidas".into() })
            .await
            .unwrap();
        db.products()
            .insert(&Product {
                id: "p1".into(),
                name: "Agua".into(),
                price: Money::from_cents(1000_00),
                cost: Money::from_cents(500_00),
                stock: 10,
                min_stock: 2,
                category_id: Some("c1".into()),
            })
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_range_is_end_inclusive() {
        let db = setup().await;
        let repo = db.sales();
        let last_instant = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let first_instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        repo.insert(&sale("a", first_instant, 1000_00, PaymentMethod::Cash)).await.unwrap();
        repo.insert(&sale("bb", last_instant, 1000_00, PaymentMethod::Cash)).await.unwrap();
        repo.insert(&sale("ccc", next_day, 1000_00, PaymentMethod::Cash)).await.unwrap();

        let totals = repo.totals(&january()).await.unwrap();
        assert_eq!(totals.count, 2);
        assert_eq!(totals.total, Money::from_cents(2360_00));
    }

    #[tokio::test]
    async fn test_grouped_totals_sum_to_period_total() {
        let db = setup().await;
        let repo = db.sales();
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0).unwrap();

        repo.insert(&sale("a", at, 1000_00, PaymentMethod::Cash)).await.unwrap();
        repo.insert(&sale("bb", at, 250_00, PaymentMethod::Card)).await.unwrap();
        repo.insert(&sale("ccc", at, 1000_00, PaymentMethod::Cash)).await.unwrap();

        let range = january();
        let groups = repo.totals_by(SaleDimension::PaymentMethod, &range).await.unwrap();
        let totals = repo.totals(&range).await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "cash");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups.iter().map(|g| g.total).sum::<Money>(), totals.total);
    }

    #[tokio::test]
    async fn test_day_and_hour_buckets() {
        let db = setup().await;
        let repo = db.sales();
        repo.insert(&sale("a", Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(), 100_00, PaymentMethod::Cash))
            .await
            .unwrap();
        repo.insert(&sale("bb", Utc.with_ymd_and_hms(2024, 1, 2, 9, 45, 0).unwrap(), 100_00, PaymentMethod::Cash))
            .await
            .unwrap();
        repo.insert(&sale("ccc", Utc.with_ymd_and_hms(2024, 1, 5, 17, 0, 0).unwrap(), 100_00, PaymentMethod::Cash))
            .await
            .unwrap();

        let daily = repo.daily_totals(&january()).await.unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, date(2024, 1, 2));
        assert_eq!(daily[0].count, 2);
        assert_eq!(daily[0].receipts, 2);

        let hourly = repo.hourly_totals(&january()).await.unwrap();
        assert_eq!(hourly.iter().map(|h| (h.hour, h.count)).collect::<Vec<_>>(), vec![(9, 2), (17, 1)]);
    }

    #[tokio::test]
    async fn test_list_in_range_loads_items() {
        let db = setup().await;
        let repo = db.sales();
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0).unwrap();
        repo.insert(&sale("a", at, 1000_00, PaymentMethod::Transfer)).await.unwrap();

        let sales = repo.list_in_range(&january()).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].items.len(), 1);
        assert_eq!(sales[0].created_at, at);
        assert_eq!(sales[0].payment_method, PaymentMethod::Transfer);
    }

    #[tokio::test]
    async fn test_inconsistent_sale_rejected() {
        let db = setup().await;
        let mut bad = sale("a", Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(), 1000_00, PaymentMethod::Cash);
        bad.total = Money::from_cents(1);
        assert!(matches!(db.sales().insert(&bad).await, Err(DbError::InvalidData { .. })));
    }

    #[tokio::test]
    async fn test_customer_sales_and_preferences() {
        let db = setup().await;
        db.customers()
            .insert(&Customer {
                id: "k1".into(),
                name: "Colmado Pérez".into(),
                class: CustomerClass::Business,
                tax_id: Some("131245678".into()),
                email: None,
                phone: None,
                address: None,
            })
            .await
            .unwrap();

        let repo = db.sales();
        for (id, day, method) in [("a", 3, PaymentMethod::Card), ("bb", 7, PaymentMethod::Card), ("ccc", 9, PaymentMethod::Cash)] {
            let mut s = sale(id, Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(), 100_00, method);
            s.customer_id = Some("k1".into());
            repo.insert(&s).await.unwrap();
        }

        let stats = repo.customer_sales(&january(), None).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].purchases, 3);
        assert_eq!(stats[0].last_purchase, Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).unwrap());

        let prefs = repo.customer_payment_counts(&january()).await.unwrap();
        assert_eq!(prefs[0].method, PaymentMethod::Card);
        assert_eq!(prefs[0].count, 2);

        let by_class = repo.category_sales_by_class(&january()).await.unwrap();
        assert_eq!(by_class.len(), 1);
        assert_eq!(by_class[0].class, CustomerClass::Business);
        assert_eq!(by_class[0].units, 3);
    }
}
