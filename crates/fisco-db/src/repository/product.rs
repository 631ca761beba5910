//! # Product Repository
//!
//! Catalog snapshot and batched lookups for products and categories.
//!
//! ## Batched Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Query per Entity Kind                            │
//! │                                                                         │
//! │  top products: [p7, p2, p9, p2 ...]                                    │
//! │       │                                                                 │
//! │       │  dedup (fisco-reports::enrich)                                  │
//! │       ▼                                                                 │
//! │  SELECT ... FROM products WHERE id IN (?, ?, ?)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HashMap<id, Product>  ← missing ids are simply absent                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::select_in;
use fisco_core::{Category, Money, Product};

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price_cents: i64,
    cost_cents: i64,
    stock: i64,
    min_stock: i64,
    category_id: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        if row.stock < 0 || row.min_stock < 0 {
            return Err(DbError::invalid(
                "product",
                format!("{}: negative stock ({} / min {})", row.id, row.stock, row.min_stock),
            ));
        }
        if row.price_cents < 0 || row.cost_cents < 0 {
            return Err(DbError::invalid("product", format!("{}: negative price or cost", row.id)));
        }

        Ok(Product {
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            cost: Money::from_cents(row.cost_cents),
            stock: row.stock,
            min_stock: row.min_stock,
            category_id: row.category_id,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "SELECT id, name, price_cents, cost_cents, stock, min_stock, category_id FROM products";

/// Repository for product reads.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Every product, by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        debug!("Loading product catalog");

        let rows: Vec<ProductRow> = sqlx::query_as(&format!("{PRODUCT_COLUMNS} ORDER BY name ASC, id ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    pub async fn count(&self) -> DbResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Products for a key set, in one query. Unknown ids are absent from the map.
    pub async fn by_ids(&self, ids: &[String]) -> DbResult<HashMap<String, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        debug!(count = ids.len(), "Batched product lookup");

        let mut qb = select_in(PRODUCT_COLUMNS, "id", ids);
        let rows = qb.build_query_as::<ProductRow>().fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|row| Product::try_from(row).map(|p| (p.id.clone(), p)))
            .collect()
    }

    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, cost_cents, stock, min_stock, category_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.cost.cents())
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.category_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: String,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category { id: row.id, name: row.name }
    }
}

/// Repository for category reads.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as("SELECT id, name FROM categories ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Categories for a key set, in one query.
    pub async fn by_ids(&self, ids: &[String]) -> DbResult<HashMap<String, Category>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        debug!(count = ids.len(), "Batched category lookup");

        let mut qb = select_in("SELECT id, name FROM categories", "id", ids);
        let rows = qb.build_query_as::<CategoryRow>().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(|row| (row.id.clone(), Category::from(row))).collect())
    }

    pub async fn insert(&self, category: &Category) -> DbResult<()> {
        sqlx::query("INSERT INTO categories (id, name) VALUES (?1, ?2)")
            .bind(&category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
