//! # Foreign-Key Enrichment
//!
//! Resolves display data (names, categories, tax ids) for the keys that
//! appear in grouped results.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Batched Enrichment                                   │
//! │                                                                         │
//! │  grouped rows ──► EntityKeys (deduplicated, per entity kind)           │
//! │                        │                                                │
//! │        ┌───────────────┼───────────────┬───────────────┐               │
//! │        ▼               ▼               ▼               ▼               │
//! │   products IN (..) customers IN (..) users IN (..) categories IN (..)  │
//! │        │               │               │               │               │
//! │        └───────────────┴──── try_join! ┴───────────────┘  (barrier)    │
//! │                        │                                                │
//! │                        ▼                                                │
//! │   categories of the fetched products not yet known  (second round)     │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                     Lookups  ← merged by key, arrival order irrelevant │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashMap};

use fisco_core::{Cashier, Category, Customer, Product};
use fisco_db::{Database, DbResult};
use tracing::debug;

/// Label used when no category is set or the category row is gone.
pub const UNCATEGORIZED: &str = "Sin categoría";

/// Distinct keys to resolve, per entity kind.
#[derive(Debug, Default, Clone)]
pub struct EntityKeys {
    products: BTreeSet<String>,
    customers: BTreeSet<String>,
    cashiers: BTreeSet<String>,
    categories: BTreeSet<String>,
}

impl EntityKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.products.extend(ids.into_iter().map(str::to_string));
        self
    }

    pub fn customers<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.customers.extend(ids.into_iter().map(str::to_string));
        self
    }

    pub fn cashiers<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.cashiers.extend(ids.into_iter().map(str::to_string));
        self
    }

    pub fn categories<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.categories.extend(ids.into_iter().map(str::to_string));
        self
    }
}

fn as_vec(keys: &BTreeSet<String>) -> Vec<String> {
    keys.iter().cloned().collect()
}

/// Resolved entities, keyed by id.
#[derive(Debug, Default, Clone)]
pub struct Lookups {
    pub products: HashMap<String, Product>,
    pub customers: HashMap<String, Customer>,
    pub cashiers: HashMap<String, Cashier>,
    pub categories: HashMap<String, Category>,
}

impl Lookups {
    /// One batched query per entity kind, issued concurrently.
    pub async fn fetch(db: &Database, keys: EntityKeys) -> DbResult<Self> {
        debug!(
            products = keys.products.len(),
            customers = keys.customers.len(),
            cashiers = keys.cashiers.len(),
            categories = keys.categories.len(),
            "Enriching grouped rows"
        );

        let product_ids = as_vec(&keys.products);
        let customer_ids = as_vec(&keys.customers);
        let cashier_ids = as_vec(&keys.cashiers);
        let category_ids = as_vec(&keys.categories);

        let product_repo = db.products();
        let customer_repo = db.customers();
        let cashier_repo = db.cashiers();
        let category_repo = db.categories();

        let (products, customers, cashiers, mut categories) = tokio::try_join!(
            product_repo.by_ids(&product_ids),
            customer_repo.by_ids(&customer_ids),
            cashier_repo.by_ids(&cashier_ids),
            category_repo.by_ids(&category_ids),
        )?;

        let missing: Vec<String> = products
            .values()
            .filter_map(|p| p.category_id.as_ref())
            .filter(|id| !categories.contains_key(*id))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !missing.is_empty() {
            categories.extend(category_repo.by_ids(&missing).await?);
        }

        Ok(Lookups {
            products,
            customers,
            cashiers,
            categories,
        })
    }

    /// Product name, or the id itself for a product no longer in the catalog.
    pub fn product_name(&self, id: &str) -> String {
        self.products
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Category name of a product, `None` when uncategorized.
    pub fn product_category(&self, id: &str) -> Option<String> {
        self.products
            .get(id)
            .and_then(|p| p.category_id.as_deref())
            .map(|category_id| self.category_name(Some(category_id)))
    }

    pub fn category_name(&self, id: Option<&str>) -> String {
        id.and_then(|id| self.categories.get(id))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    }

    pub fn customer_name(&self, id: &str) -> String {
        self.customers
            .get(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn customer_tax_id(&self, id: &str) -> Option<String> {
        self.customers.get(id).and_then(|c| c.tax_id.clone())
    }

    pub fn cashier_name(&self, id: &str) -> String {
        self.cashiers
            .get(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fisco_core::Money;
    use fisco_db::DbConfig;

    #[tokio::test]
    async fn test_fetch_resolves_product_categories_in_second_round() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.categories()
            .insert(&Category { id: "c1".into(), name: "Bebidas".into() })
            .await
            .unwrap();
        db.products()
            .insert(&Product {
                id: "p1".into(),
                name: "Malta Morena".into(),
                price: Money::from_cents(60_00),
                cost: Money::from_cents(40_00),
                stock: 24,
                min_stock: 6,
                category_id: Some("c1".into()),
            })
            .await
            .unwrap();

        // Duplicate keys collapse into one lookup.
        let keys = EntityKeys::new().products(["p1", "p1", "gone"]);
        let lookups = Lookups::fetch(&db, keys).await.unwrap();

        assert_eq!(lookups.product_name("p1"), "Malta Morena");
        assert_eq!(lookups.product_category("p1").as_deref(), Some("Bebidas"));
        assert_eq!(lookups.product_name("gone"), "gone");
        assert_eq!(lookups.category_name(None), UNCATEGORIZED);
    }

    #[tokio::test]
    async fn test_fetch_with_no_keys_is_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let lookups = Lookups::fetch(&db, EntityKeys::new()).await.unwrap();
        assert!(lookups.products.is_empty());
        assert_eq!(lookups.cashier_name("u9"), "u9");
    }
}
