//! # Customer Repository
//!
//! Customer snapshot and batched lookups.
//!
//! Tax ids are returned as stored; RNC/cédula validity is judged by the
//! customers aggregator, not rejected here.

use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::select_in;
use fisco_core::{Customer, CustomerClass};

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: String,
    name: String,
    class: CustomerClass,
    tax_id: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            class: row.class,
            tax_id: row.tax_id.filter(|t| !t.trim().is_empty()),
            email: row.email,
            phone: row.phone,
            address: row.address,
        }
    }
}

const CUSTOMER_COLUMNS: &str = "SELECT id, name, class, tax_id, email, phone, address FROM customers";

/// Repository for customer reads.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Every customer, by name.
    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        debug!("Loading customers");

        let rows: Vec<CustomerRow> = sqlx::query_as(&format!("{CUSTOMER_COLUMNS} ORDER BY name ASC, id ASC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    /// Customers for a key set, in one query.
    pub async fn by_ids(&self, ids: &[String]) -> DbResult<HashMap<String, Customer>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        debug!(count = ids.len(), "Batched customer lookup");

        let mut qb = select_in(CUSTOMER_COLUMNS, "id", ids);
        let rows = qb.build_query_as::<CustomerRow>().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(|row| (row.id.clone(), Customer::from(row))).collect())
    }

    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, class, tax_id, email, phone, address)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(customer.class)
        .bind(&customer.tax_id)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_blank_tax_id_reads_as_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.customers()
            .insert(&Customer {
                id: "k1".into(),
                name: "María Gómez".into(),
                class: CustomerClass::Individual,
                tax_id: Some("  ".into()),
                email: Some("maria@example.do".into()),
                phone: None,
                address: None,
            })
            .await
            .unwrap();

        let customers = db.customers().list_all().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].class, CustomerClass::Individual);
        assert!(customers[0].tax_id.is_none());

        let found = db.customers().by_ids(&["k1".to_string()]).await.unwrap();
        assert_eq!(found["k1"].email.as_deref(), Some("maria@example.do"));
    }
}
