//! # Cashier Repository
//!
//! Display names for the POS users that rang up sales.

use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::select_in;
use fisco_core::Cashier;

#[derive(Debug, FromRow)]
struct CashierRow {
    id: String,
    name: String,
}

/// Repository for cashier reads.
#[derive(Debug, Clone)]
pub struct CashierRepository {
    pool: SqlitePool,
}

impl CashierRepository {
    /// Creates a new CashierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashierRepository { pool }
    }

    /// Cashiers for a key set, in one query.
    pub async fn by_ids(&self, ids: &[String]) -> DbResult<HashMap<String, Cashier>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        debug!(count = ids.len(), "Batched cashier lookup");

        let mut qb = select_in("SELECT id, name FROM users", "id", ids);
        let rows = qb.build_query_as::<CashierRow>().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id.clone(), Cashier { id: row.id, name: row.name }))
            .collect())
    }

    pub async fn insert(&self, cashier: &Cashier) -> DbResult<()> {
        sqlx::query("INSERT INTO users (id, name) VALUES (?1, ?2)")
            .bind(&cashier.id)
            .bind(&cashier.name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_duplicate_cashier_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ana = Cashier { id: "u1".into(), name: "Ana".into() };
        db.cashiers().insert(&ana).await.unwrap();

        assert!(matches!(
            db.cashiers().insert(&ana).await,
            Err(DbError::UniqueViolation { .. })
        ));
        assert_eq!(db.cashiers().by_ids(&["u1".to_string()]).await.unwrap()["u1"], ana);
    }
}
