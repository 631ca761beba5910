//! # Store Connection
//!
//! Opens the SQLite store the reports read from and hands out repositories.
//!
//! ```text
//! DbConfig { path, max_connections }
//!        │
//!        ▼
//! Database::new ──► SqlitePool (WAL, foreign keys) ──► migrations
//!        │
//!        ├── sales()          grouped aggregates, snapshots
//!        ├── products()       catalog and stock
//!        ├── categories()     ─┐
//!        ├── customers()       ├ key-set lookups for enrichment
//!        ├── cashiers()       ─┘
//!        └── ncf_sequences()  authorized receipt ranges
//! ```
//!
//! An aggregator issues its independent queries together with
//! `tokio::try_join!`, so the pool needs one connection per concurrent query
//! to run them side by side. The in-memory store is pinned to a single
//! connection because every new connection would open an empty database.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::{
    CashierRepository, CategoryRepository, CustomerRepository, NcfSequenceRepository,
    ProductRepository, SaleRepository,
};

const MEMORY_PATH: &str = ":memory:";
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Configuration
// =============================================================================

/// Where the store lives and how many queries may run at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
}

impl DbConfig {
    /// A file-backed store; the file is created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// A private, empty store for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
        }
    }

    fn is_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the store. Clones share one pool.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./fisco.db")).await?;
/// let totals = db.sales().totals(&range).await?;
/// let sequences = db.ncf_sequences().list_active().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Connects and brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening store");

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT);
        if config.is_memory() {
            // the schema disappears with the last connection
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;
        info!(max_connections = config.max_connections, "Store ready");

        Ok(Database { pool })
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// POS users, named in the audit report.
    pub fn cashiers(&self) -> CashierRepository {
        CashierRepository::new(self.pool.clone())
    }

    pub fn ncf_sequences(&self) -> NcfSequenceRepository {
        NcfSequenceRepository::new(self.pool.clone())
    }

    /// Closes every connection. Repositories handed out earlier fail afterwards.
    pub async fn close(&self) {
        info!("Closing store");
        self.pool.close().await;
    }
}
