//! # NCF Sequence Repository
//!
//! DGII-authorized receipt ranges, one row per NCF type.
//!
//! ```text
//! ncf_type │ current_number │ max_number │ active
//! ─────────┼────────────────┼────────────┼───────
//! B01      │ 9950           │ 10000      │ 1       → 50 remaining
//! B02      │ 120            │ 50000      │ 1
//! B14      │ 0              │ 500        │ 0       → ignored by reports
//! ```

use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use fisco_core::{FiscalSequence, NcfType};

#[derive(Debug, FromRow)]
struct SequenceRow {
    ncf_type: NcfType,
    current_number: i64,
    max_number: i64,
    active: bool,
}

impl TryFrom<SequenceRow> for FiscalSequence {
    type Error = DbError;

    fn try_from(row: SequenceRow) -> DbResult<Self> {
        Ok(FiscalSequence::new(row.ncf_type, row.current_number, row.max_number, row.active)?)
    }
}

/// Repository for fiscal sequence reads.
#[derive(Debug, Clone)]
pub struct NcfSequenceRepository {
    pool: SqlitePool,
}

impl NcfSequenceRepository {
    /// Creates a new NcfSequenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NcfSequenceRepository { pool }
    }

    /// Active sequences ordered by type.
    pub async fn list_active(&self) -> DbResult<Vec<FiscalSequence>> {
        debug!("Loading active NCF sequences");

        let rows: Vec<SequenceRow> = sqlx::query_as(
            r#"
            SELECT ncf_type, current_number, max_number, active
            FROM ncf_sequences
            WHERE active = 1
            ORDER BY ncf_type ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FiscalSequence::try_from).collect()
    }

    /// Inserts or replaces the range for a type.
    pub async fn upsert(&self, sequence: &FiscalSequence) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ncf_sequences (ncf_type, current_number, max_number, active)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(ncf_type) DO UPDATE SET
                current_number = excluded.current_number,
                max_number = excluded.max_number,
                active = excluded.active
            "#,
        )
        .bind(sequence.ncf_type)
        .bind(sequence.current())
        .bind(sequence.max())
        .bind(sequence.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
