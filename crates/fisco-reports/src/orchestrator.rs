//! # Report Orchestrator
//!
//! Validates a report request and dispatches it to the matching aggregator.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  generate("itbis", from, to)                                            │
//! │       │                                                                 │
//! │       ├── tag lookup ─────────── unknown ──► UnsupportedReportType      │
//! │       │                                                                 │
//! │       ├── requires_range?                                               │
//! │       │     yes: validate_date_range ── missing/inverted ──► InvalidRange
//! │       │     no:  as_of = to, or today (inventory)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  match report type ──► aggregate_xxx(db, range) ──► ReportResult        │
//! │                              │                                          │
//! │                              └── DbError ──► Aggregation (logged)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine holds no per-request state; one instance serves any number of
//! concurrent requests.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use fisco_core::validation::validate_date_range;
use fisco_core::{DateRange, ReportResult, ReportType};
use fisco_db::Database;
use tracing::{error, info};

use crate::aggregator::{
    aggregate_audit, aggregate_customers, aggregate_daily_sales, aggregate_dgii,
    aggregate_inventory, aggregate_itbis, aggregate_ncf,
};
use crate::error::{EngineResult, ReportError};

/// Entry point of the reporting engine.
#[derive(Debug, Clone)]
pub struct ReportEngine {
    db: Database,
    /// Fixed "today" for the inventory snapshot; `None` reads the clock.
    today: Option<NaiveDate>,
}

impl ReportEngine {
    pub fn new(db: Database) -> Self {
        ReportEngine { db, today: None }
    }

    /// Pins the date used when an inventory request carries no `to`.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Generates one report.
    ///
    /// ## Arguments
    /// * `report_type` - One of the seven tags (`daily-sales`, `itbis`, ...)
    /// * `from`, `to` - Calendar dates; both required except for `inventory`
    ///
    /// ## Errors
    /// * `UnsupportedReportType` - unknown tag
    /// * `InvalidRange` - missing or inverted range
    /// * `Aggregation` - the store failed
    pub async fn generate(
        &self,
        report_type: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> EngineResult<ReportResult> {
        let start = Instant::now();

        let result = self.dispatch(report_type, from, to).await;

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        match &result {
            Ok(report) => info!(
                report_type = %report.report_type(),
                ?from,
                ?to,
                elapsed_ms,
                "Report generated"
            ),
            Err(e) => error!(
                report_type,
                ?from,
                ?to,
                code = ?e.code(),
                error = %e,
                "Report generation failed"
            ),
        }
        result
    }

    async fn dispatch(
        &self,
        tag: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> EngineResult<ReportResult> {
        let report_type: ReportType = tag
            .parse()
            .map_err(|_| ReportError::UnsupportedReportType(tag.to_string()))?;

        info!(report_type = %report_type, ?from, ?to, "Generating report");

        if !report_type.requires_range() {
            let as_of = to.unwrap_or_else(|| self.today());
            return Ok(ReportResult::Inventory(aggregate_inventory(&self.db, as_of).await?));
        }

        let range = validate_date_range(from, to).map_err(ReportError::InvalidRange)?;
        self.run(report_type, &range).await
    }

    async fn run(&self, report_type: ReportType, range: &DateRange) -> EngineResult<ReportResult> {
        let db = &self.db;
        let report = match report_type {
            ReportType::DailySales => ReportResult::DailySales(aggregate_daily_sales(db, range).await?),
            ReportType::Itbis => ReportResult::Itbis(aggregate_itbis(db, range).await?),
            ReportType::Ncf => ReportResult::Ncf(aggregate_ncf(db, range).await?),
            ReportType::Inventory => ReportResult::Inventory(aggregate_inventory(db, range.to_date()).await?),
            ReportType::Customers => ReportResult::Customers(aggregate_customers(db, range).await?),
            ReportType::Audit => ReportResult::Audit(aggregate_audit(db, range).await?),
            ReportType::Dgii => ReportResult::Dgii(aggregate_dgii(db, range).await?),
        };
        Ok(report)
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}
