//! # Fisco Reporter
//!
//! Generates one report and writes it to disk.
//!
//! ## Usage
//! ```text
//! fisco-reporter itbis --from 2024-01-01 --to 2024-01-31
//! fisco-reporter inventory --format csv --output ./reportes
//! fisco-reporter dgii --from 2024-01-01 --to 2024-01-31 --json
//! fisco-reporter daily-sales --from 2024-01-01 --to 2024-01-31 --seed
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize logging (RUST_LOG, default info,fisco=debug,sqlx=warn)   │
//! │  2. Load ReporterConfig, apply CLI overrides                            │
//! │  3. Connect to SQLite, run migrations                                   │
//! │  4. Optionally seed demo data (--seed)                                  │
//! │  5. ReportEngine::generate                                              │
//! │  6. Print JSON (--json) or export PDF/CSV into the output directory     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use fisco_db::{seed_demo_data, Database};
use fisco_export::{ExportFormat, Exporter, GridTableLayout, TableLayout};
use fisco_reports::ReportEngine;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ReporterConfig;
use crate::error::AppResult;

/// Fiscal reports for a Dominican point of sale.
#[derive(Debug, Parser)]
#[command(name = "fisco-reporter", version)]
struct Cli {
    /// daily-sales, itbis, ncf, inventory, customers, audit or dgii
    report_type: String,

    /// First day of the period (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the period, inclusive (YYYY-MM-DD). Snapshot day for inventory.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// pdf or csv
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Config file (defaults to reporter.toml in the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the export is written to
    #[arg(long)]
    output: Option<PathBuf>,

    /// Seed an empty database with a month of demo data first
    #[arg(long)]
    seed: bool,

    /// Print the report as JSON instead of exporting it
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = ReporterConfig::load(cli.config.clone())?;
    if let Some(format) = cli.format {
        config.export.format = format;
    }
    if let Some(output) = cli.output.clone() {
        config.export.output_dir = output;
    }

    if let Err(e) = run(&cli, &config).await {
        error!(
            report_type = %cli.report_type,
            from = ?cli.from,
            to = ?cli.to,
            error = %e,
            "Report run failed"
        );
        return Err(e.into());
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fisco=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

async fn run(cli: &Cli, config: &ReporterConfig) -> AppResult<()> {
    let today = Utc::now().date_naive();

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = Database::new(config.db_config()).await?;
    info!(path = ?config.database.path, "Database connected and migrations applied");

    if cli.seed {
        let summary = seed_demo_data(&db, today).await?;
        info!(
            products = summary.products,
            customers = summary.customers,
            sales = summary.sales,
            "Demo data seeded"
        );
    }

    let engine = ReportEngine::new(db.clone()).with_today(today);
    let report = engine.generate(&cli.report_type, cli.from, cli.to).await;
    db.close().await;
    let report = report?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let exported = export(config, &report, GridTableLayout::new(), today)?;
    std::fs::create_dir_all(&config.export.output_dir)?;
    let path = config.export.output_dir.join(&exported.filename);
    std::fs::write(&path, &exported.bytes)?;

    info!(path = %path.display(), bytes = exported.bytes.len(), "Report written");
    println!("{}", path.display());
    Ok(())
}

fn export<L: TableLayout>(
    config: &ReporterConfig,
    report: &fisco_core::ReportResult,
    table: L,
    today: NaiveDate,
) -> AppResult<fisco_export::ExportedReport> {
    let exporter = Exporter::new(table, config.store_info());
    exporter.export(report, config.export.format, today).map_err(|e| {
        let period = fisco_export::format::period_label(report);
        error!(
            report_type = %report.report_type(),
            period = %period,
            format = %config.export.format,
            error = %e,
            "Export failed"
        );
        e.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "fisco-reporter",
            "itbis",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "--format",
            "csv",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.report_type, "itbis");
        assert_eq!(cli.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(cli.format, Some(ExportFormat::Csv));
        assert!(cli.json);
        assert!(!cli.seed);
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        let result = Cli::try_parse_from(["fisco-reporter", "itbis", "--from", "31/01/2024"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_writes_export() {
        let dir = std::env::temp_dir().join(format!("fisco-reporter-{}", std::process::id()));
        let mut config = ReporterConfig::default();
        config.database.path = dir.join("fisco.db");
        config.export.output_dir = dir.join("out");
        config.export.format = ExportFormat::Csv;

        let cli = Cli::try_parse_from(["fisco-reporter", "inventory", "--seed"]).unwrap();
        run(&cli, &config).await.unwrap();

        let written: Vec<_> = std::fs::read_dir(dir.join("out")).unwrap().collect();
        assert_eq!(written.len(), 1);
        let name = written[0].as_ref().unwrap().file_name();
        assert!(name.to_string_lossy().starts_with("inventory-report-"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_export_failure_is_logged_with_report_context() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let db = Database::new(fisco_db::DbConfig::in_memory()).await.unwrap();
        let report = ReportEngine::new(db)
            .with_today(today)
            .generate("inventory", None, None)
            .await
            .unwrap();

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let config = ReporterConfig::default();
        let result = tracing::subscriber::with_default(subscriber, || {
            export(&config, &report, GridTableLayout::new().with_width(5.0), today)
        });

        assert!(matches!(result, Err(crate::error::AppError::Render(_))));
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Export failed"));
        assert!(output.contains("report_type=inventory"));
        assert!(output.contains("period=Al 31/01/2024"));
    }
}
