//! # Exporter
//!
//! Front door of the crate: picks the back end for a format and packages the
//! bytes with their content type and download filename.
//!
//! ```text
//! export(report, Pdf, 2024-02-01)
//!   └──► ExportedReport {
//!          bytes:        %PDF-1.4 ...
//!          content_type: application/pdf
//!          filename:     itbis-report-2024-02-01.pdf
//!        }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use fisco_core::{ReportResult, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::csv_renderer::CsvRenderer;
use crate::document::{DocumentRenderer, StoreInfo};
use crate::error::RenderResult;
use crate::table::TableLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Csv,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ValidationError::NotAllowed {
                field: "format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Rendered bytes ready to be saved or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// `{tag}-report-{YYYY-MM-DD}.{ext}`
pub fn export_filename(report: &ReportResult, format: ExportFormat, generated_on: NaiveDate) -> String {
    format!(
        "{}-report-{}.{}",
        report.report_type().tag(),
        generated_on.format("%Y-%m-%d"),
        format.extension()
    )
}

pub struct Exporter<L: TableLayout> {
    document: DocumentRenderer<L>,
    csv: CsvRenderer,
}

impl<L: TableLayout> Exporter<L> {
    pub fn new(table: L, store: StoreInfo) -> Self {
        Exporter {
            csv: CsvRenderer::new(store.clone()),
            document: DocumentRenderer::new(table, store),
        }
    }

    /// Renders `report`. The generation date is printed in the document and
    /// used in the filename; the same inputs give the same bytes.
    pub fn export(
        &self,
        report: &ReportResult,
        format: ExportFormat,
        generated_on: NaiveDate,
    ) -> RenderResult<ExportedReport> {
        let bytes = match format {
            ExportFormat::Pdf => self.document.render(report, generated_on)?,
            ExportFormat::Csv => self.csv.render(report, generated_on)?,
        };
        let filename = export_filename(report, format, generated_on);
        debug!(%format, bytes = bytes.len(), %filename, "report exported");

        Ok(ExportedReport {
            bytes,
            content_type: format.content_type(),
            filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::fixtures::sample_daily_sales;
    use crate::table::GridTableLayout;

    fn exporter() -> Exporter<GridTableLayout> {
        Exporter::new(
            GridTableLayout::new(),
            StoreInfo {
                name: "Colmado La Esquina".into(),
                rnc: "101-00000-1".into(),
                address: String::new(),
            },
        )
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!(" csv ".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_pdf_export() {
        let out = exporter().export(&sample_daily_sales(), ExportFormat::Pdf, day()).unwrap();
        assert_eq!(out.content_type, "application/pdf");
        assert_eq!(out.filename, "daily-sales-report-2024-02-01.pdf");
        assert!(out.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_csv_export() {
        let out = exporter().export(&sample_daily_sales(), ExportFormat::Csv, day()).unwrap();
        assert_eq!(out.content_type, "text/csv; charset=utf-8");
        assert_eq!(out.filename, "daily-sales-report-2024-02-01.csv");
        assert!(out.bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    }

    #[test]
    fn test_export_is_deterministic() {
        let exporter = exporter();
        let report = sample_daily_sales();
        for format in [ExportFormat::Pdf, ExportFormat::Csv] {
            let a = exporter.export(&report, format, day()).unwrap();
            let b = exporter.export(&report, format, day()).unwrap();
            assert_eq!(a, b);
        }
    }
}
