//! # CSV Renderer
//!
//! One UTF-8 file per report, prefixed with a byte-order mark so spreadsheet
//! tools pick the right encoding. Records have varying widths:
//!
//! ```text
//! Empresa,Colmado La Esquina
//! RNC,101-00000-1
//! Reporte,Reporte de Ventas
//! Período,01/01/2024 - 31/01/2024
//! Generado,01/02/2024
//!
//! Resumen de Ventas            ◄── section title
//! Concepto,Valor               ◄── column headers
//! Total de ventas,3            ◄── rows
//!
//! Métodos de Pago
//! ...
//! ```

use chrono::NaiveDate;
use fisco_core::ReportResult;

use crate::document::StoreInfo;
use crate::error::RenderResult;
use crate::format::{format_date, period_label};
use crate::sections::report_sections;

const BOM: &str = "\u{FEFF}";

#[derive(Debug, Clone, Default)]
pub struct CsvRenderer {
    store: StoreInfo,
}

impl CsvRenderer {
    pub fn new(store: StoreInfo) -> Self {
        CsvRenderer { store }
    }

    pub fn render(&self, report: &ReportResult, generated_on: NaiveDate) -> RenderResult<Vec<u8>> {
        let mut buffer = BOM.as_bytes().to_vec();
        {
            let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(&mut buffer);

            writer.write_record(["Empresa", self.store.name.as_str()])?;
            writer.write_record(["RNC", self.store.rnc.as_str()])?;
            writer.write_record(["Reporte", report.report_type().title()])?;
            writer.write_record(["Período", period_label(report).as_str()])?;
            writer.write_record(["Generado", format_date(generated_on).as_str()])?;

            for section in report_sections(report) {
                writer.write_record([""])?;
                writer.write_record([section.title.as_str()])?;
                writer.write_record(section.headers())?;
                for row in &section.rows {
                    writer.write_record(row)?;
                }
            }
            writer.flush()?;
        }
        Ok(buffer)
    }
}
