//! # fisco-export: Export Renderer
//!
//! Renders a [`ReportResult`](fisco_core::ReportResult) to PDF or CSV bytes.
//! Nothing here touches the filesystem or the store.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ReportResult                                                           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  sections.rs   report → titled tables (es-DO formatting, format.rs)     │
//! │      │                                                                  │
//! │      ├──► document.rs ─► layout.rs + table.rs ─► pdf.rs ─► PDF bytes    │
//! │      │        (header, pagination, footers)                             │
//! │      │                                                                  │
//! │      └──► csv_renderer.rs ───────────────────────────────► CSV bytes    │
//! │                                                                         │
//! │  exporter.rs wraps both: bytes + content type + filename                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let exporter = Exporter::new(GridTableLayout::new(), store);
//! let out = exporter.export(&report, ExportFormat::Pdf, today)?;
//! std::fs::write(&out.filename, &out.bytes)?;
//! ```

pub mod csv_renderer;
pub mod document;
pub mod error;
pub mod exporter;
pub mod format;
pub mod layout;
pub mod pdf;
pub mod sections;
pub mod table;

pub use document::{DocumentRenderer, StoreInfo};
pub use error::{RenderError, RenderResult};
pub use exporter::{export_filename, ExportFormat, ExportedReport, Exporter};
pub use table::{GridTableLayout, TableLayout};
