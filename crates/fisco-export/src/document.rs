//! # Document Renderer
//!
//! Lays a report out on A4 pages and serializes them as PDF.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        Store name            │
//! │  RNC: 101-00000-1 · address  │
//! │        Report title          │
//! │  Período: 01/01 - 31/01      │
//! │  Generado: 01/02/2024        │
//! │ ──────────────────────────── │
//! │ Section heading              │
//! │ ┌──────┬──────┬──────┐       │
//! │ │ head │ head │ head │       │
//! │ │ row  │ row  │ row  │       │
//! │ └──────┴──────┴──────┘       │
//! │       Página 1 de 2          │
//! └──────────────────────────────┘
//! ```

use chrono::NaiveDate;
use fisco_core::ReportResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RenderResult;
use crate::format::{format_date, period_label};
use crate::layout::{DrawOp, Layout, TextStyle, CONTENT_WIDTH, SECTION_BREAK_Y, SIDE_MARGIN};
use crate::pdf::write_pdf;
use crate::sections::report_sections;
use crate::table::TableLayout;

/// Business identity printed at the top of every document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    pub rnc: String,
    #[serde(default)]
    pub address: String,
}

/// Gap between the header block and the first section.
const HEADER_GAP: f64 = 4.0;
const HEADING_GAP: f64 = 1.0;

pub struct DocumentRenderer<L: TableLayout> {
    table: L,
    store: StoreInfo,
}

impl<L: TableLayout> DocumentRenderer<L> {
    pub fn new(table: L, store: StoreInfo) -> Self {
        DocumentRenderer { table, store }
    }

    pub fn store(&self) -> &StoreInfo {
        &self.store
    }

    /// PDF bytes for `report`.
    pub fn render(&self, report: &ReportResult, generated_on: NaiveDate) -> RenderResult<Vec<u8>> {
        let layout = self.layout(report, generated_on)?;
        debug!(pages = layout.page_count(), report_type = %report.report_type(), "document laid out");
        write_pdf(&layout.into_pages(), report.report_type().title())
    }

    /// Laid-out pages, footers included.
    ///
    /// The table layout is checked before anything is drawn, so an unusable
    /// layout never produces a partial document.
    pub fn layout(&self, report: &ReportResult, generated_on: NaiveDate) -> RenderResult<Layout> {
        self.table.check()?;

        let mut layout = Layout::new();
        let mut cursor = layout.start();

        cursor = layout.centered(cursor, TextStyle::Title, &self.store.name);
        cursor = layout.centered(cursor, TextStyle::Body, &format!("RNC: {}", self.store.rnc));
        if !self.store.address.is_empty() {
            cursor = layout.centered(cursor, TextStyle::Body, &self.store.address);
        }
        cursor = cursor.advance(HEADER_GAP);
        cursor = layout.centered(cursor, TextStyle::Heading, report.report_type().title());
        cursor = layout.centered(cursor, TextStyle::Body, &format!("Período: {}", period_label(report)));
        cursor = layout.centered(
            cursor,
            TextStyle::Body,
            &format!("Generado: {}", format_date(generated_on)),
        );
        cursor = cursor.advance(HEADER_GAP / 2.0);
        layout.draw(
            cursor.page,
            DrawOp::Rule {
                x: SIDE_MARGIN,
                y: cursor.y,
                w: CONTENT_WIDTH,
            },
        );
        cursor = cursor.advance(HEADER_GAP);

        for section in report_sections(report) {
            if cursor.y > SECTION_BREAK_Y {
                cursor = layout.page_break(cursor);
            }
            cursor = layout.line(cursor, TextStyle::Heading, &section.title);
            cursor = cursor.advance(HEADING_GAP);
            cursor = self.table.draw_table(&mut layout, cursor, &section)?;
        }

        layout.stamp_footers();
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::RenderError;
    use crate::layout::{Cursor, BOTTOM_MARGIN_Y};
    use crate::sections::fixtures::sample_daily_sales;
    use crate::sections::Section;
    use crate::table::GridTableLayout;
    use fisco_core::report::TopProduct;
    use fisco_core::Money;

    fn store() -> StoreInfo {
        StoreInfo {
            name: "Colmado La Esquina".into(),
            rnc: "101-00000-1".into(),
            address: "Calle El Conde 12, Santo Domingo".into(),
        }
    }

    fn generated_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn long_report() -> ReportResult {
        let ReportResult::DailySales(mut r) = sample_daily_sales() else {
            unreachable!()
        };
        r.top_products = (0..150)
            .map(|i| TopProduct {
                product_id: format!("p{i}"),
                name: format!("Producto {i}"),
                category: None,
                units_sold: 1,
                revenue: Money::from_cents(100),
            })
            .collect();
        ReportResult::DailySales(r)
    }

    fn texts(layout: &Layout) -> Vec<String> {
        layout
            .pages()
            .iter()
            .flat_map(|p| p.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_header() {
        let renderer = DocumentRenderer::new(GridTableLayout::new(), store());
        let layout = renderer.layout(&sample_daily_sales(), generated_on()).unwrap();
        let texts = texts(&layout);
        assert_eq!(texts[0], "Colmado La Esquina");
        assert!(texts.contains(&"RNC: 101-00000-1".to_string()));
        assert!(texts.contains(&"Reporte de Ventas".to_string()));
        assert!(texts.contains(&"Período: 01/01/2024 - 31/01/2024".to_string()));
        assert!(texts.contains(&"Generado: 01/02/2024".to_string()));
    }

    #[test]
    fn test_long_report_stays_within_margins() {
        let renderer = DocumentRenderer::new(GridTableLayout::new(), store());
        let layout = renderer.layout(&long_report(), generated_on()).unwrap();

        let total = layout.page_count();
        assert!(total > 2);
        for (i, page) in layout.pages().iter().enumerate() {
            for op in page.ops.iter().filter(|op| !op.is_footer()) {
                assert!(op.bottom() <= BOTTOM_MARGIN_Y, "page {} op {:?}", i + 1, op);
            }
            let footer = format!("Página {} de {}", i + 1, total);
            assert!(page
                .ops
                .iter()
                .any(|op| matches!(op, DrawOp::Text { text, .. } if *text == footer)));
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let renderer = DocumentRenderer::new(GridTableLayout::new(), store());
        let pdf = renderer.render(&sample_daily_sales(), generated_on()).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert!(String::from_utf8_lossy(&pdf).contains("/Count 1"));
    }

    struct UnavailableLayout {
        drawn: AtomicUsize,
    }

    impl TableLayout for UnavailableLayout {
        fn check(&self) -> RenderResult<()> {
            Err(RenderError::LayoutUnavailable("no table support".into()))
        }

        fn draw_table(&self, _: &mut Layout, cursor: Cursor, _: &Section) -> RenderResult<Cursor> {
            self.drawn.fetch_add(1, Ordering::SeqCst);
            Ok(cursor)
        }
    }

    #[test]
    fn test_unavailable_layout_aborts_before_content() {
        let renderer = DocumentRenderer::new(
            UnavailableLayout {
                drawn: AtomicUsize::new(0),
            },
            store(),
        );
        let err = renderer.render(&sample_daily_sales(), generated_on()).unwrap_err();
        assert!(matches!(err, RenderError::LayoutUnavailable(_)));
        assert_eq!(renderer.table.drawn.load(Ordering::SeqCst), 0);
    }
}
