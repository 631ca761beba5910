//! # Table Layout
//!
//! The document renderer draws every section through a [`TableLayout`]. The
//! capability is built once at startup and handed to the renderer, which
//! checks it before laying out any report content.
//!
//! ## Column Widths
//! ```text
//! header keyword          weight
//! ──────────────────────  ──────
//! Cliente, Producto, ...    3.0    names and free text
//! Total, NCF, Fecha, ...    1.0    numbers and codes
//! anything else             1.5
//!
//! width = weight / Σweights × CONTENT_WIDTH, clamped to [15, 60] mm
//! ```
//!
//! ## Pagination
//! Rows are placed one at a time. A row that would cross the bottom margin
//! moves to a fresh page and the header row is repeated there.

use crate::error::{RenderError, RenderResult};
use crate::layout::{
    line_height, text_width, Cursor, DrawOp, Layout, TextStyle, BOTTOM_MARGIN_Y, CONTENT_WIDTH,
    SIDE_MARGIN, TOP_MARGIN,
};
use crate::sections::{Align, Section};

pub const MIN_COLUMN_WIDTH: f64 = 15.0;
pub const MAX_COLUMN_WIDTH: f64 = 60.0;

const HIGH_PRIORITY_WEIGHT: f64 = 3.0;
const LOW_PRIORITY_WEIGHT: f64 = 1.0;
const DEFAULT_WEIGHT: f64 = 1.5;

const HIGH_PRIORITY_KEYWORDS: &[&str] = &[
    "cliente",
    "producto",
    "descripción",
    "categoría",
    "cajero",
    "recomendación",
    "detalle",
    "concepto",
];

const LOW_PRIORITY_KEYWORDS: &[&str] = &[
    "total", "monto", "itbis", "ncf", "fecha", "hora", "tipo", "ventas", "unidades", "stock",
    "compras", "subtotal", "base", "cantidad", "código", "%", "actual", "máximo", "usados",
    "disponibles", "lealtad",
];

const CELL_PADDING: f64 = 1.5;
const ELLIPSIS: &str = "...";
/// Gap left below a table.
const TABLE_SPACING: f64 = 6.0;
const HEAD_FILL_GRAY: f64 = 0.85;

/// Lays out one section as a table and returns the cursor below it.
pub trait TableLayout: Send + Sync {
    /// Fails with [`RenderError::LayoutUnavailable`] when the layout cannot be used.
    fn check(&self) -> RenderResult<()>;

    fn draw_table(&self, layout: &mut Layout, cursor: Cursor, section: &Section) -> RenderResult<Cursor>;
}

/// Fixed-grid table layout with keyword-weighted columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTableLayout {
    available_width: f64,
    row_height: f64,
    head_height: f64,
}

impl Default for GridTableLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl GridTableLayout {
    pub fn new() -> Self {
        GridTableLayout {
            available_width: CONTENT_WIDTH,
            row_height: line_height(TextStyle::Body) + 1.5,
            head_height: line_height(TextStyle::TableHead) + 2.0,
        }
    }

    /// Overrides the horizontal budget, mm.
    pub fn with_width(mut self, width: f64) -> Self {
        self.available_width = width;
        self
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn head_height(&self) -> f64 {
        self.head_height
    }

    /// Column widths for the given headers.
    pub fn column_widths<'a>(&self, headers: impl IntoIterator<Item = &'a str>) -> Vec<f64> {
        let weights: Vec<f64> = headers.into_iter().map(header_weight).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Vec::new();
        }
        weights
            .iter()
            .map(|w| (w / total * self.available_width).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH))
            .collect()
    }

    fn draw_head(&self, layout: &mut Layout, cursor: Cursor, section: &Section, widths: &[f64]) -> Cursor {
        let table_width: f64 = widths.iter().sum();
        layout.draw(
            cursor.page,
            DrawOp::Fill {
                x: SIDE_MARGIN,
                y: cursor.y,
                w: table_width,
                h: self.head_height,
                gray: HEAD_FILL_GRAY,
            },
        );
        let baseline = cursor.y + self.head_height * 0.7;
        let mut x = SIDE_MARGIN;
        for (column, width) in section.columns.iter().zip(widths) {
            let text = fit_cell(&column.header, *width, TextStyle::TableHead, None);
            layout.draw(
                cursor.page,
                DrawOp::Text {
                    x: aligned_x(x, *width, &text, TextStyle::TableHead, column.align),
                    y: baseline,
                    style: TextStyle::TableHead,
                    text,
                },
            );
            x += width;
        }
        cursor.advance(self.head_height)
    }
}

impl TableLayout for GridTableLayout {
    fn check(&self) -> RenderResult<()> {
        if !self.available_width.is_finite() || self.available_width < MIN_COLUMN_WIDTH {
            return Err(RenderError::LayoutUnavailable(format!(
                "horizontal budget of {:.1}mm is below one column",
                self.available_width
            )));
        }
        if self.head_height + self.row_height > BOTTOM_MARGIN_Y - TOP_MARGIN {
            return Err(RenderError::LayoutUnavailable(
                "a header and one row do not fit on a page".to_string(),
            ));
        }
        Ok(())
    }

    fn draw_table(&self, layout: &mut Layout, cursor: Cursor, section: &Section) -> RenderResult<Cursor> {
        if section.columns.is_empty() {
            return Err(RenderError::LayoutFailed(format!("section '{}' has no columns", section.title)));
        }
        let widths = self.column_widths(section.headers());
        let table_width: f64 = widths.iter().sum();
        if table_width > self.available_width + 1e-6 {
            return Err(RenderError::LayoutFailed(format!(
                "section '{}' needs {:.1}mm, {:.1}mm available",
                section.title, table_width, self.available_width
            )));
        }

        // keep the header with at least one row
        let mut cursor = layout.reserve(cursor, self.head_height + self.row_height);
        cursor = self.draw_head(layout, cursor, section, &widths);

        for row in &section.rows {
            if cursor.y + self.row_height > BOTTOM_MARGIN_Y {
                cursor = layout.page_break(cursor);
                cursor = self.draw_head(layout, cursor, section, &widths);
            }
            let baseline = cursor.y + self.row_height * 0.7;
            let mut x = SIDE_MARGIN;
            for ((column, width), cell) in section.columns.iter().zip(&widths).zip(row) {
                let text = fit_cell(cell, *width, TextStyle::Body, column.max_chars);
                layout.draw(
                    cursor.page,
                    DrawOp::Text {
                        x: aligned_x(x, *width, &text, TextStyle::Body, column.align),
                        y: baseline,
                        style: TextStyle::Body,
                        text,
                    },
                );
                x += width;
            }
            cursor = cursor.advance(self.row_height);
            layout.draw(
                cursor.page,
                DrawOp::Rule {
                    x: SIDE_MARGIN,
                    y: cursor.y,
                    w: table_width,
                },
            );
        }

        Ok(cursor.advance(TABLE_SPACING))
    }
}

fn header_weight(header: &str) -> f64 {
    let header = header.to_lowercase();
    if HIGH_PRIORITY_KEYWORDS.iter().any(|k| header.contains(k)) {
        HIGH_PRIORITY_WEIGHT
    } else if LOW_PRIORITY_KEYWORDS.iter().any(|k| header.contains(k)) {
        LOW_PRIORITY_WEIGHT
    } else {
        DEFAULT_WEIGHT
    }
}

fn aligned_x(x: f64, width: f64, text: &str, style: TextStyle, align: Align) -> f64 {
    match align {
        Align::Left => x + CELL_PADDING,
        Align::Right => x + width - CELL_PADDING - text_width(text, style.size(), style.bold()),
    }
}

/// Cell text that fits `width`: unchanged when it fits, otherwise cut to at
/// most `max_chars` (including the ellipsis) and shortened until it fits.
pub fn fit_cell(text: &str, width: f64, style: TextStyle, max_chars: Option<usize>) -> String {
    let inner = width - 2.0 * CELL_PADDING;
    let measure = |s: &str| text_width(s, style.size(), style.bold());
    if measure(text) <= inner {
        return text.to_string();
    }

    let limit = max_chars
        .unwrap_or(usize::MAX)
        .saturating_sub(ELLIPSIS.len());
    let mut kept: String = text.chars().take(limit).collect();
    while !kept.is_empty() && measure(&format!("{}{}", kept.trim_end(), ELLIPSIS)) > inner {
        kept.pop();
    }
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}
