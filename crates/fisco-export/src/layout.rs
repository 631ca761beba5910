//! # Page Layout
//!
//! A4 portrait pages in millimetres, origin top-left. Every block takes the
//! cursor it starts at and returns the cursor where the next block goes; no
//! position is kept in shared state.
//!
//! ```text
//!  0 ┌──────────────────────────────┐
//!    │                              │
//! 20 │ ─ ─ ─ TOP_MARGIN ─ ─ ─ ─ ─ ─ │  content starts
//!    │                              │
//!    │   blocks, y grows downward   │
//!    │                              │
//! 260│ ─ ─ SECTION_BREAK_Y ─ ─ ─ ─ ─│  a new section past here starts a page
//! 280│ ─ ─ BOTTOM_MARGIN_Y ─ ─ ─ ─ ─│  nothing is drawn below
//! 290│        Página N de M         │  footer
//! 297└──────────────────────────────┘
//! ```

/// A4 width, mm.
pub const PAGE_WIDTH: f64 = 210.0;
/// A4 height, mm.
pub const PAGE_HEIGHT: f64 = 297.0;
pub const SIDE_MARGIN: f64 = 14.0;
pub const TOP_MARGIN: f64 = 20.0;
/// A section heading below this line moves to the next page.
pub const SECTION_BREAK_Y: f64 = 260.0;
/// Lowest y any content may reach.
pub const BOTTOM_MARGIN_Y: f64 = 280.0;
/// Footer baseline.
pub const FOOTER_Y: f64 = 290.0;

/// Width available between the side margins.
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * SIDE_MARGIN;

const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Where the next block goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub y: f64,
}

impl Cursor {
    pub fn top(page: usize) -> Self {
        Cursor { page, y: TOP_MARGIN }
    }

    pub fn advance(self, dy: f64) -> Self {
        Cursor { y: self.y + dy, ..self }
    }
}

/// Text style tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Heading,
    TableHead,
    Body,
    Footer,
}

impl TextStyle {
    /// Font size in points.
    pub fn size(&self) -> f64 {
        match self {
            TextStyle::Title => 16.0,
            TextStyle::Heading => 12.0,
            TextStyle::TableHead => 9.0,
            TextStyle::Body => 8.0,
            TextStyle::Footer => 8.0,
        }
    }

    pub fn bold(&self) -> bool {
        matches!(self, TextStyle::Title | TextStyle::Heading | TextStyle::TableHead)
    }
}

/// One drawing operation. `y` of text is its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        style: TextStyle,
        text: String,
    },
    /// Filled rectangle, `gray` in `[0, 1]`.
    Fill { x: f64, y: f64, w: f64, h: f64, gray: f64 },
    /// Horizontal rule.
    Rule { x: f64, y: f64, w: f64 },
}

impl DrawOp {
    /// Lowest y the operation touches.
    pub fn bottom(&self) -> f64 {
        match self {
            DrawOp::Text { y, .. } | DrawOp::Rule { y, .. } => *y,
            DrawOp::Fill { y, h, .. } => y + h,
        }
    }

    pub fn is_footer(&self) -> bool {
        matches!(self, DrawOp::Text { style: TextStyle::Footer, .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Pages under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pages: Vec<Page>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    pub fn new() -> Self {
        Layout {
            pages: vec![Page::default()],
        }
    }

    pub fn start(&self) -> Cursor {
        Cursor::top(0)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    /// Top of the page after `cursor`'s, creating it when needed.
    pub fn page_break(&mut self, cursor: Cursor) -> Cursor {
        let next = cursor.page + 1;
        while self.pages.len() <= next {
            self.pages.push(Page::default());
        }
        Cursor::top(next)
    }

    /// `cursor` if `height` still fits above the bottom margin, else a new page.
    pub fn reserve(&mut self, cursor: Cursor, height: f64) -> Cursor {
        if cursor.y + height > BOTTOM_MARGIN_Y {
            self.page_break(cursor)
        } else {
            cursor
        }
    }

    pub fn draw(&mut self, page: usize, op: DrawOp) {
        if let Some(p) = self.pages.get_mut(page) {
            p.ops.push(op);
        }
    }

    /// One line of text; returns the cursor below it.
    pub fn line(&mut self, cursor: Cursor, style: TextStyle, text: &str) -> Cursor {
        let height = line_height(style);
        let cursor = self.reserve(cursor, height);
        self.draw(
            cursor.page,
            DrawOp::Text {
                x: SIDE_MARGIN,
                y: cursor.y + height * 0.75,
                style,
                text: text.to_string(),
            },
        );
        cursor.advance(height)
    }

    /// Text centred on the page.
    pub fn centered(&mut self, cursor: Cursor, style: TextStyle, text: &str) -> Cursor {
        let height = line_height(style);
        let cursor = self.reserve(cursor, height);
        let width = text_width(text, style.size(), style.bold());
        self.draw(
            cursor.page,
            DrawOp::Text {
                x: ((PAGE_WIDTH - width) / 2.0).max(SIDE_MARGIN),
                y: cursor.y + height * 0.75,
                style,
                text: text.to_string(),
            },
        );
        cursor.advance(height)
    }

    /// Writes `Página N de M` on every page. Call once, after all content.
    pub fn stamp_footers(&mut self) {
        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            let text = format!("Página {} de {}", i + 1, total);
            let width = text_width(&text, TextStyle::Footer.size(), false);
            page.ops.push(DrawOp::Text {
                x: (PAGE_WIDTH - width) / 2.0,
                y: FOOTER_Y,
                style: TextStyle::Footer,
                text,
            });
        }
    }
}

/// Line height for a style, mm.
pub fn line_height(style: TextStyle) -> f64 {
    style.size() * MM_PER_POINT * 1.5
}

// =============================================================================
// Font Metrics
// =============================================================================

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Accented letters and anything else outside ASCII.
const DEFAULT_WIDTH: u16 = 556;

/// Bold faces run about 5 % wider.
const BOLD_FACTOR: f64 = 1.05;

/// Rendered width of `text` in mm.
pub fn text_width(text: &str, size_pt: f64, bold: bool) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                u32::from(DEFAULT_WIDTH)
            }
        })
        .sum();
    let factor = if bold { BOLD_FACTOR } else { 1.0 };
    f64::from(units) / 1000.0 * size_pt * MM_PER_POINT * factor
}
