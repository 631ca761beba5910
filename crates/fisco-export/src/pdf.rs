//! # PDF Serializer
//!
//! Writes laid-out pages as a PDF 1.4 file using the two standard Helvetica
//! faces, so no font data is embedded.
//!
//! ## File Structure
//! ```text
//! %PDF-1.4
//! 1 0 obj  Catalog ──► 2 0 obj Pages ──► Kids [page objects]
//! 3 0 obj  /F1 Helvetica       (WinAnsiEncoding)
//! 4 0 obj  /F2 Helvetica-Bold  (WinAnsiEncoding)
//! 5 0 obj  Info
//! then per page:  Page object, content stream
//! xref table (byte offsets) ─ trailer ─ startxref ─ %%EOF
//! ```
//!
//! Coordinates arrive in millimetres from the top-left corner and are
//! converted to points from the bottom-left.

use std::io::Write;

use crate::error::RenderResult;
use crate::layout::{DrawOp, Page, PAGE_HEIGHT, PAGE_WIDTH};

const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Objects before the first page: catalog, pages, two fonts, info.
const FIXED_OBJECTS: usize = 5;

fn pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// Serializes `pages`. Output depends only on the input.
pub fn write_pdf(pages: &[Page], title: &str) -> RenderResult<Vec<u8>> {
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();

    out.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;

    let page_ids: Vec<usize> = (0..pages.len()).map(|i| FIXED_OBJECTS + 1 + i * 2).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    begin_object(&mut out, &mut offsets, 1)?;
    out.write_all(b"<< /Type /Catalog /Pages 2 0 R >>\nendobj\n")?;

    begin_object(&mut out, &mut offsets, 2)?;
    write!(out, "<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n", kids, pages.len())?;

    begin_object(&mut out, &mut offsets, 3)?;
    out.write_all(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj\n")?;

    begin_object(&mut out, &mut offsets, 4)?;
    out.write_all(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>\nendobj\n",
    )?;

    begin_object(&mut out, &mut offsets, 5)?;
    out.write_all(b"<< /Producer (fisco-export) /Title (")?;
    out.write_all(&encode_text(title))?;
    out.write_all(b") >>\nendobj\n")?;

    for (page, page_id) in pages.iter().zip(&page_ids) {
        let content_id = page_id + 1;
        let stream = content_stream(page);

        begin_object(&mut out, &mut offsets, *page_id)?;
        write!(
            out,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>\nendobj\n",
            pt(PAGE_WIDTH),
            pt(PAGE_HEIGHT),
            content_id
        )?;

        begin_object(&mut out, &mut offsets, content_id)?;
        write!(out, "<< /Length {} >>\nstream\n", stream.len())?;
        out.write_all(&stream)?;
        out.write_all(b"\nendstream\nendobj\n")?;
    }

    let xref_start = out.len();
    write!(out, "xref\n0 {}\n", offsets.len() + 1)?;
    out.write_all(b"0000000000 65535 f \n")?;
    for offset in &offsets {
        write!(out, "{:010} 00000 n \n", offset)?;
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
        offsets.len() + 1,
        xref_start
    )?;

    Ok(out)
}

/// Objects are numbered in write order, so `id` is always `offsets.len() + 1`.
fn begin_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize) -> RenderResult<()> {
    offsets.push(out.len());
    write!(out, "{id} 0 obj\n")?;
    Ok(())
}

fn content_stream(page: &Page) -> Vec<u8> {
    let mut s: Vec<u8> = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Fill { x, y, w, h, gray } => {
                s.extend_from_slice(
                    format!(
                        "q {:.2} g {:.2} {:.2} {:.2} {:.2} re f Q\n",
                        gray,
                        pt(*x),
                        pt(PAGE_HEIGHT - y - h),
                        pt(*w),
                        pt(*h)
                    )
                    .as_bytes(),
                );
            }
            DrawOp::Rule { x, y, w } => {
                let y = pt(PAGE_HEIGHT - y);
                s.extend_from_slice(
                    format!(
                        "q 0.75 G 0.3 w {:.2} {:.2} m {:.2} {:.2} l S Q\n",
                        pt(*x),
                        y,
                        pt(x + w),
                        y
                    )
                    .as_bytes(),
                );
            }
            DrawOp::Text { x, y, style, text } => {
                let font = if style.bold() { "F2" } else { "F1" };
                s.extend_from_slice(
                    format!(
                        "BT /{} {:.1} Tf {:.2} {:.2} Td (",
                        font,
                        style.size(),
                        pt(*x),
                        pt(PAGE_HEIGHT - y)
                    )
                    .as_bytes(),
                );
                s.extend_from_slice(&encode_text(text));
                s.extend_from_slice(b") Tj ET\n");
            }
        }
    }
    s
}

/// WinAnsi bytes for a PDF literal string, escaped.
///
/// Latin-1 letters (á, ñ, ¿, ...) map to the same code; a few typographic
/// marks map into 0x80..0x9F; anything else becomes `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        };
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x20..=0x7E => out.push(byte),
            _ => out.extend_from_slice(format!("\\{:03o}", byte).as_bytes()),
        }
    }
    out
}
