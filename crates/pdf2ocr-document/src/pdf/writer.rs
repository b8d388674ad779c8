// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — reflow recognized page text into a clean A4 PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::Path;
use std::time::Duration;

use pdf2ocr_core::OutputFormat;
use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::timer::Stopwatch;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, info, instrument};

use crate::text::{process_paragraphs, skip_leading_blank_pages, title_from_path};
use crate::traits::FormatWriter;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const FONT_SIZE_PT: f32 = 10.0;
const LINE_HEIGHT_PT: f32 = 12.0;
const LEFT_MARGIN_MM: f32 = 20.0;
const TOP_MARGIN_MM: f32 = 30.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const HEADER_OFFSET_MM: f32 = 10.0;

/// Lays recognized text out on A4 pages.
///
/// Every source page starts a new output page headed `pdf2ocr - Page N`;
/// long source pages continue onto further output pages with the same header.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Build a PDF from ordered page texts.
    ///
    /// Leading pages without text are skipped. A document with no text at all
    /// still produces one blank page.
    #[instrument(skip(self, pages), fields(pages = pages.len()))]
    pub fn create_from_pages(&self, pages: &[String], title: &str) -> Result<Vec<u8>> {
        let page_w = Mm(PAGE_WIDTH_MM);
        let page_h = Mm(PAGE_HEIGHT_MM);
        let page_h_pt = page_h.into_pt().0;
        let left_pt = Mm(LEFT_MARGIN_MM).into_pt().0;
        let top_pt = page_h_pt - Mm(TOP_MARGIN_MM).into_pt().0;
        let bottom_pt = Mm(BOTTOM_MARGIN_MM).into_pt().0;
        let header_pt = page_h_pt - Mm(HEADER_OFFSET_MM).into_pt().0;

        // Average Helvetica glyph width is roughly 0.50 * font size.
        let usable_width_pt = Mm(PAGE_WIDTH_MM - 2.0 * LEFT_MARGIN_MM).into_pt().0;
        let max_chars_per_line = (usable_width_pt / (0.50 * FONT_SIZE_PT)) as usize;

        let mut output_pages: Vec<PdfPage> = Vec::new();

        for (index, page_text) in skip_leading_blank_pages(pages).iter().enumerate() {
            let header = format!("pdf2ocr - Page {}", index + 1);
            let mut ops = Vec::new();
            push_line(&mut ops, &header, left_pt, header_pt);
            let mut y = top_pt;

            for paragraph in process_paragraphs(page_text) {
                for line in wrap_text(&paragraph, max_chars_per_line) {
                    if y < bottom_pt {
                        output_pages.push(PdfPage::new(page_w, page_h, std::mem::take(&mut ops)));
                        push_line(&mut ops, &header, left_pt, header_pt);
                        y = top_pt;
                    }
                    push_line(&mut ops, &line, left_pt, y);
                    y -= LINE_HEIGHT_PT;
                }
                y -= LINE_HEIGHT_PT;
            }

            output_pages.push(PdfPage::new(page_w, page_h, ops));
        }

        if output_pages.is_empty() {
            output_pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let mut doc = PdfDocument::new(title);
        doc.with_pages(output_pages);
        debug!(pages = doc.pages.len(), "Text layout complete");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }
}

impl FormatWriter for PdfWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn write(&self, pages: &[String], output: &Path) -> Result<Duration> {
        let mut watch = Stopwatch::start();
        let bytes = self.create_from_pages(pages, &title_from_path(output))?;
        std::fs::write(output, &bytes).map_err(|err| {
            Pdf2OcrError::PdfWrite(format!("cannot write {}: {}", output.display(), err))
        })?;
        info!("Wrote text PDF to {}", output.display());
        Ok(watch.stop())
    }
}

fn push_line(ops: &mut Vec<Op>, text: &str, x_pt: f32, y_pt: f32) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(x_pt),
            y: Pt(y_pt),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(FONT_SIZE_PT),
        font: BuiltinFont::Helvetica,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font: BuiltinFont::Helvetica,
    });
    ops.push(Op::EndTextSection);
}

// -- Text wrapping helper -----------------------------------------------------

/// Word-wrap a single paragraph so that no line exceeds `max_width`
/// characters. Words longer than `max_width` are force-broken.
fn wrap_text(paragraph: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut result = Vec::new();
    let mut current_line = String::with_capacity(max_width);

    for word in paragraph.split_whitespace() {
        let word_len = word.chars().count();
        let line_len = current_line.chars().count();

        if word_len > max_width {
            if !current_line.is_empty() {
                result.push(std::mem::take(&mut current_line));
            }
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(max_width).peekable();
            while let Some(chunk) = chunks.next() {
                let piece: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    result.push(piece);
                } else {
                    current_line = piece;
                }
            }
        } else if current_line.is_empty() {
            current_line.push_str(word);
        } else if line_len + 1 + word_len <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            result.push(std::mem::replace(&mut current_line, word.to_string()));
        }
    }

    if !current_line.is_empty() {
        result.push(current_line);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::PdfReader;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn wrap_force_breaks_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn one_output_page_per_short_source_page() {
        let pages = vec![String::new(), "first".to_string(), "second".to_string()];
        let bytes = PdfWriter::new()
            .create_from_pages(&pages, "doc")
            .expect("pdf");
        assert_eq!(PdfReader::from_bytes(&bytes).expect("load").page_count(), 2);
    }

    #[test]
    fn empty_document_still_has_a_page() {
        let bytes = PdfWriter::new().create_from_pages(&[], "empty").expect("pdf");
        assert_eq!(PdfReader::from_bytes(&bytes).expect("load").page_count(), 1);
    }

    #[test]
    fn long_page_continues_on_new_output_page() {
        let long = (0..400)
            .map(|i| format!("paragraph {i}"))
            .collect::<Vec<_>>()
            .join("\n\n");
        let bytes = PdfWriter::new().create_from_pages(&[long], "long").expect("pdf");
        assert!(PdfReader::from_bytes(&bytes).expect("load").page_count() > 1);
    }

    #[test]
    fn writes_file_and_reports_time() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out_ocr.pdf");
        PdfWriter::new()
            .write(&["hello".to_string()], &path)
            .expect("write");
        assert!(path.exists());
    }
}
