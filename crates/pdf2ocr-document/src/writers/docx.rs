// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX writer — reflowed paragraphs in Calibri 11pt via `docx-rs`.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use docx_rs::{Docx, Paragraph, Run, RunFonts};
use pdf2ocr_core::OutputFormat;
use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::timer::Stopwatch;
use tracing::{debug, instrument};

use crate::text::document_paragraphs;
use crate::traits::FormatWriter;

const FONT: &str = "Calibri";
/// Half-points, i.e. 11pt.
const FONT_SIZE_HALF_POINTS: usize = 22;

/// Writes recognized text as a word-processor document.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxWriter;

impl DocxWriter {
    pub fn new() -> Self {
        Self
    }

    /// Build the document model: one paragraph per cleaned paragraph.
    pub fn build(&self, pages: &[String]) -> Docx {
        let fonts = RunFonts::new().ascii(FONT).hi_ansi(FONT).cs(FONT);
        let mut docx = Docx::new()
            .default_fonts(fonts)
            .default_size(FONT_SIZE_HALF_POINTS);

        for paragraph in document_paragraphs(pages) {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(paragraph)));
        }
        docx
    }
}

impl FormatWriter for DocxWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    #[instrument(skip_all, fields(output = %output.display(), pages = pages.len()))]
    fn write(&self, pages: &[String], output: &Path) -> Result<Duration> {
        let mut watch = Stopwatch::start();
        let file = File::create(output).map_err(|err| {
            Pdf2OcrError::DocxWrite(format!("cannot create {}: {}", output.display(), err))
        })?;
        self.build(pages)
            .build()
            .pack(file)
            .map_err(|err| Pdf2OcrError::DocxWrite(format!("cannot pack DOCX: {}", err)))?;
        debug!("DOCX written");
        Ok(watch.stop())
    }
}
