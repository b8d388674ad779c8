// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator traits for the per-document pipeline.
//
// The orchestration engine only talks to these traits. Production
// implementations shell out to native tools or use the PDF/image crates;
// tests substitute in-memory fakes.

use std::path::Path;
use std::time::Duration;

use image::DynamicImage;
use pdf2ocr_core::OutputFormat;
use pdf2ocr_core::error::Result;
use pdf2ocr_core::types::PageBatch;

/// Reads the page count of a document without rendering it.
pub trait PageCounter: Send + Sync {
    fn page_count(&self, document: &Path) -> Result<u32>;
}

/// Rasterizes a contiguous page range.
pub trait PageRenderer: Send + Sync {
    /// Render `batch` at `dpi`, returning one image per page in page order.
    fn render(&self, document: &Path, batch: PageBatch, dpi: u32) -> Result<Vec<DynamicImage>>;
}

/// Extracts text from a single page image.
pub trait RecognitionEngine: Send + Sync {
    fn recognize(&self, page: &DynamicImage, lang: &str, engine_args: &[String]) -> Result<String>;
}

/// Produces a single-page searchable PDF (page image plus invisible text layer).
pub trait SearchablePageEngine: Send + Sync {
    fn page_pdf(&self, page: &DynamicImage, lang: &str, engine_args: &[String]) -> Result<Vec<u8>>;
}

/// Writes ordered page texts into one output document.
pub trait FormatWriter: Send + Sync {
    /// The format this writer produces.
    fn format(&self) -> OutputFormat;

    /// Write `pages` to `output`, returning the time spent.
    fn write(&self, pages: &[String], output: &Path) -> Result<Duration>;
}

/// Result of one e-book conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbookOutcome {
    pub success: bool,
    pub elapsed: Duration,
    /// Combined stdout/stderr of the converter.
    pub tool_output: String,
}

/// Converts an intermediate word-processor document into an e-book.
pub trait EbookConverter: Send + Sync {
    fn convert(&self, source: &Path, output: &Path, lang: &str) -> Result<EbookOutcome>;
}
