// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pdf2ocr.

use thiserror::Error;

/// Top-level error type for all pdf2ocr operations.
#[derive(Debug, Error)]
pub enum Pdf2OcrError {
    // -- Page pipeline errors --
    #[error("page count failed: {0}")]
    PageCount(String),

    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("text recognition failed: {0}")]
    Recognition(String),

    #[error("layout-preserving PDF failed: {0}")]
    Layout(String),

    #[error("page result bookkeeping failed: {0}")]
    PageSlot(String),

    // -- Format writer errors --
    #[error("PDF generation failed: {0}")]
    PdfWrite(String),

    #[error("DOCX generation failed: {0}")]
    DocxWrite(String),

    #[error("HTML generation failed: {0}")]
    HtmlWrite(String),

    #[error("EPUB conversion failed: {0}")]
    EbookConvert(String),

    // -- Environment / configuration --
    #[error("required tool not found: {0}")]
    ToolMissing(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Run control --
    #[error("forced exit requested")]
    ForcedExit,
}

impl Pdf2OcrError {
    /// Name of the pipeline stage this error originated from.
    ///
    /// Used to annotate per-document failures, e.g.
    /// `Error in report.pdf during Recognition: ...`.
    pub fn origin(&self) -> &'static str {
        match self {
            Self::PageCount(_) => "PageCount",
            Self::Render(_) => "Render",
            Self::Recognition(_) => "Recognition",
            Self::Layout(_) => "Layout",
            Self::PageSlot(_) => "PageSlot",
            Self::PdfWrite(_) => "PdfWrite",
            Self::DocxWrite(_) => "DocxWrite",
            Self::HtmlWrite(_) => "HtmlWrite",
            Self::EbookConvert(_) => "EbookConvert",
            Self::ToolMissing(_) => "ToolMissing",
            Self::Config(_) => "Config",
            Self::Io(_) => "Io",
            Self::Serialization(_) => "Serialization",
            Self::ForcedExit => "ForcedExit",
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, Pdf2OcrError>;
