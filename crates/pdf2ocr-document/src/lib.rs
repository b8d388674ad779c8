// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdf2ocr-document — The document-side collaborators of the batch engine.
//
// Provides page counting and merging (lopdf), rasterization (pdftoppm), text
// recognition (tesseract), the output writers (text PDF, DOCX, HTML), e-book
// conversion (Calibre), and layout-preserving searchable PDF assembly.

pub mod ebook;
pub mod layout;
pub mod pdf;
pub mod preprocess;
pub mod render;
pub mod tesseract;
pub mod text;
pub mod tools;
pub mod traits;
pub mod writers;

pub use ebook::CalibreConverter;
pub use layout::LayoutAssembler;
pub use pdf::reader::{LopdfPageCounter, PdfReader};
pub use pdf::writer::PdfWriter;
pub use render::PdftoppmRenderer;
pub use tesseract::TesseractEngine;
pub use traits::*;
pub use writers::docx::DocxWriter;
pub use writers::html::HtmlWriter;

