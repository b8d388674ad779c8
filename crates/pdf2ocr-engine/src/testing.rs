// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory collaborators for engine tests.
//
// Rendered pages are tiny images whose width is the page number and whose
// height is a per-document tag, so recognizers can tell pages and documents
// apart without any real rasterization.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use image::DynamicImage;
use pdf2ocr_core::OutputFormat;
use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::types::PageBatch;
use pdf2ocr_document::{
    EbookConverter, EbookOutcome, FormatWriter, PageCounter, PageRenderer, RecognitionEngine,
    SearchablePageEngine,
};

use crate::shutdown::ShutdownSignal;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Same page count for every document.
#[derive(Debug, Default)]
pub struct StaticPageCounter {
    pages: u32,
}

impl StaticPageCounter {
    pub fn uniform(pages: u32) -> Self {
        Self { pages }
    }
}

impl PageCounter for StaticPageCounter {
    fn page_count(&self, _document: &Path) -> Result<u32> {
        Ok(self.pages)
    }
}

/// Renders `width = page number`, `height = document tag` (default 1).
#[derive(Debug, Default)]
pub struct PageSizedRenderer {
    tags: HashMap<String, u32>,
    calls: Mutex<Vec<PageBatch>>,
}

impl PageSizedRenderer {
    pub fn tagged(mut self, document: &str, tag: u32) -> Self {
        self.tags.insert(document.to_string(), tag);
        self
    }

    pub fn calls(&self) -> Vec<PageBatch> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl PageRenderer for PageSizedRenderer {
    fn render(&self, document: &Path, batch: PageBatch, _dpi: u32) -> Result<Vec<DynamicImage>> {
        self.calls.lock().expect("calls lock").push(batch);
        let tag = self.tags.get(&file_name(document)).copied().unwrap_or(1);
        Ok(batch
            .pages()
            .map(|page| DynamicImage::new_luma8(page, tag))
            .collect())
    }
}

/// Returns `"page N"`, optionally failing or panicking on one page of
/// tagged documents.
#[derive(Debug, Default)]
pub struct PageNumberRecognizer {
    fail_on: Option<(u32, Option<u32>)>,
    panic_on_tag: Option<u32>,
}

impl PageNumberRecognizer {
    pub fn failing_on(page: u32) -> Self {
        Self {
            fail_on: Some((page, None)),
            panic_on_tag: None,
        }
    }

    pub fn failing_on_tagged(page: u32, tag: u32) -> Self {
        Self {
            fail_on: Some((page, Some(tag))),
            panic_on_tag: None,
        }
    }

    pub fn panicking_on_tag(tag: u32) -> Self {
        Self {
            fail_on: None,
            panic_on_tag: Some(tag),
        }
    }
}

impl RecognitionEngine for PageNumberRecognizer {
    fn recognize(&self, page: &DynamicImage, _lang: &str, _args: &[String]) -> Result<String> {
        let (number, tag) = (page.width(), page.height());
        if self.panic_on_tag == Some(tag) {
            panic!("recognizer crashed on page {number}");
        }
        if let Some((fail_page, fail_tag)) = self.fail_on
            && fail_page == number
            && fail_tag.is_none_or(|t| t == tag)
        {
            return Err(Pdf2OcrError::Recognition(format!(
                "engine gave up on page {number}"
            )));
        }
        Ok(format!("page {number}"))
    }
}

/// Requests shutdown when it sees a page of the tagged document, then blocks
/// until the test releases it.
pub struct ShutdownTriggerRecognizer {
    signal: &'static ShutdownSignal,
    tag: u32,
    gate: Mutex<Receiver<()>>,
}

impl ShutdownTriggerRecognizer {
    pub fn new(signal: &'static ShutdownSignal, tag: u32, gate: Receiver<()>) -> Self {
        Self {
            signal,
            tag,
            gate: Mutex::new(gate),
        }
    }
}

impl RecognitionEngine for ShutdownTriggerRecognizer {
    fn recognize(&self, page: &DynamicImage, _lang: &str, _args: &[String]) -> Result<String> {
        if page.height() == self.tag {
            self.signal.request();
            let _ = self.gate.lock().expect("gate lock").recv();
        }
        Ok(format!("page {}", page.width()))
    }
}

/// Produces a fake one-page "PDF" holding the page number.
#[derive(Debug, Default)]
pub struct FakeSearchablePages;

impl SearchablePageEngine for FakeSearchablePages {
    fn page_pdf(&self, page: &DynamicImage, _lang: &str, _args: &[String]) -> Result<Vec<u8>> {
        Ok(format!("%PDF page {}", page.width()).into_bytes())
    }
}

/// Records every write instead of touching the filesystem.
#[derive(Debug)]
pub struct RecordingWriter {
    format: OutputFormat,
    writes: Mutex<Vec<(PathBuf, Vec<String>)>>,
    fail: bool,
}

impl RecordingWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            writes: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing(format: OutputFormat) -> Self {
        Self {
            fail: true,
            ..Self::new(format)
        }
    }

    pub fn writes(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.writes.lock().expect("writes lock").clone()
    }
}

impl FormatWriter for RecordingWriter {
    fn format(&self) -> OutputFormat {
        self.format
    }

    fn write(&self, pages: &[String], output: &Path) -> Result<Duration> {
        if self.fail {
            return Err(Pdf2OcrError::HtmlWrite(format!(
                "cannot write {}",
                output.display()
            )));
        }
        self.writes
            .lock()
            .expect("writes lock")
            .push((output.to_path_buf(), pages.to_vec()));
        Ok(Duration::from_millis(1))
    }
}

/// E-book converter with a fixed outcome.
#[derive(Debug)]
pub struct FakeEbook {
    success: bool,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FakeEbook {
    pub fn succeeding() -> Self {
        Self {
            success: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            success: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl EbookConverter for FakeEbook {
    fn convert(&self, source: &Path, output: &Path, _lang: &str) -> Result<EbookOutcome> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((source.to_path_buf(), output.to_path_buf()));
        Ok(EbookOutcome {
            success: self.success,
            elapsed: Duration::from_millis(1),
            tool_output: if self.success {
                "EPUB output written".into()
            } else {
                "Conversion error: bad input".into()
            },
        })
    }
}
