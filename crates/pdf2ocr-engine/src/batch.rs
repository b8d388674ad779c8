// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-batch processor — renders a document in bounded page batches and maps
// every page image to a per-page product (recognized text, or a searchable
// single-page PDF in layout mode), stored by page number.

use std::path::Path;

use image::DynamicImage;
use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::types::{PageBatch, plan_batches};
use pdf2ocr_document::{PageCounter, PageRenderer, RecognitionEngine};
use tracing::{debug, instrument};

// -- Positional page results --------------------------------------------------

/// Pre-sized per-page results, written by page number exactly once.
///
/// Unwritten slots hold `T::default()`. The parallel `written` flags let
/// callers check coverage.
#[derive(Debug, Clone)]
pub struct PageResults<T> {
    slots: Vec<T>,
    written: Vec<bool>,
}

impl<T: Default> PageResults<T> {
    pub fn new(total_pages: u32) -> Self {
        let len = total_pages as usize;
        Self {
            slots: std::iter::repeat_with(T::default).take(len).collect(),
            written: vec![false; len],
        }
    }

    /// Store the product of 1-based `page`.
    ///
    /// # Errors
    ///
    /// Returns [`Pdf2OcrError::PageSlot`] if `page` is outside the document or
    /// was already written.
    pub fn write(&mut self, page: u32, value: T) -> Result<()> {
        let index = self.index_of(page)?;
        if self.written[index] {
            return Err(Pdf2OcrError::PageSlot(format!("page {page} written twice")));
        }
        self.slots[index] = value;
        self.written[index] = true;
        Ok(())
    }

    fn index_of(&self, page: u32) -> Result<usize> {
        let len = self.slots.len();
        match (page as usize).checked_sub(1) {
            Some(index) if index < len => Ok(index),
            _ => Err(Pdf2OcrError::PageSlot(format!(
                "page {page} outside 1..={len}"
            ))),
        }
    }
}

impl<T> PageResults<T> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_written(&self, page: u32) -> bool {
        (page as usize)
            .checked_sub(1)
            .and_then(|index| self.written.get(index).copied())
            .unwrap_or(false)
    }

    /// True when every page has been written.
    pub fn is_complete(&self) -> bool {
        self.written.iter().all(|w| *w)
    }

    /// 1-based page numbers that have not been written.
    pub fn missing_pages(&self) -> Vec<u32> {
        self.written
            .iter()
            .enumerate()
            .filter(|(_, written)| !**written)
            .map(|(index, _)| index as u32 + 1)
            .collect()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }

    pub fn into_pages(self) -> Vec<T> {
        self.slots
    }
}

// -- Processor ----------------------------------------------------------------

/// Outcome of processing one document.
#[derive(Debug, Clone)]
pub struct BatchOutcome<T> {
    pub pages: PageResults<T>,
    /// The batches rendered, in order.
    pub batches: Vec<PageBatch>,
}

/// Recognized text of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedDocument {
    /// One entry per page, in page order.
    pub pages: Vec<String>,
    /// All pages joined by a blank line.
    pub text: String,
    pub batches: Vec<PageBatch>,
}

/// Drives rendering batch by batch so that at most one batch of page images is
/// alive at a time.
pub struct BatchProcessor<'a> {
    counter: &'a dyn PageCounter,
    renderer: &'a dyn PageRenderer,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(counter: &'a dyn PageCounter, renderer: &'a dyn PageRenderer) -> Self {
        Self { counter, renderer }
    }

    /// Render `document` in batches of `batch_size` pages (all at once when
    /// `None`) and map each page through `per_page`.
    ///
    /// # Errors
    ///
    /// The first page-count, render, or `per_page` failure aborts the whole
    /// document; nothing is retried.
    #[instrument(skip_all, fields(document = %document.display(), batch_size = ?batch_size, dpi = dpi))]
    pub fn process<T, F>(
        &self,
        document: &Path,
        batch_size: Option<u32>,
        dpi: u32,
        mut per_page: F,
    ) -> Result<BatchOutcome<T>>
    where
        T: Default,
        F: FnMut(u32, &DynamicImage) -> Result<T>,
    {
        let total_pages = self.counter.page_count(document)?;
        let batches = plan_batches(total_pages, batch_size);
        let mut pages = PageResults::new(total_pages);
        debug!(total_pages, batches = batches.len(), "Planned page batches");

        for batch in &batches {
            let images = self.renderer.render(document, *batch, dpi)?;
            if images.len() != batch.len() as usize {
                return Err(Pdf2OcrError::Render(format!(
                    "renderer returned {} images for pages {}",
                    images.len(),
                    batch
                )));
            }

            for (page, image) in batch.pages().zip(images.iter()) {
                let product = per_page(page, image)?;
                pages.write(page, product)?;
            }

            drop(images);
            debug!(batch = %batch, "Batch processed and released");
        }

        Ok(BatchOutcome { pages, batches })
    }

    /// Recognize the text of every page of `document`.
    pub fn recognize(
        &self,
        document: &Path,
        engine: &dyn RecognitionEngine,
        lang: &str,
        engine_args: &[String],
        batch_size: Option<u32>,
        dpi: u32,
    ) -> Result<RecognizedDocument> {
        let outcome = self.process(document, batch_size, dpi, |_, image| {
            engine.recognize(image, lang, engine_args)
        })?;
        let pages = outcome.pages.into_pages();
        let text = pages.join("\n\n");
        Ok(RecognizedDocument {
            pages,
            text,
            batches: outcome.batches,
        })
    }
}
