// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterization through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::types::PageBatch;
use tracing::{debug, instrument};

use crate::tools::{PDFTOPPM, run_checked};
use crate::traits::PageRenderer;

/// [`PageRenderer`] that shells out to `pdftoppm` and decodes the PNG pages.
///
/// Rendered files live in a scratch directory that is removed before
/// returning; only the decoded images stay in memory.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    program: PathBuf,
}

impl PdftoppmRenderer {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(PDFTOPPM),
        }
    }

    /// Use a specific `pdftoppm` binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer for PdftoppmRenderer {
    #[instrument(skip_all, fields(document = %document.display(), batch = %batch, dpi = dpi))]
    fn render(&self, document: &Path, batch: PageBatch, dpi: u32) -> Result<Vec<DynamicImage>> {
        let scratch = tempfile::tempdir()
            .map_err(|err| Pdf2OcrError::Render(format!("cannot create scratch dir: {err}")))?;
        let prefix = scratch.path().join("page");

        run_checked(
            Command::new(&self.program)
                .arg("-r")
                .arg(dpi.to_string())
                .arg("-f")
                .arg(batch.first.to_string())
                .arg("-l")
                .arg(batch.last.to_string())
                .arg("-png")
                .arg(document)
                .arg(&prefix),
            Pdf2OcrError::Render,
        )?;

        let mut files: Vec<PathBuf> = std::fs::read_dir(scratch.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        // pdftoppm zero-pads page numbers to a common width.
        files.sort();

        if files.len() != batch.len() as usize {
            return Err(Pdf2OcrError::Render(format!(
                "expected {} page images for pages {}, got {}",
                batch.len(),
                batch,
                files.len()
            )));
        }

        let images = files
            .iter()
            .map(|path| {
                image::open(path).map_err(|err| {
                    Pdf2OcrError::Render(format!("cannot decode {}: {}", path.display(), err))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(pages = images.len(), "Batch rendered");
        Ok(images)
    }
}
