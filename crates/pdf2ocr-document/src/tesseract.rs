// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition through the `tesseract` command-line tool.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use pdf2ocr_core::config::LAYOUT_DPI;
use pdf2ocr_core::error::{Pdf2OcrError, Result};
use tracing::{debug, instrument};

use crate::preprocess::prepare_for_recognition;
use crate::text::clean_portuguese;
use crate::tools::{TESSERACT, run_checked};
use crate::traits::{RecognitionEngine, SearchablePageEngine};

/// Recognition engine backed by the `tesseract` binary.
///
/// Each call writes the page image to a private scratch directory, so the
/// engine is safe to share between worker threads.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
}

impl TesseractEngine {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(TESSERACT),
        }
    }

    /// Use a specific `tesseract` binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, image: &Path, output_base: &Path, lang: &str, args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(image)
            .arg(output_base)
            .arg("-l")
            .arg(lang)
            .args(args);
        command
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionEngine for TesseractEngine {
    #[instrument(skip_all, fields(lang = %lang, width = page.width(), height = page.height()))]
    fn recognize(&self, page: &DynamicImage, lang: &str, engine_args: &[String]) -> Result<String> {
        let scratch = tempfile::tempdir().map_err(|err| {
            Pdf2OcrError::Recognition(format!("cannot create scratch dir: {err}"))
        })?;
        let image_path = scratch.path().join("page.png");
        prepare_for_recognition(page)
            .save(&image_path)
            .map_err(|err| Pdf2OcrError::Recognition(format!("cannot save page image: {err}")))?;

        let output = run_checked(
            &mut self.command(&image_path, Path::new("stdout"), lang, engine_args),
            Pdf2OcrError::Recognition,
        )?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "Page recognized");

        if lang.eq_ignore_ascii_case("por") {
            Ok(clean_portuguese(&text))
        } else {
            Ok(text)
        }
    }
}

impl SearchablePageEngine for TesseractEngine {
    #[instrument(skip_all, fields(lang = %lang, width = page.width(), height = page.height()))]
    fn page_pdf(&self, page: &DynamicImage, lang: &str, engine_args: &[String]) -> Result<Vec<u8>> {
        let scratch = tempfile::tempdir()
            .map_err(|err| Pdf2OcrError::Layout(format!("cannot create scratch dir: {err}")))?;
        let image_path = scratch.path().join("page.png");
        let output_base = scratch.path().join("page");
        page.save(&image_path)
            .map_err(|err| Pdf2OcrError::Layout(format!("cannot save page image: {err}")))?;

        let mut command = self.command(&image_path, &output_base, lang, engine_args);
        command.arg("--dpi").arg(LAYOUT_DPI.to_string()).arg("pdf");
        run_checked(&mut command, Pdf2OcrError::Layout)?;

        let bytes = std::fs::read(output_base.with_extension("pdf"))
            .map_err(|err| Pdf2OcrError::Layout(format!("tesseract produced no PDF: {err}")))?;
        debug!(bytes = bytes.len(), "Searchable page built");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_orders_arguments() {
        let engine = TesseractEngine::new();
        let args = vec!["--oem".to_string(), "3".to_string()];
        let command = engine.command(Path::new("in.png"), Path::new("stdout"), "eng", &args);
        let rendered: Vec<String> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(rendered, vec!["in.png", "stdout", "-l", "eng", "--oem", "3"]);
    }

    #[test]
    fn missing_binary_is_a_recognition_error() {
        let engine = TesseractEngine::with_program("/no/such/tesseract");
        let page = DynamicImage::new_luma8(4, 4);
        let err = engine.recognize(&page, "eng", &[]).expect_err("should fail");
        assert_eq!(err.origin(), "Recognition");
    }
}
