// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// E-book conversion through Calibre's `ebook-convert`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::lang::calibre_language;
use pdf2ocr_core::timer::Stopwatch;
use tracing::{debug, instrument, warn};

use crate::text::title_from_path;
use crate::tools::EBOOK_CONVERT;
use crate::traits::{EbookConverter, EbookOutcome};

/// [`EbookConverter`] that runs `ebook-convert <docx> <epub> ...`.
#[derive(Debug, Clone)]
pub struct CalibreConverter {
    program: PathBuf,
}

impl CalibreConverter {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(EBOOK_CONVERT),
        }
    }

    /// Use a specific `ebook-convert` binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to the converter for one document.
    pub fn arguments(&self, source: &Path, output: &Path, lang: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            source.into(),
            output.into(),
            "--title".into(),
            title_from_path(output).into(),
            "--authors".into(),
            "pdf2ocr".into(),
            "--comments".into(),
            "Converted by pdf2ocr".into(),
            "--level1-toc".into(),
            "//h:h1".into(),
        ];
        if let Some(calibre) = calibre_language(lang) {
            args.push("--language".into());
            args.push(calibre.into());
        }
        args
    }
}

impl Default for CalibreConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl EbookConverter for CalibreConverter {
    #[instrument(skip_all, fields(source = %source.display(), output = %output.display()))]
    fn convert(&self, source: &Path, output: &Path, lang: &str) -> Result<EbookOutcome> {
        let mut watch = Stopwatch::start();
        let result = Command::new(&self.program)
            .args(self.arguments(source, output, lang))
            .output()
            .map_err(|err| {
                Pdf2OcrError::EbookConvert(format!(
                    "cannot run {}: {}",
                    self.program.display(),
                    err
                ))
            })?;

        let mut tool_output = String::from_utf8_lossy(&result.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&result.stderr);
        if !stderr.trim().is_empty() {
            if !tool_output.is_empty() {
                tool_output.push('\n');
            }
            tool_output.push_str(stderr.trim());
        }

        let success = result.status.success();
        if success {
            debug!("E-book converted");
        } else {
            warn!(status = %result.status, "ebook-convert failed");
        }

        Ok(EbookOutcome {
            success,
            elapsed: watch.stop(),
            tool_output,
        })
    }
}
