// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout-preserving searchable PDF assembly: merge per-page searchable PDFs
// and compress the result with Ghostscript when it is available.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::timer::Stopwatch;
use tracing::{info, instrument, warn};

use crate::pdf::reader::PdfReader;
use crate::pdf::writer::PdfWriter;
use crate::tools::{GHOSTSCRIPT, find_executable, run_checked};

/// Combines per-page searchable PDFs into the final document.
#[derive(Debug, Clone)]
pub struct LayoutAssembler {
    ghostscript: Option<PathBuf>,
}

impl LayoutAssembler {
    /// Use Ghostscript from `PATH` if present.
    pub fn new() -> Self {
        Self {
            ghostscript: find_executable(GHOSTSCRIPT),
        }
    }

    /// Skip compression and keep the merged PDF as is.
    pub fn without_compression() -> Self {
        Self { ghostscript: None }
    }

    /// Merge `pages` (one single-page PDF each, in page order) into `output`.
    ///
    /// Returns the time spent merging and compressing.
    #[instrument(skip_all, fields(pages = pages.len(), output = %output.display()))]
    pub fn assemble(&self, pages: &[Vec<u8>], output: &Path) -> Result<Duration> {
        let mut watch = Stopwatch::start();

        let merged = match pages.split_first() {
            Some((first, rest)) => {
                let rest: Vec<&[u8]> = rest.iter().map(Vec::as_slice).collect();
                PdfReader::from_bytes(first)?.merge(&rest)?
            }
            None => PdfWriter::new().create_from_pages(&[], "")?,
        };

        match &self.ghostscript {
            Some(gs) => {
                let temp_path = temp_path_for(output);
                std::fs::write(&temp_path, &merged)?;
                let compressed = compress(gs, &temp_path, output);
                if let Err(err) = compressed {
                    warn!(%err, "Ghostscript compression failed, keeping uncompressed PDF");
                    std::fs::rename(&temp_path, output)?;
                } else if let Err(err) = std::fs::remove_file(&temp_path) {
                    warn!(%err, path = %temp_path.display(), "Failed to remove temporary PDF");
                }
            }
            None => std::fs::write(output, &merged)?,
        }

        info!("Layout-preserving PDF written to {}", output.display());
        Ok(watch.stop())
    }
}

impl Default for LayoutAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// `<stem>_temp.pdf` next to `output`.
fn temp_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}_temp.pdf"))
}

fn compress(gs: &Path, input: &Path, output: &Path) -> Result<()> {
    let mut out_arg = std::ffi::OsString::from("-sOutputFile=");
    out_arg.push(output);
    run_checked(
        Command::new(gs)
            .arg("-sDEVICE=pdfwrite")
            .arg("-dCompatibilityLevel=1.4")
            .arg("-dPDFSETTINGS=/ebook")
            .arg("-dNOPAUSE")
            .arg("-dQUIET")
            .arg("-dBATCH")
            .arg(out_arg)
            .arg(input),
        Pdf2OcrError::Layout,
    )?;
    Ok(())
}
