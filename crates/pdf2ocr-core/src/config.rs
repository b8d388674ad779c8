// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration: source/destination, language, formats, concurrency, and
// the auto-corrections applied before a run starts.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Pdf2OcrError, Result};
use crate::types::{OutputFormat, OutputPolicy, RunSettings};

/// Engine configuration for the default (reflowed text) mode.
pub const TESSERACT_DEFAULT_CONFIG: &[&str] = &["--oem", "3", "--psm", "1"];
/// Engine configuration for layout-preserving mode.
pub const TESSERACT_LAYOUT_CONFIG: &[&str] = &["--oem", "1", "--psm", "11"];
/// Rasterization resolution used in layout-preserving mode.
pub const LAYOUT_DPI: u32 = 200;

/// Settings for one batch conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Directory containing the input PDFs.
    pub source_dir: PathBuf,
    /// Output root; defaults to `source_dir`.
    pub dest_dir: Option<PathBuf>,
    /// Tesseract language code.
    pub lang: String,
    /// Rasterization resolution for the default mode.
    pub dpi: u32,
    /// Requested output formats.
    pub formats: BTreeSet<OutputFormat>,
    /// Build layout-preserving searchable PDFs (PDF output only).
    pub preserve_layout: bool,
    /// Documents processed concurrently.
    pub workers: usize,
    /// Pages per render batch; `None` (or 0) renders whole documents.
    pub batch_size: Option<u32>,
    /// Console verbosity.
    pub output_policy: OutputPolicy,
    /// Optional log file receiving the full record stream.
    pub log_path: Option<PathBuf>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            dest_dir: None,
            lang: "por".to_string(),
            dpi: 400,
            formats: BTreeSet::new(),
            preserve_layout: false,
            workers: 2,
            batch_size: None,
            output_policy: OutputPolicy::Normal,
            log_path: None,
        }
    }
}

impl ProcessingConfig {
    /// Create a config for `source_dir` with every other field defaulted.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            ..Self::default()
        }
    }

    /// Load a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check the config and apply the documented auto-corrections.
    ///
    /// Returns the warnings describing each correction, in the order applied.
    ///
    /// # Errors
    ///
    /// Returns [`Pdf2OcrError::Config`] when no format is selected, the
    /// source directory does not exist, or `dpi`/`workers` is zero.
    pub fn validate(&mut self) -> Result<Vec<String>> {
        let mut warnings = Vec::new();

        if self.formats.is_empty() {
            return Err(Pdf2OcrError::Config(
                "You must select at least one output format: PDF, DOCX, EPUB, or HTML".into(),
            ));
        }

        if self.formats.contains(&OutputFormat::Epub) && !self.formats.contains(&OutputFormat::Docx)
        {
            warnings.push(
                "EPUB generation requires DOCX format. Enabling DOCX generation automatically."
                    .to_string(),
            );
            self.formats.insert(OutputFormat::Docx);
        }

        if self.preserve_layout {
            let before = self.formats.len();
            self.formats.retain(|format| *format == OutputFormat::Pdf);
            if self.formats.len() != before {
                warnings.push(
                    "Layout preservation mode only supports PDF output. Other formats will be disabled."
                        .to_string(),
                );
            }
            if self.formats.insert(OutputFormat::Pdf) {
                warnings.push(
                    "PDF output automatically enabled for layout preservation mode.".to_string(),
                );
            }
        }

        if !self.source_dir.is_dir() {
            return Err(Pdf2OcrError::Config(format!(
                "Source directory not found: {}",
                self.source_dir.display()
            )));
        }
        if self.dpi == 0 {
            return Err(Pdf2OcrError::Config("DPI must be a positive integer".into()));
        }
        if self.workers == 0 {
            return Err(Pdf2OcrError::Config("workers must be at least 1".into()));
        }
        if self.batch_size == Some(0) {
            self.batch_size = None;
        }

        Ok(warnings)
    }

    // -- Derived values -------------------------------------------------------

    /// Effective output root.
    pub fn effective_dest_dir(&self) -> &Path {
        self.dest_dir.as_deref().unwrap_or(&self.source_dir)
    }

    /// Output directory for `format`.
    pub fn output_dir(&self, format: OutputFormat) -> PathBuf {
        let root = self.effective_dest_dir();
        match format {
            OutputFormat::Pdf if self.preserve_layout => root.join("pdf_ocr_layout"),
            OutputFormat::Pdf => root.join("pdf_ocr"),
            OutputFormat::Docx => root.join("docx"),
            OutputFormat::Html => root.join("html"),
            OutputFormat::Epub => root.join("epub"),
        }
    }

    /// Output directories for every requested format.
    pub fn output_dirs(&self) -> BTreeMap<OutputFormat, PathBuf> {
        self.formats
            .iter()
            .map(|format| (*format, self.output_dir(*format)))
            .collect()
    }

    /// Recognition engine arguments for the current mode.
    pub fn tesseract_args(&self) -> Vec<String> {
        let base = if self.preserve_layout {
            TESSERACT_LAYOUT_CONFIG
        } else {
            TESSERACT_DEFAULT_CONFIG
        };
        base.iter().map(|arg| arg.to_string()).collect()
    }

    /// Rasterization resolution for the current mode.
    pub fn render_dpi(&self) -> u32 {
        if self.preserve_layout {
            LAYOUT_DPI
        } else {
            self.dpi
        }
    }

    /// Settings shared by every job of a run.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            batch_size: self.batch_size.filter(|size| *size > 0),
            workers: self.workers.max(1),
            formats: self.formats.clone(),
            dpi: self.render_dpi(),
            preserve_layout: self.preserve_layout,
            engine_args: self.tesseract_args(),
        }
    }
}
