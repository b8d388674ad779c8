// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the pdf2ocr batch engine.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Output formats -----------------------------------------------------------

/// Derived output formats a document can be converted into.
///
/// Ordering matters: writers run in declaration order, so DOCX is always
/// produced before the EPUB conversion that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Searchable PDF (plain text reflow, or layout-preserving in layout mode).
    Pdf,
    /// Word-processor document.
    Docx,
    /// Standalone HTML5 page.
    Html,
    /// E-book, converted from the DOCX output.
    Epub,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Pdf, Self::Docx, Self::Html, Self::Epub];

    /// Upper-case label used in log records ("PDF created in ...").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Html => "HTML",
            Self::Epub => "EPUB",
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Html => "html",
            Self::Epub => "epub",
        }
    }

    /// Output file name for a document with the given stem.
    pub fn file_name(&self, stem: &str) -> String {
        match self {
            Self::Pdf => format!("{stem}_ocr.pdf"),
            _ => format!("{stem}.{}", self.extension()),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// -- Log records --------------------------------------------------------------

/// Severity of a job log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        })
    }
}

/// One leveled message produced inside a job and replayed later by the
/// aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

// -- Page batches -------------------------------------------------------------

/// An inclusive, 1-based range of pages processed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBatch {
    pub first: u32,
    pub last: u32,
}

impl PageBatch {
    pub fn new(first: u32, last: u32) -> Self {
        debug_assert!(first >= 1 && first <= last);
        Self { first, last }
    }

    /// Number of pages in the batch.
    pub fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    /// Always false; a batch holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Page numbers covered by this batch.
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }
}

impl std::fmt::Display for PageBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

/// Partition `[1, total_pages]` into consecutive batches of at most
/// `batch_size` pages.
///
/// An unset (or zero) batch size yields one batch covering every page. Zero
/// pages yields no batches.
pub fn plan_batches(total_pages: u32, batch_size: Option<u32>) -> Vec<PageBatch> {
    if total_pages == 0 {
        return Vec::new();
    }
    let size = match batch_size {
        Some(size) if size > 0 => size,
        _ => return vec![PageBatch::new(1, total_pages)],
    };

    let mut batches = Vec::with_capacity(total_pages.div_ceil(size) as usize);
    let mut start = 1u32;
    while start <= total_pages {
        let end = start.saturating_add(size - 1).min(total_pages);
        batches.push(PageBatch::new(start, end));
        start = match end.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }
    batches
}

// -- Output policy ------------------------------------------------------------

/// How much of the record stream reaches the console.
///
/// Only affects presentation; jobs produce the same records regardless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPolicy {
    /// Only errors are shown.
    Quiet,
    /// The final summary block and errors are shown.
    SummaryOnly,
    /// Per-document progress, replayed records, and the summary are shown.
    #[default]
    Normal,
}

impl OutputPolicy {
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Normal)
    }

    pub fn shows_summary(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

// -- Jobs ---------------------------------------------------------------------

/// Per-run settings shared by every job of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Pages rendered per batch; `None` renders the whole document at once.
    pub batch_size: Option<u32>,
    /// Number of documents processed concurrently.
    pub workers: usize,
    /// Requested output formats, already auto-corrected.
    pub formats: BTreeSet<OutputFormat>,
    /// Rasterization resolution.
    pub dpi: u32,
    /// Produce a layout-preserving searchable PDF instead of reflowed text.
    pub preserve_layout: bool,
    /// Extra arguments handed to the recognition engine.
    pub engine_args: Vec<String>,
}

/// Everything one job needs to process one document.
///
/// Built by the dispatcher and moved into the worker that runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Document identifier (file name within the source directory).
    pub document_id: String,
    pub source_path: PathBuf,
    /// Output directory per requested format.
    pub output_dirs: BTreeMap<OutputFormat, PathBuf>,
    /// Recognition language code (Tesseract style, e.g. `por`).
    pub lang: String,
    pub settings: RunSettings,
}

impl JobSpec {
    /// File stem of the source document.
    pub fn stem(&self) -> String {
        self.source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.document_id.clone())
    }

    /// Output path for `format`, if an output directory is configured for it.
    pub fn output_path(&self, format: OutputFormat) -> Option<PathBuf> {
        self.output_dirs
            .get(&format)
            .map(|dir| dir.join(format.file_name(&self.stem())))
    }
}

/// Outcome of one job, produced once and consumed once by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub success: bool,
    pub elapsed: Duration,
    pub error: Option<String>,
    pub records: Vec<LogRecord>,
}

impl JobResult {
    pub fn succeeded(elapsed: Duration, records: Vec<LogRecord>) -> Self {
        Self {
            success: true,
            elapsed,
            error: None,
            records,
        }
    }

    pub fn failed(elapsed: Duration, error: impl Into<String>, records: Vec<LogRecord>) -> Self {
        Self {
            success: false,
            elapsed,
            error: Some(error.into()),
            records,
        }
    }
}

// -- Run summary --------------------------------------------------------------

/// Running totals for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration: Duration,
    /// `(document id, error)` for every failed document, in completion order.
    pub errors: Vec<(String, String)>,
    /// Set when the run stopped early on a shutdown request.
    pub interrupted: bool,
}

impl RunSummary {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            completed: 0,
            succeeded: 0,
            failed: 0,
            total_duration: Duration::ZERO,
            errors: Vec::new(),
            interrupted: false,
        }
    }

    /// Fold one completed document into the totals.
    pub fn record(&mut self, document_id: &str, result: &JobResult) {
        self.completed += 1;
        if result.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
            let error = result
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            self.errors.push((document_id.to_string(), error));
        }
    }

    /// Mean wall-clock time per completed document.
    pub fn average_time(&self) -> Option<Duration> {
        if self.completed == 0 {
            return None;
        }
        Some(self.total_duration / self.completed as u32)
    }

    /// `(completed, succeeded, failed)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.completed, self.succeeded, self.failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered(batches: &[PageBatch]) -> Vec<u32> {
        batches.iter().flat_map(|b| b.pages()).collect()
    }

    #[test]
    fn unset_batch_size_is_one_range() {
        assert_eq!(plan_batches(7, None), vec![PageBatch::new(1, 7)]);
        assert_eq!(plan_batches(7, Some(0)), vec![PageBatch::new(1, 7)]);
    }

    #[test]
    fn batches_cover_every_page_once() {
        for total in 0..=12u32 {
            for size in [None, Some(1), Some(total.max(1)), Some(total + 5), Some(3)] {
                let batches = plan_batches(total, size);
                let expected: Vec<u32> = (1..=total).collect();
                assert_eq!(covered(&batches), expected, "total={total} size={size:?}");
            }
        }
    }

    #[test]
    fn three_pages_in_batches_of_two() {
        assert_eq!(
            plan_batches(3, Some(2)),
            vec![PageBatch::new(1, 2), PageBatch::new(3, 3)]
        );
    }

    #[test]
    fn zero_pages_plans_nothing() {
        assert!(plan_batches(0, Some(4)).is_empty());
        assert!(plan_batches(0, None).is_empty());
    }

    #[test]
    fn pdf_output_name_has_ocr_suffix() {
        assert_eq!(OutputFormat::Pdf.file_name("scan"), "scan_ocr.pdf");
        assert_eq!(OutputFormat::Epub.file_name("scan"), "scan.epub");
    }

    #[test]
    fn summary_counts_and_errors() {
        let mut summary = RunSummary::new(RunId::new());
        summary.record("a.pdf", &JobResult::succeeded(Duration::from_secs(1), Vec::new()));
        summary.record(
            "b.pdf",
            &JobResult::failed(Duration::from_secs(2), "boom", Vec::new()),
        );
        assert_eq!(summary.counts(), (2, 1, 1));
        assert_eq!(summary.errors, vec![("b.pdf".to_string(), "boom".to_string())]);
    }

    #[test]
    fn average_time_skipped_without_completions() {
        let mut summary = RunSummary::new(RunId::new());
        assert_eq!(summary.average_time(), None);
        summary.record("a.pdf", &JobResult::succeeded(Duration::ZERO, Vec::new()));
        summary.total_duration = Duration::from_secs(4);
        assert_eq!(summary.average_time(), Some(Duration::from_secs(4)));
    }

    #[test]
    fn output_policy_gates() {
        assert!(OutputPolicy::Normal.shows_progress());
        assert!(!OutputPolicy::SummaryOnly.shows_progress());
        assert!(OutputPolicy::SummaryOnly.shows_summary());
        assert!(!OutputPolicy::Quiet.shows_summary());
    }
}
