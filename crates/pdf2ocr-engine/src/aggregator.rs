// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result and log aggregation — folds completed jobs into the run summary and
// replays their log records into one ordered stream, in completion order.
//
// Verbosity is applied here and only here: every record reaches the sink, the
// output policy only decides whether it is marked visible on the console.

use std::time::Duration;

use pdf2ocr_core::timer::{Stopwatch, format_seconds};
use pdf2ocr_core::types::{JobResult, LogLevel, OutputPolicy, RunId, RunSummary};

use crate::dispatcher::{Completion, JobOutcome};

/// Tracing target for records shown on the console (and written to the log).
pub const CONSOLE_TARGET: &str = "pdf2ocr::console";
/// Tracing target for records that only go to the log file.
pub const FILE_TARGET: &str = "pdf2ocr::file";

// -- Sinks --------------------------------------------------------------------

/// Destination of the aggregated record stream.
pub trait LogSink {
    /// `visible` is false for records the console must not show.
    fn emit(&mut self, level: LogLevel, message: &str, visible: bool);
}

macro_rules! emit_at {
    ($target:expr, $level:expr, $message:expr) => {
        match $level {
            LogLevel::Debug => tracing::debug!(target: $target, "{}", $message),
            LogLevel::Info => tracing::info!(target: $target, "{}", $message),
            LogLevel::Warning => tracing::warn!(target: $target, "{}", $message),
            LogLevel::Error => tracing::error!(target: $target, "{}", $message),
        }
    };
}

/// Emits every record as a tracing event on [`CONSOLE_TARGET`] or
/// [`FILE_TARGET`]; the subscriber decides where each target is written.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&mut self, level: LogLevel, message: &str, visible: bool) {
        if visible {
            emit_at!(CONSOLE_TARGET, level, message);
        } else {
            emit_at!(FILE_TARGET, level, message);
        }
    }
}

/// Keeps every emitted record in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub records: Vec<(LogLevel, String, bool)>,
}

impl MemorySink {
    /// Messages the console would show, in order.
    pub fn visible(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|(_, _, visible)| *visible)
            .map(|(_, message, _)| message.as_str())
            .collect()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.records.iter().map(|(_, m, _)| m.as_str()).collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&mut self, level: LogLevel, message: &str, visible: bool) {
        self.records.push((level, message.to_string(), visible));
    }
}

// -- Aggregator ---------------------------------------------------------------

/// Single-writer owner of the [`RunSummary`]. Lives on the dispatching task.
pub struct Aggregator<S> {
    policy: OutputPolicy,
    sink: S,
    summary: RunSummary,
    total: usize,
    watch: Stopwatch,
}

impl<S: LogSink> Aggregator<S> {
    pub fn new(policy: OutputPolicy, sink: S) -> Self {
        Self {
            policy,
            sink,
            summary: RunSummary::new(RunId::new()),
            total: 0,
            watch: Stopwatch::start(),
        }
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn emit(&mut self, level: LogLevel, message: &str, shown: bool) {
        let visible = match level {
            LogLevel::Error => true,
            LogLevel::Debug => false,
            _ => shown,
        };
        self.sink.emit(level, message, visible);
    }

    /// The source directory held no documents.
    pub fn no_documents(&mut self) {
        let shown = self.policy.shows_summary();
        self.emit(LogLevel::Warning, "No PDF files found!", shown);
    }

    /// Announce a run of `total` documents.
    pub fn begin(&mut self, total: usize, workers: usize, batch_size: Option<u32>) {
        self.total = total;
        let shown = self.policy.shows_progress();
        self.emit(
            LogLevel::Info,
            &format!("Processing {total} files using {workers} workers"),
            shown,
        );
        if let Some(size) = batch_size {
            self.emit(LogLevel::Info, &format!("Batch-size: {size} pages"), shown);
        }
    }

    /// Fold one completion into the summary and replay its records.
    pub fn record(&mut self, completion: &Completion) {
        let shown = self.policy.shows_progress();
        let index = self.summary.completed + 1;
        let document = completion.document_id.as_str();

        match &completion.outcome {
            JobOutcome::Finished(result) => {
                self.emit(
                    LogLevel::Info,
                    &format!("[{index}/{}] Processing: {document}", self.total),
                    shown,
                );
                for record in &result.records {
                    self.emit(record.level, &record.message, shown);
                }
                if result.success {
                    self.emit(
                        LogLevel::Info,
                        &format!(
                            "  ✓ Completed successfully in {} seconds",
                            format_seconds(result.elapsed)
                        ),
                        shown,
                    );
                } else if let Some(error) = &result.error {
                    self.emit(LogLevel::Error, &format!("  ✗ Failed: {error}"), true);
                }
                self.summary.record(document, result);
            }
            JobOutcome::PoolFailure(reason) => {
                let error = format!("Error processing {document}: {reason}");
                self.emit(LogLevel::Error, &error, true);
                let result = JobResult::failed(Duration::ZERO, error, Vec::new());
                self.summary.record(document, &result);
            }
        }
    }

    /// The run stops waiting for further completions.
    pub fn shutdown_requested(&mut self) {
        self.summary.interrupted = true;
        let shown = self.policy.shows_summary();
        self.emit(
            LogLevel::Warning,
            "Shutdown requested. Waiting for current tasks to complete...",
            shown,
        );
    }

    /// Close the run: stamp the wall time and emit the summary block.
    pub fn finish(&mut self) -> RunSummary {
        self.summary.total_duration = self.watch.stop();
        let block = summary_block(&self.summary);
        let shown = self.policy.shows_summary();
        self.emit(LogLevel::Info, &block, shown);
        self.summary.clone()
    }
}

/// Human-readable end-of-run report.
pub fn summary_block(summary: &RunSummary) -> String {
    let mut lines = vec![
        "Processing Summary:".to_string(),
        "----------------".to_string(),
        format!("Files processed: {}", summary.completed),
        format!(
            "Total time: {} seconds",
            format_seconds(summary.total_duration)
        ),
    ];
    if let Some(average) = summary.average_time() {
        lines.push(format!(
            "Average time per file: {} seconds",
            format_seconds(average)
        ));
    }
    lines.push(format!("Successful: {}", summary.succeeded));
    lines.push(format!("Failed: {}", summary.failed));

    if !summary.errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors:".to_string());
        lines.push("-------".to_string());
        for (document, error) in &summary.errors {
            lines.push(format!("• {document}:"));
            lines.push(format!("  {error}"));
        }
    }
    lines.join("\n")
}
