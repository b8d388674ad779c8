// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdf2ocr-engine — Bounded-concurrency orchestration of per-document OCR jobs.
//
// The dispatcher hands documents to a fixed pool of workers, each job renders
// and recognizes its document in page batches before running the output
// writers, and the aggregator folds completions into one ordered log stream
// and run summary. A process-wide shutdown signal stops the run cooperatively.

pub mod aggregator;
pub mod batch;
pub mod dispatcher;
pub mod job;
pub mod shutdown;

#[cfg(test)]
mod testing;

pub use aggregator::{Aggregator, LogSink, MemorySink, TracingSink};
pub use batch::{BatchProcessor, PageResults, RecognizedDocument};
pub use dispatcher::{Completion, Dispatcher, JobOutcome, discover_documents};
pub use job::{Toolkit, run_job};
pub use shutdown::{ShutdownSignal, ShutdownState};
