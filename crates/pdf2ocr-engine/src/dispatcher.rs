// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Worker pool dispatcher — runs one job per document on a fixed number of
// workers and feeds completions to the aggregator as they arrive.
//
// Jobs start in sorted document order and complete in any order. Workers run
// each job on the blocking pool, so a panicking job is contained to its own
// completion. Shutdown is cooperative: it is checked between completions and
// before each job start, and never interrupts a running job.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::types::{JobResult, JobSpec, RunSummary};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, instrument, warn};

use crate::aggregator::{Aggregator, LogSink};
use crate::job::{Toolkit, run_job};
use crate::shutdown::{ShutdownSignal, ShutdownState};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How a submitted job ended.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    /// The job ran and produced a result, successful or not.
    Finished(JobResult),
    /// The job's result could not be retrieved from the pool.
    PoolFailure(String),
}

/// One completed document, as delivered to the aggregator.
#[derive(Debug, Clone)]
pub struct Completion {
    pub document_id: String,
    pub outcome: JobOutcome,
}

/// PDF files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`Pdf2OcrError::Io`] if the directory cannot be read.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

/// Fixed-size pool of document workers.
pub struct Dispatcher {
    toolkit: Arc<Toolkit>,
    workers: usize,
    signal: &'static ShutdownSignal,
    poll_interval: Duration,
}

impl Dispatcher {
    pub fn new(toolkit: Arc<Toolkit>, workers: usize) -> Self {
        Self {
            toolkit,
            workers: workers.max(1),
            signal: ShutdownSignal::global(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Observe `signal` instead of the process-wide one.
    pub fn with_signal(mut self, signal: &'static ShutdownSignal) -> Self {
        self.signal = signal;
        self
    }

    /// How often the shutdown flag is re-checked while no job completes.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Run every job and return the folded summary.
    ///
    /// With no documents the aggregator only warns and no summary is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`Pdf2OcrError::ForcedExit`] when a second interrupt arrives;
    /// the summary is abandoned in that case. Job failures never surface here.
    #[instrument(skip_all, fields(documents = specs.len(), workers = self.workers))]
    pub async fn run<S: LogSink>(
        &self,
        mut specs: Vec<JobSpec>,
        aggregator: &mut Aggregator<S>,
    ) -> Result<RunSummary> {
        if specs.is_empty() {
            aggregator.no_documents();
            return Ok(aggregator.summary().clone());
        }

        specs.sort_by(|a, b| a.document_id.cmp(&b.document_id));
        let total = specs.len();
        let workers = self.workers.min(total);
        aggregator.begin(total, workers, specs[0].settings.batch_size);

        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        for spec in specs {
            queue_tx
                .send(spec)
                .map_err(|_| Pdf2OcrError::Config("job queue closed".into()))?;
        }
        drop(queue_tx);
        let queue = Arc::new(Mutex::new(queue_rx));

        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        for worker in 0..workers {
            tokio::spawn(worker_loop(
                worker,
                Arc::clone(&queue),
                done_tx.clone(),
                Arc::clone(&self.toolkit),
                self.signal,
            ));
        }
        drop(done_tx);
        info!(total, workers, "Dispatched jobs");

        let mut completed = 0;
        while completed < total {
            match self.signal.state() {
                ShutdownState::ForceExit => return Err(Pdf2OcrError::ForcedExit),
                ShutdownState::ShutdownRequested => {
                    while let Ok(completion) = done_rx.try_recv() {
                        aggregator.record(&completion);
                        completed += 1;
                    }
                    aggregator.shutdown_requested();
                    warn!(completed, total, "Run interrupted");
                    break;
                }
                ShutdownState::Running => {}
            }

            match tokio::time::timeout(self.poll_interval, done_rx.recv()).await {
                Ok(Some(completion)) => {
                    aggregator.record(&completion);
                    completed += 1;
                }
                // Every worker has stopped; only a shutdown request does that
                // before the queue is empty.
                Ok(None) if self.signal.is_requested() => {}
                Ok(None) => break,
                Err(_elapsed) => {}
            }
        }

        Ok(aggregator.finish())
    }
}

async fn worker_loop(
    worker: usize,
    queue: Arc<Mutex<UnboundedReceiver<JobSpec>>>,
    done: UnboundedSender<Completion>,
    toolkit: Arc<Toolkit>,
    signal: &'static ShutdownSignal,
) {
    loop {
        if signal.is_requested() {
            break;
        }
        let next = queue.lock().await.recv().await;
        let Some(spec) = next else { break };
        if signal.is_requested() {
            break;
        }

        let document_id = spec.document_id.clone();
        debug!(worker, document = %document_id, "Job started");
        let toolkit = Arc::clone(&toolkit);
        let outcome = match tokio::task::spawn_blocking(move || run_job(spec, &toolkit)).await {
            Ok(result) => JobOutcome::Finished(result),
            Err(err) if err.is_panic() => JobOutcome::PoolFailure(panic_message(err.into_panic())),
            Err(err) => JobOutcome::PoolFailure(err.to_string()),
        };

        if done.send(Completion { document_id, outcome }).is_err() {
            break;
        }
    }
    debug!(worker, "Worker stopped");
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("job panicked: {detail}")
}
