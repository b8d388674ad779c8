// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wall-clock stopwatch used to time pipeline stages and whole documents.

use std::time::{Duration, Instant};

/// Measures elapsed wall-clock time for one operation.
///
/// Reading is idempotent and never stops the watch. The first call to
/// [`stop`](Self::stop) fixes the final duration; later calls return that same
/// value.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
    stopped: Option<Duration>,
}

impl Stopwatch {
    /// Start a new stopwatch.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stopped: None,
        }
    }

    /// Time elapsed so far, or the final duration once stopped.
    pub fn elapsed(&self) -> Duration {
        self.stopped.unwrap_or_else(|| self.started.elapsed())
    }

    /// Stop the watch and return the final duration.
    pub fn stop(&mut self) -> Duration {
        *self.stopped.get_or_insert_with(|| self.started.elapsed())
    }

    pub fn is_running(&self) -> bool {
        self.stopped.is_none()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

/// Seconds with two decimals, as used in every progress line.
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.2}", duration.as_secs_f64())
}
